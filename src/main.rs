// src/main.rs
//
// Command-line driver for single DFB runs.
//
// Outputs go to `runs/` (or the directory given via `out=`) and are not
// committed to version control.
//
// Examples:
//
//   cargo run --release
//       -> reference device (600 µm, 50 mA, r_l=0.9, r_r=0.1), 5 ns, M=60
//
//   cargo run --release -- current=30 rr=0.3 duration=8 seed=42
//       -> 30 mA, right facet 0.3, 8 ns, fixed seed
//
//   cargo run --release -- config=my_device.json noplots
//       -> parameters from a RunConfig JSON file, CSV output only
//
// Typical outputs (per run directory):
//   runs/<run_id>/
//     ├── config.json
//     ├── power_vs_time.csv
//     ├── boundary_fields.csv
//     ├── spectrum.csv
//     ├── output_power.png
//     └── spectrum.png

use std::env;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dfb_sim::config::RunConfig;
use dfb_sim::error::{SimError, SimResult};
use dfb_sim::noise::SpontaneousEmission;
use dfb_sim::output::{write_boundary_fields_csv, write_power_csv, write_spectrum_csv};
use dfb_sim::recorder::OutputRecorder;
use dfb_sim::simulation::Simulation;
use dfb_sim::spectrum::{optical_spectrum, steady_state_window};
use dfb_sim::visualisation::{save_power_plot, save_spectrum_plot};

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- [config=FILE] [current=mA] [rl=VAL] [rr=VAL] [kappa=1/cm]
             [mesh=N] [duration=ns] [seed=N|random] [noise=SCALE]
             [out=DIR] [run=RUN_ID] [noplots]

Notes:
  - config=FILE loads a full RunConfig JSON; later key=value args override it.
  - The spectrum uses the last 4 ns of the right-facet field (or the whole run if shorter).
"#
    );
}

fn sanitize_run_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_run_id(cfg: &RunConfig) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    format!(
        "{}{:03}_I{:.0}mA_rl{}_rr{}",
        now.as_secs(),
        now.subsec_millis(),
        cfg.physical.current * 1e3,
        cfg.physical.facets.r_left,
        cfg.physical.facets.r_right
    )
}

fn unique_run_dir(out_root: &str, run_id: &str) -> PathBuf {
    let base = PathBuf::from(out_root);
    let mut dir = base.join(run_id);
    if !dir.exists() {
        return dir;
    }
    for k in 1..1000 {
        let cand = base.join(format!("{}_{}", run_id, k));
        if !cand.exists() {
            dir = cand;
            break;
        }
    }
    dir
}

fn parse_value<T: std::str::FromStr>(key: &str, val: &str) -> SimResult<T> {
    val.parse::<T>()
        .map_err(|_| SimError::Config(format!("cannot parse {key}={val}")))
}

fn plot_err(e: Box<dyn std::error::Error>) -> SimError {
    SimError::Plot(e.to_string())
}

fn run() -> SimResult<()> {
    let argv: Vec<String> = env::args().collect();

    let mut cfg = RunConfig::default();
    let mut out_root = "runs".to_string();
    let mut run_id_override: Option<String> = None;
    let mut plots = true;

    // config= first, so the other overrides apply on top of it
    for arg in argv.iter().skip(1) {
        if let Some(path) = arg.strip_prefix("config=") {
            cfg = RunConfig::from_json_file(Path::new(path))?;
        }
    }

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if arg == "noplots" {
            plots = false;
            continue;
        }
        let Some((key, val)) = arg.split_once('=') else {
            print_usage();
            return Err(SimError::Config(format!("unrecognised argument '{arg}'")));
        };
        match key {
            "config" => {}
            "current" => cfg.physical.current = parse_value::<f64>(key, val)? * 1e-3,
            "rl" => cfg.physical.facets.r_left = parse_value(key, val)?,
            "rr" => cfg.physical.facets.r_right = parse_value(key, val)?,
            "kappa" => cfg.physical.grating_strength = parse_value(key, val)?,
            "mesh" => cfg.numerics.cells = parse_value(key, val)?,
            "duration" => cfg.numerics.duration = parse_value::<f64>(key, val)? * 1e-9,
            "seed" => {
                cfg.numerics.seed = if val == "random" {
                    None
                } else {
                    Some(parse_value(key, val)?)
                }
            }
            "noise" => cfg.numerics.noise_scale = parse_value(key, val)?,
            "out" => out_root = val.to_string(),
            "run" => run_id_override = Some(sanitize_run_id(val)),
            _ => {
                print_usage();
                return Err(SimError::Config(format!("unknown key '{key}'")));
            }
        }
    }

    cfg.validate()?;

    let run_id = run_id_override.unwrap_or_else(|| default_run_id(&cfg));
    let out_dir = unique_run_dir(&out_root, &run_id);
    create_dir_all(&out_dir)?;

    cfg.run.binary = "dfb-sim".to_string();
    cfg.run.run_id = run_id.clone();
    cfg.write_to_dir(&out_dir)?;

    let sim = Simulation::new(
        cfg.physical.clone(),
        cfg.numerics.cells,
        cfg.numerics.duration,
    )?
    .with_progress_stride(cfg.numerics.progress_stride);

    let mut noise = match cfg.numerics.seed {
        Some(seed) => SpontaneousEmission::from_seed(seed, cfg.numerics.noise_scale)?,
        None => SpontaneousEmission::from_entropy(cfg.numerics.noise_scale)?,
    };

    println!(
        "dfb-sim: run '{}' -> {:?} ({} steps, dt={:.3e} s)",
        run_id, out_dir, sim.mesh.total_steps, sim.mesh.dt
    );

    let out = sim.run(&mut noise, |p| {
        println!(
            "  step {:>8}/{} ({:5.1}%)  {:.1} s",
            p.step,
            p.total_steps,
            100.0 * p.fraction(),
            p.elapsed.as_secs_f64()
        );
    })?;

    let dt = out.mesh.dt;
    let rec = &out.recorder;

    write_power_csv(&out_dir.join("power_vs_time.csv"), rec, dt)?;
    write_boundary_fields_csv(&out_dir.join("boundary_fields.csv"), rec, dt)?;

    let window = steady_state_window(rec.right_field(), dt, cfg.numerics.steady_state_window);
    let spec = optical_spectrum(window, dt, cfg.physical.optical_frequency());
    write_spectrum_csv(&out_dir.join("spectrum.csv"), &spec)?;

    let tail = out.mesh.steps_for(1e-9);
    let p_tail = OutputRecorder::tail_mean(rec.right_power(), tail);
    println!("  mean right-facet power over last 1 ns: {:.3} mW", p_tail * 1e3);
    if let Some(wl) = spec.peak_wavelength() {
        println!("  spectral peak: {:.5} um", wl * 1e4);
    }

    if plots {
        let power_mw = rec.smoothed_right_power_mw();
        let times_ns: Vec<f64> = rec
            .smoothed_time_axis(dt)
            .into_iter()
            .map(|t| t * 1e9)
            .collect();
        let path = out_dir.join("output_power.png");
        save_power_plot(&times_ns, &power_mw, &path.to_string_lossy()).map_err(plot_err)?;

        let wl_um: Vec<f64> = spec.wavelength.iter().map(|w| w * 1e4).collect();
        let path = out_dir.join("spectrum.png");
        save_spectrum_plot(&wl_um, &spec.relative_power_db(), &path.to_string_lossy())
            .map_err(plot_err)?;
    }

    println!("Wrote outputs to {:?}", out_dir);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("dfb-sim: {e}");
        std::process::exit(1);
    }
}
