// src/bin/facet_sweep.rs
//
// Static characteristic vs. right-facet reflectivity: reference device at fixed
// drive current, right facet swept from 0 to 0.9 with the left facet held at 0.9.
// Each point is an independent seeded run; points are run in parallel.
//
// Run:
//   cargo run --release --bin facet_sweep
//
// Output:
//   out/facet_sweep/
//     └── facet_sweep.csv    # r_right, P_right_mW, P_left_mW, peak_wavelength_um

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use dfb_sim::error::SimResult;
use dfb_sim::noise::SpontaneousEmission;
use dfb_sim::params::PhysicalConfig;
use dfb_sim::recorder::OutputRecorder;
use dfb_sim::simulation::Simulation;
use dfb_sim::spectrum::{optical_spectrum, steady_state_window};

struct SweepPoint {
    r_right: f64,
    p_right_mw: f64,
    p_left_mw: f64,
    peak_um: f64,
}

fn run_point(r_right: f64, seed: u64) -> SimResult<SweepPoint> {
    let mut cfg = PhysicalConfig::default();
    cfg.facets.r_right = r_right;

    let sim = Simulation::new(cfg, 60, 5e-9)?;
    let mut noise = SpontaneousEmission::from_seed(seed, 1.0)?;
    let out = sim.run(&mut noise, |_| {})?;

    let dt = out.mesh.dt;
    let rec = &out.recorder;
    let tail = out.mesh.steps_for(1e-9);

    let window = steady_state_window(rec.right_field(), dt, 4e-9);
    let spec = optical_spectrum(window, dt, sim.config.optical_frequency());

    Ok(SweepPoint {
        r_right,
        p_right_mw: OutputRecorder::tail_mean(rec.right_power(), tail) * 1e3,
        p_left_mw: OutputRecorder::tail_mean(rec.left_power(), tail) * 1e3,
        peak_um: spec.peak_wavelength().unwrap_or(f64::NAN) * 1e4,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let r_values: Vec<f64> = (0..=9).map(|k| 0.1 * k as f64).collect();

    let points: Vec<SweepPoint> = r_values
        .par_iter()
        .enumerate()
        .map(|(k, &r)| run_point(r, 1000 + k as u64))
        .collect::<SimResult<Vec<_>>>()?;

    let out_dir = Path::new("out").join("facet_sweep");
    create_dir_all(&out_dir)?;
    let mut f = BufWriter::new(File::create(out_dir.join("facet_sweep.csv"))?);

    writeln!(f, "r_right,P_right_mW,P_left_mW,peak_wavelength_um")?;
    for p in &points {
        writeln!(
            f,
            "{:.2},{:.6e},{:.6e},{:.6}",
            p.r_right, p.p_right_mw, p.p_left_mw, p.peak_um
        )?;
        println!(
            "r_right={:.2}  P_right={:.3} mW  P_left={:.3} mW  peak={:.5} um",
            p.r_right, p.p_right_mw, p.p_left_mw, p.peak_um
        );
    }
    f.flush()?;

    println!("Wrote {:?}", out_dir.join("facet_sweep.csv"));
    Ok(())
}
