// src/simulation.rs
//
// Run driver: validates the device, builds the mesh and state, and calls the
// traveling-wave step `total_steps` times while recording observables.

use std::time::{Duration, Instant};

use crate::error::SimResult;
use crate::field_state::FieldState;
use crate::grid::MeshClock;
use crate::noise::NoiseSource;
use crate::params::PhysicalConfig;
use crate::recorder::OutputRecorder;
use crate::traveling_wave::{step_traveling_wave, StepScratch};

/// Progress report handed to the caller's callback.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Steps completed so far.
    pub step: usize,
    pub total_steps: usize,
    pub elapsed: Duration,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total_steps == 0 {
            return 1.0;
        }
        self.step as f64 / self.total_steps as f64
    }
}

/// Everything a finished run hands to the analysis stage.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub mesh: MeshClock,
    pub recorder: OutputRecorder,
    pub final_state: FieldState,
}

pub struct Simulation {
    pub config: PhysicalConfig,
    pub mesh: MeshClock,
    /// Callback interval in steps (0 = only at the end).
    pub progress_stride: usize,
}

impl Simulation {
    /// Validate `config` and build the mesh for a run of `duration` seconds.
    pub fn new(config: PhysicalConfig, cells: usize, duration: f64) -> SimResult<Self> {
        config.validate()?;
        let mesh = MeshClock::new(&config, cells, duration)?;
        Ok(Self {
            config,
            mesh,
            progress_stride: 0,
        })
    }

    pub fn with_progress_stride(mut self, stride: usize) -> Self {
        self.progress_stride = stride;
        self
    }

    /// Run from a dark cavity at transparency.
    pub fn run<S, P>(&self, noise: &mut S, progress: P) -> SimResult<SimulationOutput>
    where
        S: NoiseSource + ?Sized,
        P: FnMut(Progress),
    {
        let state = FieldState::new(&self.mesh, &self.config);
        self.run_from(state, noise, progress)
    }

    /// Run starting from an arbitrary state on this mesh.
    pub fn run_from<S, P>(
        &self,
        mut state: FieldState,
        noise: &mut S,
        mut progress: P,
    ) -> SimResult<SimulationOutput>
    where
        S: NoiseSource + ?Sized,
        P: FnMut(Progress),
    {
        let cfg = &self.config;
        let mesh = &self.mesh;
        let total = mesh.total_steps;

        log::info!(
            "DFB run: M={} dz={:.3e} cm dt={:.3e} s steps={} I={:.1} mA r_l={} r_r={}",
            mesh.cells,
            mesh.dz,
            mesh.dt,
            total,
            cfg.current * 1e3,
            cfg.facets.r_left,
            cfg.facets.r_right
        );

        let mut scratch = StepScratch::new(mesh, cfg);
        let mut recorder = OutputRecorder::try_with_capacity(total)?;
        let t0 = Instant::now();

        for step in 0..total {
            let obs = step_traveling_wave(&mut state, cfg, mesh, noise, &mut scratch, step)?;
            recorder.push(obs);

            let done = step + 1;
            if self.progress_stride > 0 && done % self.progress_stride == 0 && done < total {
                let p = Progress {
                    step: done,
                    total_steps: total,
                    elapsed: t0.elapsed(),
                };
                log::debug!(
                    "step {}/{} ({:.1}%) P_right={:.3e} W <N>={:.3e}",
                    done,
                    total,
                    100.0 * p.fraction(),
                    obs.right_power,
                    state.mean_carrier_density()
                );
                progress(p);
            }
        }

        let elapsed = t0.elapsed();
        progress(Progress {
            step: total,
            total_steps: total,
            elapsed,
        });
        log::info!(
            "DFB run done in {:.2} s ({} steps)",
            elapsed.as_secs_f64(),
            total
        );

        Ok(SimulationOutput {
            mesh: *mesh,
            recorder,
            final_state: state,
        })
    }
}
