use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::params::PhysicalConfig;

/// Everything needed to reproduce a run; written next to its outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub physical: PhysicalConfig,
    pub numerics: NumericsConfig,
    #[serde(default)]
    pub run: RunInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// Longitudinal mesh cells M.
    pub cells: usize,
    /// Simulated time (s).
    pub duration: f64,
    /// Noise seed. None = seeded from the OS.
    pub seed: Option<u64>,
    /// Multiplier on the spontaneous-emission source (1 = physical).
    pub noise_scale: f64,
    /// Length of the final window fed to the spectrum (s).
    pub steady_state_window: f64,
    /// Progress log interval in steps.
    pub progress_stride: usize,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            cells: 60,
            duration: 5e-9,
            seed: Some(1),
            noise_scale: 1.0,
            steady_state_window: 4e-9,
            progress_stride: 50_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,
}

impl RunConfig {
    /// Physical and numerical checks, before anything is allocated.
    pub fn validate(&self) -> SimResult<()> {
        self.physical.validate()?;
        let n = &self.numerics;
        if n.cells == 0 {
            return Err(SimError::Config("numerics.cells must be >= 1".to_string()));
        }
        if !(n.duration.is_finite() && n.duration > 0.0) {
            return Err(SimError::Config(format!(
                "numerics.duration must be finite and > 0, got {}",
                n.duration
            )));
        }
        if !(n.noise_scale.is_finite() && n.noise_scale >= 0.0) {
            return Err(SimError::Config(format!(
                "numerics.noise_scale must be finite and >= 0, got {}",
                n.noise_scale
            )));
        }
        if !(n.steady_state_window.is_finite() && n.steady_state_window >= 0.0) {
            return Err(SimError::Config(format!(
                "numerics.steady_state_window must be finite and >= 0, got {}",
                n.steady_state_window
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let file = File::open(path)?;
        let cfg: Self = serde_json::from_reader(BufReader::new(file))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn write_to_dir(&self, out_dir: &Path) -> SimResult<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
