// src/grid.rs

use crate::error::{SimError, SimResult};
use crate::params::PhysicalConfig;

/// Longitudinal mesh and the time step tied to it.
///
/// The time step is fixed by `dt = dz / v_g`, so one step moves each field
/// envelope exactly one cell. The explicit update relies on this.
#[derive(Debug, Clone, Copy)]
pub struct MeshClock {
    pub cells: usize,
    pub dz: f64,
    pub dt: f64,
    pub total_steps: usize,
    pub duration: f64,
}

impl MeshClock {
    /// Build the mesh for `cells` cells over the device length and a run of
    /// `duration` seconds.
    pub fn new(cfg: &PhysicalConfig, cells: usize, duration: f64) -> SimResult<Self> {
        if cells == 0 {
            return Err(SimError::Config("mesh cell count must be >= 1".to_string()));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SimError::Config(format!(
                "duration must be finite and > 0, got {duration}"
            )));
        }
        if !(cfg.length.is_finite() && cfg.length > 0.0) {
            return Err(SimError::Config(format!(
                "length must be finite and > 0, got {}",
                cfg.length
            )));
        }

        let dz = cfg.length / cells as f64;
        let dt = dz / cfg.group_velocity();
        let total_steps = (duration / dt).round() as usize;

        Ok(Self {
            cells,
            dz,
            dt,
            total_steps,
            duration,
        })
    }

    /// Number of field points (cell boundaries).
    #[inline]
    pub fn n_points(&self) -> usize {
        self.cells + 1
    }

    /// Simulated time at the end of step `step` (0-based).
    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        (step + 1) as f64 * self.dt
    }

    /// Number of steps covering `duration`, clamped to the run length.
    pub fn steps_for(&self, duration: f64) -> usize {
        if !(duration > 0.0) {
            return 0;
        }
        ((duration / self.dt).round() as usize).min(self.total_steps)
    }

    /// |dt·v_g − dz| / dz, zero up to rounding.
    pub fn cfl_residual(&self, cfg: &PhysicalConfig) -> f64 {
        (self.dt * cfg.group_velocity() - self.dz).abs() / self.dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_mesh_matches_hand_numbers() {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 60, 5e-9).unwrap();
        assert_eq!(mesh.n_points(), 61);
        assert!((mesh.dz - 1e-3).abs() < 1e-17);
        // dt = 1e-3 / (3e10 / 3.6) = 1.2e-13 s
        assert!((mesh.dt - 1.2e-13).abs() < 1e-25);
        assert_eq!(mesh.total_steps, 41_667);
    }

    #[test]
    fn zero_cells_or_bad_duration_fail() {
        let cfg = PhysicalConfig::default();
        assert!(matches!(MeshClock::new(&cfg, 0, 1e-9), Err(SimError::Config(_))));
        assert!(matches!(MeshClock::new(&cfg, 10, 0.0), Err(SimError::Config(_))));
        assert!(matches!(MeshClock::new(&cfg, 10, -1e-9), Err(SimError::Config(_))));
        assert!(MeshClock::new(&cfg, 10, f64::INFINITY).is_err());
    }

    #[test]
    fn steps_for_is_clamped() {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 60, 1e-9).unwrap();
        assert_eq!(mesh.steps_for(10e-9), mesh.total_steps);
        assert_eq!(mesh.steps_for(0.0), 0);
        assert_eq!(mesh.steps_for(0.5e-9), (0.5e-9 / mesh.dt).round() as usize);
    }
}
