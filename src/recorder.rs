// src/recorder.rs
//
// Per-step observables and the append-only series they go into.

use crate::error::{SimError, SimResult};
use crate::field_state::{Complex64, FieldState};
use crate::params::PhysicalConfig;

/// Scalar outputs of one time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepObservables {
    pub right_power: f64, // W
    pub left_power: f64,  // W
    pub right_field: Complex64,
    pub left_field: Complex64,
    pub wavelength_shift: f64, // cm
}

/// |field|^2 → facet output power (W) for a facet of reflectivity `r`.
#[inline]
fn facet_power(intensity: f64, r: f64, cfg: &PhysicalConfig) -> f64 {
    intensity * cfg.volume() * cfg.group_velocity() * cfg.photon_energy() * (1.0 - r * r)
        / (cfg.length * cfg.confinement)
}

/// Compute this step's observables from the updated state. Pure.
pub fn observe(state: &FieldState, cfg: &PhysicalConfig) -> StepObservables {
    let (right_field, left_field) = state.boundary_fields();

    let right_power = facet_power(right_field.norm_sqr(), cfg.output_coupling_right(), cfg);
    let left_power = facet_power(left_field.norm_sqr(), cfg.output_coupling_left(), cfg);

    let n_last = state
        .carriers
        .last()
        .copied()
        .unwrap_or(cfg.transparency_density);
    let wavelength_shift = 2.0
        * cfg.grating_period
        * (-cfg.wavelength
            * cfg.linewidth_enhancement
            * cfg.confinement
            * cfg.differential_gain
            * (n_last - cfg.transparency_density))
        / (4.0 * std::f64::consts::PI);

    StepObservables {
        right_power,
        left_power,
        right_field,
        left_field,
        wavelength_shift,
    }
}

/// Time-indexed output series, one entry per step.
#[derive(Debug, Clone, Default)]
pub struct OutputRecorder {
    right_power: Vec<f64>,
    left_power: Vec<f64>,
    right_field: Vec<Complex64>,
    left_field: Vec<Complex64>,
    wavelength_shift: Vec<f64>,
}

impl OutputRecorder {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            right_power: Vec::with_capacity(n),
            left_power: Vec::with_capacity(n),
            right_field: Vec::with_capacity(n),
            left_field: Vec::with_capacity(n),
            wavelength_shift: Vec::with_capacity(n),
        }
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports a run too
    /// long to hold in memory instead of aborting.
    pub fn try_with_capacity(n: usize) -> SimResult<Self> {
        let mut rec = Self::default();
        let too_long = |e: std::collections::TryReserveError| {
            SimError::Config(format!("cannot hold {n} output samples in memory: {e}"))
        };
        rec.right_power.try_reserve_exact(n).map_err(too_long)?;
        rec.left_power.try_reserve_exact(n).map_err(too_long)?;
        rec.right_field.try_reserve_exact(n).map_err(too_long)?;
        rec.left_field.try_reserve_exact(n).map_err(too_long)?;
        rec.wavelength_shift.try_reserve_exact(n).map_err(too_long)?;
        Ok(rec)
    }

    pub fn push(&mut self, obs: StepObservables) {
        self.right_power.push(obs.right_power);
        self.left_power.push(obs.left_power);
        self.right_field.push(obs.right_field);
        self.left_field.push(obs.left_field);
        self.wavelength_shift.push(obs.wavelength_shift);
    }

    pub fn len(&self) -> usize {
        self.right_power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right_power.is_empty()
    }

    pub fn right_power(&self) -> &[f64] {
        &self.right_power
    }

    pub fn left_power(&self) -> &[f64] {
        &self.left_power
    }

    pub fn right_field(&self) -> &[Complex64] {
        &self.right_field
    }

    pub fn left_field(&self) -> &[Complex64] {
        &self.left_field
    }

    pub fn wavelength_shift(&self) -> &[f64] {
        &self.wavelength_shift
    }

    /// Mean of `series` over its last `n` entries (or all of it if shorter).
    pub fn tail_mean(series: &[f64], n: usize) -> f64 {
        let n = n.min(series.len());
        if n == 0 {
            return 0.0;
        }
        series[series.len() - n..].iter().sum::<f64>() / n as f64
    }

    /// Right-facet power in mW with neighbouring samples averaged,
    /// P'[k] = (P[k] + P[k+1]) / 2, dropping the first and last sample.
    ///
    /// Paired with [`OutputRecorder::smoothed_time_axis`].
    pub fn smoothed_right_power_mw(&self) -> Vec<f64> {
        let p = &self.right_power;
        if p.len() < 3 {
            return Vec::new();
        }
        (1..p.len() - 1)
            .map(|k| 0.5 * (p[k] + p[k + 1]) * 1e3)
            .collect()
    }

    /// Times k·dt for k = 1..len-1, matching `smoothed_right_power_mw`.
    pub fn smoothed_time_axis(&self, dt: f64) -> Vec<f64> {
        if self.len() < 3 {
            return Vec::new();
        }
        (1..self.len() - 1).map(|k| k as f64 * dt).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MeshClock;
    use rustfft::num_complex::Complex;

    #[test]
    fn dark_cavity_has_zero_power_and_shift() {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 10, 1e-10).unwrap();
        let st = FieldState::new(&mesh, &cfg);
        let obs = observe(&st, &cfg);
        assert_eq!(obs.right_power, 0.0);
        assert_eq!(obs.left_power, 0.0);
        assert_eq!(obs.wavelength_shift, 0.0);
    }

    #[test]
    fn power_uses_each_facet_reflectivity() {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 10, 1e-10).unwrap();
        let mut st = FieldState::new(&mesh, &cfg);
        st.forward[10] = Complex::new(1e7, 0.0);
        st.backward[0] = Complex::new(0.0, 1e7);

        let obs = observe(&st, &cfg);
        let ratio = obs.left_power / obs.right_power;
        let expected = (1.0 - 0.9_f64.powi(2)) / (1.0 - 0.1_f64.powi(2));
        assert!((ratio - expected).abs() < 1e-12, "ratio={ratio}");
        assert!(obs.right_power > 0.0);
    }

    #[test]
    fn carrier_rise_shifts_wavelength_down() {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 4, 1e-10).unwrap();
        let mut st = FieldState::new(&mesh, &cfg);
        st.carriers[3] = 2e18;
        let obs = observe(&st, &cfg);
        assert!(obs.wavelength_shift < 0.0);
    }

    #[test]
    fn oversized_series_is_a_config_error() {
        assert!(matches!(
            OutputRecorder::try_with_capacity(usize::MAX),
            Err(SimError::Config(_))
        ));
        let rec = OutputRecorder::try_with_capacity(1000).unwrap();
        assert!(rec.is_empty());
    }

    #[test]
    fn smoothing_averages_neighbours() {
        let mut rec = OutputRecorder::with_capacity(4);
        for p in [1e-3, 2e-3, 4e-3, 8e-3] {
            rec.push(StepObservables {
                right_power: p,
                left_power: 0.0,
                right_field: Complex::new(0.0, 0.0),
                left_field: Complex::new(0.0, 0.0),
                wavelength_shift: 0.0,
            });
        }
        let s = rec.smoothed_right_power_mw();
        assert_eq!(s.len(), 2);
        assert!((s[0] - 3.0).abs() < 1e-12);
        assert!((s[1] - 6.0).abs() < 1e-12);
        assert_eq!(rec.smoothed_time_axis(1.0), vec![1.0, 2.0]);
        assert!((OutputRecorder::tail_mean(rec.right_power(), 2) - 6e-3).abs() < 1e-15);
    }
}
