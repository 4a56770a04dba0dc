// ===============================
// src/traveling_wave.rs
// ===============================
//
// Explicit traveling-wave step for the two counter-propagating field envelopes
// of a DFB cavity, coupled to the carrier rate equation.
//
// One call advances the state by dt = dz / v_g:
//   1) photon history <- S
//   2) saturated modal gain and Bragg detuning per cell
//   3) spontaneous-emission noise per cell
//   4) propagate F and R one cell downstream with exp((g - iΔu) dz), add noise
//   5) mix the propagated waves through the grating matrix
//        [ cosh(κdz)    -i sinh(κdz) ]
//        [ -i sinh(κdz)  cosh(κdz)   ]
//   6) facet reflections
//   7) photon density and its midpoint with the previous step
//   8) explicit Euler step of the carrier rate equation
//
// Per-cell work (gain/detuning, carriers) may run on rayon for large meshes.
// Steps themselves are strictly sequential.

use std::sync::OnceLock;

use rayon::prelude::*;
use rustfft::num_complex::Complex;

use crate::error::{SimError, SimResult};
use crate::field_state::{Complex64, FieldState, HIST_MID, HIST_PREV};
use crate::grid::MeshClock;
use crate::noise::NoiseSource;
use crate::params::PhysicalConfig;
use crate::recorder::{observe, StepObservables};

// Rayon overhead dominates for the usual 50-200 cell meshes.
static PAR_THRESHOLD: OnceLock<usize> = OnceLock::new();
const DEFAULT_PAR_THRESHOLD: usize = 4096;

fn par_threshold() -> usize {
    *PAR_THRESHOLD.get_or_init(|| {
        std::env::var("DFB_PAR_THRESHOLD")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAR_THRESHOLD)
    })
}

/// Work buffers for [`step_traveling_wave`], sized to the mesh.
pub struct StepScratch {
    gain: Vec<f64>,
    detuning: Vec<f64>,
    noise: Vec<Complex64>,
    prop_f: Vec<Complex64>,
    prop_r: Vec<Complex64>,
    cosh_k: f64,
    sinh_k: f64,
    parallel: bool,
}

impl StepScratch {
    pub fn new(mesh: &MeshClock, cfg: &PhysicalConfig) -> Self {
        let m = mesh.cells;
        let zero = Complex::new(0.0, 0.0);
        let kdz = cfg.kappa() * mesh.dz;
        Self {
            gain: vec![0.0; m],
            detuning: vec![0.0; m],
            noise: vec![zero; m],
            prop_f: vec![zero; m],
            prop_r: vec![zero; m],
            cosh_k: kdz.cosh(),
            sinh_k: kdz.sinh(),
            parallel: m >= par_threshold(),
        }
    }

    /// Net field gain per cell from the last step (cm^-1).
    pub fn gain(&self) -> &[f64] {
        &self.gain
    }

    /// Detuning from the Bragg condition per cell from the last step (cm^-1).
    pub fn detuning(&self) -> &[f64] {
        &self.detuning
    }
}

/// Field gain and detuning of one cell.
#[inline]
fn gain_and_detuning(cfg: &PhysicalConfig, n: f64, s: f64) -> (f64, f64) {
    let two_pi = 2.0 * std::f64::consts::PI;
    let sat = 1.0 + cfg.gain_compression * s;
    let dn = n - cfg.transparency_density;

    let g = 0.5 * (cfg.confinement * cfg.differential_gain * dn / sat - cfg.internal_loss);

    let dn_eff = cfg.linewidth_enhancement * cfg.confinement * cfg.differential_gain * dn
        * cfg.wavelength
        / (2.0 * two_pi * sat);
    let du = two_pi * (cfg.n_eff - dn_eff) / cfg.wavelength
        - std::f64::consts::PI / cfg.grating_period;

    (g, du)
}

/// dN/dt for one cell.
#[inline]
fn carrier_rate(cfg: &PhysicalConfig, injection: f64, vg: f64, n: f64, s: f64) -> f64 {
    injection
        - cfg.recombination_rate(n)
        - vg * cfg.differential_gain * (n - cfg.transparency_density) * s
            / (1.0 + cfg.gain_compression * s)
}

fn fill_gain_detuning(
    cfg: &PhysicalConfig,
    carriers: &[f64],
    photon: &[f64],
    gain: &mut [f64],
    detuning: &mut [f64],
    parallel: bool,
) {
    if parallel {
        gain.par_iter_mut()
            .zip_eq(detuning.par_iter_mut())
            .zip_eq(carriers.par_iter().zip_eq(photon.par_iter()))
            .for_each(|((g, du), (&n, &s))| {
                (*g, *du) = gain_and_detuning(cfg, n, s);
            });
    } else {
        for (((g, du), &n), &s) in gain
            .iter_mut()
            .zip(detuning.iter_mut())
            .zip(carriers)
            .zip(photon)
        {
            (*g, *du) = gain_and_detuning(cfg, n, s);
        }
    }
}

fn update_carriers(
    cfg: &PhysicalConfig,
    mesh: &MeshClock,
    carriers: &mut [f64],
    s_mid: &[f64],
    parallel: bool,
) {
    let injection = cfg.injection_rate();
    let vg = cfg.group_velocity();
    let dt = mesh.dt;

    if parallel {
        carriers
            .par_iter_mut()
            .zip_eq(s_mid.par_iter())
            .for_each(|(n, &s)| *n += dt * carrier_rate(cfg, injection, vg, *n, s));
    } else {
        for (n, &s) in carriers.iter_mut().zip(s_mid) {
            *n += dt * carrier_rate(cfg, injection, vg, *n, s);
        }
    }
}

/// Advance `state` by one time step and return the step's observables.
///
/// Fails only when a non-finite value shows up in the state; unbounded but
/// finite growth is passed through untouched.
pub fn step_traveling_wave<S: NoiseSource + ?Sized>(
    state: &mut FieldState,
    cfg: &PhysicalConfig,
    mesh: &MeshClock,
    noise: &mut S,
    scratch: &mut StepScratch,
    step: usize,
) -> SimResult<StepObservables> {
    let m = mesh.cells;
    debug_assert_eq!(state.cells(), m);
    let dz = mesh.dz;

    state.photon_history[HIST_PREV].copy_from_slice(&state.photon);

    fill_gain_detuning(
        cfg,
        &state.carriers,
        &state.photon,
        &mut scratch.gain,
        &mut scratch.detuning,
        scratch.parallel,
    );

    noise.fill(&state.carriers, cfg, mesh, &mut scratch.noise);

    // F moves right (reads F[i], writes F[i+1]); R moves left (reads R[i+1], writes R[i]).
    for i in 0..m {
        let p = (Complex::new(scratch.gain[i], -scratch.detuning[i]) * dz).exp();
        let src = scratch.noise[i] * dz;
        scratch.prop_f[i] = p * state.forward[i] + src;
        scratch.prop_r[i] = p * state.backward[i + 1] + src;
    }

    let c = scratch.cosh_k;
    let js = Complex::new(0.0, scratch.sinh_k);
    for i in 0..m {
        let f = scratch.prop_f[i];
        let r = scratch.prop_r[i];
        state.forward[i + 1] = f * c - js * r;
        state.backward[i] = r * c - js * f;
    }

    state.apply_facets(cfg);

    state.update_photon_density();
    {
        let [prev, curr, mid] = &mut state.photon_history;
        curr.copy_from_slice(&state.photon);
        for ((s_mid, &a), &b) in mid.iter_mut().zip(prev.iter()).zip(curr.iter()) {
            *s_mid = 0.5 * (a + b);
        }
    }

    update_carriers(
        cfg,
        mesh,
        &mut state.carriers,
        &state.photon_history[HIST_MID],
        scratch.parallel,
    );

    if let Some((array, cell)) = state.find_non_finite() {
        log::warn!("non-finite {array} in cell {cell} at step {step}");
        return Err(SimError::NumericalDivergence { step, array, cell });
    }

    Ok(observe(state, cfg))
}
