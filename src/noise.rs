// src/noise.rs
//
// Spontaneous-emission source term injected into both field envelopes.
// The random context is always owned by the caller-supplied source, so a fixed
// seed reproduces the same noise sequence bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rustfft::num_complex::Complex;

use crate::error::{SimError, SimResult};
use crate::field_state::Complex64;
use crate::grid::MeshClock;
use crate::params::PhysicalConfig;

/// Per-cell complex noise, drawn once per time step.
pub trait NoiseSource {
    /// Fill `out[i]` for every cell given the instantaneous carrier density.
    fn fill(
        &mut self,
        carriers: &[f64],
        cfg: &PhysicalConfig,
        mesh: &MeshClock,
        out: &mut [Complex64],
    );
}

/// RMS spontaneous-emission amplitude sqrt(|β·Γ·K·B·N² / (Δz·v_g)|).
#[inline]
pub fn spontaneous_amplitude(n: f64, cfg: &PhysicalConfig, mesh: &MeshClock) -> f64 {
    let rate = cfg.spontaneous_coupling * cfg.confinement * cfg.petermann * cfg.recomb_b * n * n;
    (rate / (mesh.dz * cfg.group_velocity())).abs().sqrt()
}

/// Gaussian-amplitude, uniform-phase spontaneous emission.
pub struct SpontaneousEmission {
    rng: StdRng,
    normal: Normal<f64>,
    /// Multiplies every sample; 0 switches the source off.
    pub scale: f64,
}

impl SpontaneousEmission {
    /// Deterministic source for a given seed.
    pub fn from_seed(seed: u64, scale: f64) -> SimResult<Self> {
        Self::with_rng(StdRng::seed_from_u64(seed), scale)
    }

    /// Seed from the thread RNG (non-reproducible runs).
    pub fn from_entropy(scale: f64) -> SimResult<Self> {
        let rng = StdRng::from_rng(rand::thread_rng())
            .map_err(|e| SimError::NoiseInit(format!("cannot seed StdRng: {e}")))?;
        Self::with_rng(rng, scale)
    }

    fn with_rng(rng: StdRng, scale: f64) -> SimResult<Self> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(SimError::NoiseInit(format!(
                "noise scale must be finite and >= 0, got {scale}"
            )));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| SimError::NoiseInit(format!("normal distribution: {e}")))?;
        Ok(Self { rng, normal, scale })
    }
}

impl NoiseSource for SpontaneousEmission {
    fn fill(
        &mut self,
        carriers: &[f64],
        cfg: &PhysicalConfig,
        mesh: &MeshClock,
        out: &mut [Complex64],
    ) {
        debug_assert_eq!(carriers.len(), out.len());
        let two_pi = 2.0 * std::f64::consts::PI;

        // draw every amplitude first, then every phase
        for (o, &n) in out.iter_mut().zip(carriers) {
            let a = self.normal.sample(&mut self.rng);
            *o = Complex::new(self.scale * spontaneous_amplitude(n, cfg, mesh) * a, 0.0);
        }
        for o in out.iter_mut() {
            let phase: f64 = two_pi * self.rng.gen::<f64>();
            *o *= Complex::from_polar(1.0, phase);
        }
    }
}

/// No spontaneous emission at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl NoiseSource for Silent {
    fn fill(
        &mut self,
        _carriers: &[f64],
        _cfg: &PhysicalConfig,
        _mesh: &MeshClock,
        out: &mut [Complex64],
    ) {
        out.fill(Complex::new(0.0, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PhysicalConfig, MeshClock) {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, 16, 1e-10).unwrap();
        (cfg, mesh)
    }

    #[test]
    fn same_seed_same_samples() {
        let (cfg, mesh) = setup();
        let n = vec![cfg.transparency_density; mesh.cells];

        let mut a = SpontaneousEmission::from_seed(7, 1.0).unwrap();
        let mut b = SpontaneousEmission::from_seed(7, 1.0).unwrap();
        let mut c = SpontaneousEmission::from_seed(8, 1.0).unwrap();

        let zero = Complex::new(0.0, 0.0);
        let (mut sa, mut sb, mut sc) = (vec![zero; 16], vec![zero; 16], vec![zero; 16]);
        for _ in 0..5 {
            a.fill(&n, &cfg, &mesh, &mut sa);
            b.fill(&n, &cfg, &mesh, &mut sb);
            c.fill(&n, &cfg, &mesh, &mut sc);
            assert_eq!(sa, sb);
        }
        assert_ne!(sa, sc);
    }

    #[test]
    fn sample_variance_matches_amplitude() {
        let (cfg, mesh) = setup();
        let n = vec![1.5e18; mesh.cells];
        let amp = spontaneous_amplitude(1.5e18, &cfg, &mesh);

        let mut src = SpontaneousEmission::from_seed(11, 1.0).unwrap();
        let mut out = vec![Complex::new(0.0, 0.0); mesh.cells];
        let mut acc = 0.0;
        let draws = 4000;
        for _ in 0..draws {
            src.fill(&n, &cfg, &mesh, &mut out);
            acc += out.iter().map(|z| z.norm_sqr()).sum::<f64>();
        }
        let mean = acc / (draws * mesh.cells) as f64;
        let rel = (mean / (amp * amp) - 1.0).abs();
        assert!(rel < 0.05, "E|s|^2 / amp^2 - 1 = {rel}");
    }

    #[test]
    fn amplitude_scales_linearly_with_density() {
        let (cfg, mesh) = setup();
        let a1 = spontaneous_amplitude(1e18, &cfg, &mesh);
        let a2 = spontaneous_amplitude(2e18, &cfg, &mesh);
        assert!((a2 / a1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_scale_and_silent_give_zero() {
        let (cfg, mesh) = setup();
        let n = vec![cfg.transparency_density; mesh.cells];
        let mut out = vec![Complex::new(1.0, 1.0); mesh.cells];

        let mut off = SpontaneousEmission::from_seed(3, 0.0).unwrap();
        off.fill(&n, &cfg, &mesh, &mut out);
        assert!(out.iter().all(|z| z.norm() == 0.0));

        out.fill(Complex::new(1.0, 1.0));
        Silent.fill(&n, &cfg, &mesh, &mut out);
        assert!(out.iter().all(|z| z.norm() == 0.0));
    }

    #[test]
    fn negative_scale_is_an_init_error() {
        assert!(matches!(
            SpontaneousEmission::from_seed(1, -1.0),
            Err(SimError::NoiseInit(_))
        ));
    }
}
