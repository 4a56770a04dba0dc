// src/params.rs
//
// Material, structure, facet and drive parameters for the DFB laser.
// Units are CGS-like throughout (cm, s, cm^-3); power comes out in W because
// the photon energy uses SI Planck's constant.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Speed of light in vacuum (cm/s).
pub const C_CM_PER_S: f64 = 3e10;
/// Elementary charge (C).
pub const Q_ELECTRON: f64 = 1.602e-19;
/// Planck's constant (J s).
pub const H_PLANCK: f64 = 6.626e-34;

/// Facet reflectivities.
///
/// The same values act as the boundary reflection coefficients for the field
/// envelopes and as the output-coupling reflectivities in the facet power
/// formula, see [`PhysicalConfig::output_coupling_left`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facets {
    pub r_left: f64,  // HR facet
    pub r_right: f64, // output facet
}

impl Default for Facets {
    fn default() -> Self {
        Self {
            r_left: 0.9,
            r_right: 0.1,
        }
    }
}

/// Immutable physical description of the device for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConfig {
    pub wavelength: f64,            // reference lasing wavelength (cm)
    pub grating_period: f64,        // (cm)
    pub length: f64,                // cavity length L (cm)
    pub thickness: f64,             // active layer thickness (cm)
    pub width: f64,                 // active layer width (cm)
    pub confinement: f64,           // Γ
    pub n_eff: f64,                 // effective index without injection
    pub n_group: f64,               // group index
    pub internal_loss: f64,         // α_int (cm^-1)
    pub differential_gain: f64,     // g_N (cm^2)
    pub transparency_density: f64,  // N0 (cm^-3)
    pub gain_compression: f64,      // ε (cm^3)
    pub linewidth_enhancement: f64, // α_H
    pub recomb_a: f64,              // linear recombination (s^-1)
    pub recomb_b: f64,              // bimolecular (cm^3 s^-1)
    pub recomb_c: f64,              // Auger (cm^6 s^-1)
    pub spontaneous_coupling: f64,  // β_sp
    pub petermann: f64,             // transverse Petermann factor K
    pub facets: Facets,
    /// Grating coupling per unit length (cm^-1). The coupling coefficient fed
    /// to the 2x2 grating matrix is this value times the cavity length.
    pub grating_strength: f64,
    pub current: f64, // drive current (A)
}

impl Default for PhysicalConfig {
    /// 1.55 µm DFB reference device, 600 µm long, driven at 50 mA.
    fn default() -> Self {
        Self {
            wavelength: 1.55e-4,
            grating_period: 242.1875e-7,
            length: 600e-4,
            thickness: 0.2e-4,
            width: 1.5e-4,
            confinement: 0.3,
            n_eff: 3.2,
            n_group: 3.6,
            internal_loss: 10.0,
            differential_gain: 2.5e-16,
            transparency_density: 1e18,
            gain_compression: 5e-17,
            linewidth_enhancement: 4.0,
            recomb_a: 0.1e9,
            recomb_b: 1e-10,
            recomb_c: 7.5e-29,
            spontaneous_coupling: 5e-5,
            petermann: 1.0,
            facets: Facets::default(),
            grating_strength: 150.0,
            current: 50e-3,
        }
    }
}

impl PhysicalConfig {
    /// Active region volume L·d·w (cm^3).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.thickness * self.width
    }

    /// Group velocity c / n_g (cm/s).
    #[inline]
    pub fn group_velocity(&self) -> f64 {
        C_CM_PER_S / self.n_group
    }

    /// Coupling coefficient κ used by the grating matrix (grating strength × length).
    #[inline]
    pub fn kappa(&self) -> f64 {
        self.grating_strength * self.length
    }

    /// Optical carrier frequency c / λ (Hz).
    #[inline]
    pub fn optical_frequency(&self) -> f64 {
        C_CM_PER_S / self.wavelength
    }

    /// Photon energy h·c/λ (J).
    #[inline]
    pub fn photon_energy(&self) -> f64 {
        H_PLANCK * self.optical_frequency()
    }

    /// Reflectivity entering the left-facet output power formula.
    /// Taken to be the left facet reflectivity itself.
    #[inline]
    pub fn output_coupling_left(&self) -> f64 {
        self.facets.r_left
    }

    /// Reflectivity entering the right-facet output power formula.
    #[inline]
    pub fn output_coupling_right(&self) -> f64 {
        self.facets.r_right
    }

    /// Carrier injection rate I/(qV) (cm^-3 s^-1).
    #[inline]
    pub fn injection_rate(&self) -> f64 {
        self.current / (Q_ELECTRON * self.volume())
    }

    /// Drive current that exactly balances spontaneous/non-radiative
    /// recombination at carrier density `n` (A).
    pub fn current_for_density(&self, n: f64) -> f64 {
        Q_ELECTRON * self.volume() * self.recombination_rate(n)
    }

    /// A·N + B·N² + C·N³ (cm^-3 s^-1).
    #[inline]
    pub fn recombination_rate(&self, n: f64) -> f64 {
        self.recomb_a * n + self.recomb_b * n * n + self.recomb_c * n * n * n
    }

    /// Check every invariant. The integrator is never built from a config
    /// that fails here.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("wavelength", self.wavelength),
            ("grating_period", self.grating_period),
            ("length", self.length),
            ("thickness", self.thickness),
            ("width", self.width),
            ("n_eff", self.n_eff),
            ("n_group", self.n_group),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(SimError::Config(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }

        let non_negative = [
            ("internal_loss", self.internal_loss),
            ("differential_gain", self.differential_gain),
            ("transparency_density", self.transparency_density),
            ("gain_compression", self.gain_compression),
            ("recomb_a", self.recomb_a),
            ("recomb_b", self.recomb_b),
            ("recomb_c", self.recomb_c),
            ("spontaneous_coupling", self.spontaneous_coupling),
            ("petermann", self.petermann),
            ("grating_strength", self.grating_strength),
            ("current", self.current),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(SimError::Config(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }

        if !self.linewidth_enhancement.is_finite() {
            return Err(SimError::Config(format!(
                "linewidth_enhancement must be finite, got {}",
                self.linewidth_enhancement
            )));
        }

        if !(0.0..=1.0).contains(&self.confinement) {
            return Err(SimError::Config(format!(
                "confinement must be in [0, 1], got {}",
                self.confinement
            )));
        }
        if self.confinement == 0.0 {
            // output power divides by Γ
            return Err(SimError::Config("confinement must be > 0".to_string()));
        }

        for (name, r) in [("r_left", self.facets.r_left), ("r_right", self.facets.r_right)] {
            if !(0.0..=1.0).contains(&r) {
                return Err(SimError::Config(format!(
                    "{name} must be in [0, 1], got {r}"
                )));
            }
        }

        Ok(())
    }

    /// Load from a JSON string and validate.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
