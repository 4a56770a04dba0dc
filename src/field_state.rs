// src/field_state.rs

use rustfft::num_complex::Complex;

use crate::error::StateArray;
use crate::grid::MeshClock;
use crate::params::PhysicalConfig;

pub type Complex64 = Complex<f64>;

pub const HIST_PREV: usize = 0;
pub const HIST_CURR: usize = 1;
pub const HIST_MID: usize = 2;

/// Optical fields and carriers on the longitudinal mesh.
///
/// Fields live on the M+1 cell boundaries, photon and carrier densities on
/// the M cells.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub forward: Vec<Complex64>,
    pub backward: Vec<Complex64>,
    pub photon: Vec<f64>,
    /// Photon density slices: previous step, current step, and their mean.
    pub photon_history: [Vec<f64>; 3],
    pub carriers: Vec<f64>,
}

impl FieldState {
    /// Dark cavity with carriers at transparency.
    pub fn new(mesh: &MeshClock, cfg: &PhysicalConfig) -> Self {
        let m = mesh.cells;
        let zero = Complex::new(0.0, 0.0);
        Self {
            forward: vec![zero; m + 1],
            backward: vec![zero; m + 1],
            photon: vec![0.0; m],
            photon_history: [vec![0.0; m], vec![0.0; m], vec![0.0; m]],
            carriers: vec![cfg.transparency_density; m],
        }
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.photon.len()
    }

    /// Facet reflection: F[0] = r_left·R[0], R[M] = r_right·F[M].
    pub fn apply_facets(&mut self, cfg: &PhysicalConfig) {
        let m = self.cells();
        self.forward[0] = self.backward[0] * cfg.facets.r_left;
        self.backward[m] = self.forward[m] * cfg.facets.r_right;
    }

    /// Recompute the per-cell photon density from the boundary intensities.
    pub fn update_photon_density(&mut self) {
        for (i, s) in self.photon.iter_mut().enumerate() {
            let left = self.forward[i].norm_sqr() + self.backward[i].norm_sqr();
            let right = self.forward[i + 1].norm_sqr() + self.backward[i + 1].norm_sqr();
            *s = 0.5 * left + 0.5 * right;
        }
    }

    /// (right-going field at the right facet, left-going field at the left facet)
    #[inline]
    pub fn boundary_fields(&self) -> (Complex64, Complex64) {
        (self.forward[self.cells()], self.backward[0])
    }

    pub fn total_photon_density(&self) -> f64 {
        self.photon.iter().sum()
    }

    pub fn mean_carrier_density(&self) -> f64 {
        if self.carriers.is_empty() {
            return 0.0;
        }
        self.carriers.iter().sum::<f64>() / self.carriers.len() as f64
    }

    /// First non-finite entry, scanning fields, then photons, then carriers.
    pub fn find_non_finite(&self) -> Option<(StateArray, usize)> {
        let complex_bad = |z: &Complex64| !(z.re.is_finite() && z.im.is_finite());

        if let Some(i) = self.forward.iter().position(complex_bad) {
            return Some((StateArray::Forward, i));
        }
        if let Some(i) = self.backward.iter().position(complex_bad) {
            return Some((StateArray::Backward, i));
        }
        if let Some(i) = self.photon.iter().position(|s| !s.is_finite()) {
            return Some((StateArray::Photon, i));
        }
        if let Some(i) = self.carriers.iter().position(|n| !n.is_finite()) {
            return Some((StateArray::Carriers, i));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(cells: usize) -> (PhysicalConfig, MeshClock) {
        let cfg = PhysicalConfig::default();
        let mesh = MeshClock::new(&cfg, cells, 1e-10).unwrap();
        (cfg, mesh)
    }

    #[test]
    fn new_state_is_dark_at_transparency() {
        let (cfg, mesh) = setup(8);
        let st = FieldState::new(&mesh, &cfg);
        assert_eq!(st.forward.len(), 9);
        assert_eq!(st.backward.len(), 9);
        assert_eq!(st.photon.len(), 8);
        assert!(st.carriers.iter().all(|&n| n == cfg.transparency_density));
        assert_eq!(st.total_photon_density(), 0.0);
        assert!(st.find_non_finite().is_none());
    }

    #[test]
    fn facets_reflect_with_given_coefficients() {
        let (cfg, mesh) = setup(4);
        let mut st = FieldState::new(&mesh, &cfg);
        st.backward[0] = Complex::new(1.0, -2.0);
        st.forward[4] = Complex::new(0.5, 0.25);
        st.apply_facets(&cfg);
        assert_eq!(st.forward[0], Complex::new(0.9, -1.8));
        assert_eq!(st.backward[4], Complex::new(0.05, 0.025));
    }

    #[test]
    fn photon_density_averages_cell_edges() {
        let (cfg, mesh) = setup(2);
        let mut st = FieldState::new(&mesh, &cfg);
        st.forward[1] = Complex::new(2.0, 0.0); // |F|^2 = 4 at the shared edge
        st.update_photon_density();
        assert!((st.photon[0] - 2.0).abs() < 1e-15);
        assert!((st.photon[1] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn non_finite_is_located() {
        let (cfg, mesh) = setup(5);
        let mut st = FieldState::new(&mesh, &cfg);
        st.carriers[3] = f64::NAN;
        assert_eq!(st.find_non_finite(), Some((StateArray::Carriers, 3)));
        st.backward[2] = Complex::new(f64::INFINITY, 0.0);
        assert_eq!(st.find_non_finite(), Some((StateArray::Backward, 2)));
    }
}
