// src/spectrum.rs
//
// Optical spectrum of the recorded right-facet field:
// Hamming window -> zero-pad to 2^k -> FFT -> shift -> |Y|^2 / NFFT -> peak-normalised,
// with the frequency axis mapped to wavelength via λ = c / (f + f0).

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::field_state::Complex64;
use crate::params::C_CM_PER_S;

/// Power spectrum on a symmetric frequency axis around the carrier.
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// Offset from the optical carrier (Hz), ascending.
    pub frequency_offset: Vec<f64>,
    /// Wavelength of each bin (cm).
    pub wavelength: Vec<f64>,
    /// Power relative to the spectral peak (peak = 1).
    pub relative_power: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.relative_power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relative_power.is_empty()
    }

    /// 10·log10 of the relative power. Empty bins come out as -inf.
    pub fn relative_power_db(&self) -> Vec<f64> {
        self.relative_power.iter().map(|p| 10.0 * p.log10()).collect()
    }

    /// Wavelength (cm) of the strongest bin.
    pub fn peak_wavelength(&self) -> Option<f64> {
        let (k, _) = self
            .relative_power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some(self.wavelength[k])
    }
}

/// The last `window / dt` samples of `series` (all of it if shorter).
pub fn steady_state_window<T>(series: &[T], dt: f64, window: f64) -> &[T] {
    let n = ((window / dt).round().max(0.0) as usize).min(series.len());
    &series[series.len() - n..]
}

/// Symmetric Hamming window of length n.
pub fn hamming(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|k| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * k as f64 / denom).cos())
        .collect()
}

/// Spectrum of a complex envelope sampled every `dt`, around carrier `f0` (Hz).
pub fn optical_spectrum(samples: &[Complex64], dt: f64, f0: f64) -> Spectrum {
    if samples.is_empty() {
        return Spectrum::default();
    }

    let nfft = samples.len().next_power_of_two();
    let win = hamming(samples.len());

    let mut buf = vec![Complex::new(0.0, 0.0); nfft];
    for ((b, &s), &w) in buf.iter_mut().zip(samples).zip(&win) {
        *b = s * w;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nfft);
    fft.process(&mut buf);

    // fftshift: zero frequency to the middle
    buf.rotate_right(nfft / 2);

    let mut power: Vec<f64> = buf.iter().map(|y| y.norm_sqr() / nfft as f64).collect();
    let peak = power.iter().cloned().fold(0.0_f64, f64::max);
    if peak > 0.0 {
        for p in &mut power {
            *p /= peak;
        }
    }

    let fs = 1.0 / dt;
    let half = (nfft / 2) as f64;
    let frequency_offset: Vec<f64> = (0..nfft)
        .map(|k| (k as f64 - half) * fs / nfft as f64)
        .collect();
    let wavelength = frequency_offset
        .iter()
        .map(|&f| C_CM_PER_S / (f + f0))
        .collect();

    Spectrum {
        frequency_offset,
        wavelength,
        relative_power: power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_takes_the_tail() {
        let x: Vec<usize> = (0..100).collect();
        let w = steady_state_window(&x, 1.0, 30.0);
        assert_eq!(w.len(), 30);
        assert_eq!(w[0], 70);
        assert_eq!(steady_state_window(&x, 1.0, 1e6).len(), 100);
    }

    #[test]
    fn hamming_endpoints_and_centre() {
        let w = hamming(5);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[4] - 0.08).abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tone_peaks_at_its_wavelength() {
        let dt = 1.2e-14;
        let n = 3000; // padded to 4096
        let nfft = 4096;
        let fs = 1.0 / dt;
        // put the tone exactly on bin +100
        let f_tone = 100.0 * fs / nfft as f64;
        let samples: Vec<Complex64> = (0..n)
            .map(|k| Complex::from_polar(1.0, 2.0 * std::f64::consts::PI * f_tone * k as f64 * dt))
            .collect();

        let f0 = C_CM_PER_S / 1.55e-4;
        let spec = optical_spectrum(&samples, dt, f0);
        assert_eq!(spec.len(), nfft);

        let (k_peak, &p_peak) = spec
            .relative_power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(p_peak, 1.0);
        assert_eq!(k_peak, nfft / 2 + 100);

        let expected = C_CM_PER_S / (f_tone + f0);
        let got = spec.peak_wavelength().unwrap();
        assert!((got - expected).abs() < 1e-15, "got {got}, expected {expected}");
        // positive frequency offset = shorter wavelength
        assert!(got < 1.55e-4);
    }

    #[test]
    fn empty_input_gives_empty_spectrum() {
        let spec = optical_spectrum(&[], 1e-14, 1e14);
        assert!(spec.is_empty());
        assert!(spec.peak_wavelength().is_none());
    }
}
