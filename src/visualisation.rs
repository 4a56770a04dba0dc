// src/visualisation.rs

use plotters::prelude::*;

/// y-range with a 10% margin; falls back to [0, 1] for empty/flat/NaN data.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-30 {
        let delta = if hi.abs() < 1e-30 { 1.0 } else { 0.1 * hi.abs() };
        return (lo - delta, hi + delta);
    }
    let margin = 0.1 * (hi - lo);
    (lo - margin, hi + margin)
}

/// Right-facet output power (mW) versus time (ns).
pub fn save_power_plot(
    times_ns: &[f64],
    power_mw: &[f64],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if times_ns.is_empty() {
        return Ok(()); // nothing to plot
    }

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let t_min = times_ns[0];
    let t_max = times_ns[times_ns.len() - 1].max(t_min + 1e-12);
    let (y_min, y_max) = padded_range(power_mw);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Output Power vs. Time", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (ns)")
        .y_desc("Output power (mW)")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times_ns.iter().zip(power_mw.iter()).map(|(&t, &p)| (t, p)),
        &RED,
    ))?;

    root.present()?;
    Ok(())
}

/// Optical spectrum in dB relative to the peak, over 1.530–1.570 µm.
pub fn save_spectrum_plot(
    wavelength_um: &[f64],
    power_db: &[f64],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if wavelength_um.is_empty() {
        return Ok(());
    }

    let (x_min, x_max) = (1.530, 1.570);
    let (y_min, y_max) = (-150.0, 10.0);

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Optical spectrum", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (um)")
        .y_desc("Relative power (dB)")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    // wavelength falls as frequency rises, so sort by x before drawing
    let mut pts: Vec<(f64, f64)> = wavelength_um
        .iter()
        .zip(power_db.iter())
        .filter(|(w, p)| w.is_finite() && (x_min..=x_max).contains(*w) && p.is_finite())
        .map(|(&w, &p)| (w, p.max(y_min)))
        .collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));

    chart.draw_series(LineSeries::new(pts, &BLUE))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_handles_flat_and_empty_data() {
        assert_eq!(padded_range(&[]), (0.0, 1.0));
        assert_eq!(padded_range(&[f64::NAN]), (0.0, 1.0));
        let (lo, hi) = padded_range(&[0.0, 0.0]);
        assert!(lo < 0.0 && hi > 0.0);
        let (lo, hi) = padded_range(&[1.0, 3.0]);
        assert!((lo - 0.8).abs() < 1e-12 && (hi - 3.2).abs() < 1e-12);
    }
}
