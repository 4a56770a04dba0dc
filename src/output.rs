// src/output.rs
//
// CSV writers for recorded series and spectra.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::recorder::OutputRecorder;
use crate::spectrum::Spectrum;

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

/// t_s, right_power_W, left_power_W, wavelength_shift_cm
pub fn write_power_csv(path: &Path, rec: &OutputRecorder, dt: f64) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "t_s,right_power_W,left_power_W,wavelength_shift_cm")?;
    let rows = rec
        .right_power()
        .iter()
        .zip(rec.left_power())
        .zip(rec.wavelength_shift())
        .enumerate();
    for (k, ((pr, pl), dl)) in rows {
        writeln!(
            f,
            "{:.6e},{:.6e},{:.6e},{:.6e}",
            (k + 1) as f64 * dt,
            pr,
            pl,
            dl
        )?;
    }
    f.flush()
}

/// t_s, re/im of F at the right facet, re/im of R at the left facet
pub fn write_boundary_fields_csv(path: &Path, rec: &OutputRecorder, dt: f64) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "t_s,f_right_re,f_right_im,r_left_re,r_left_im")?;
    for (k, (fr, rl)) in rec.right_field().iter().zip(rec.left_field()).enumerate() {
        writeln!(
            f,
            "{:.6e},{:.9e},{:.9e},{:.9e},{:.9e}",
            (k + 1) as f64 * dt,
            fr.re,
            fr.im,
            rl.re,
            rl.im
        )?;
    }
    f.flush()
}

/// wavelength_um, frequency_offset_Hz, relative_power, relative_power_dB
pub fn write_spectrum_csv(path: &Path, spec: &Spectrum) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "wavelength_um,frequency_offset_Hz,relative_power,relative_power_dB")?;
    let db = spec.relative_power_db();
    for k in 0..spec.len() {
        writeln!(
            f,
            "{:.9e},{:.6e},{:.6e},{:.4}",
            spec.wavelength[k] * 1e4,
            spec.frequency_offset[k],
            spec.relative_power[k],
            db[k]
        )?;
    }
    f.flush()
}
