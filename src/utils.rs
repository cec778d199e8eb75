use std::path::{Path, PathBuf};

/// Minimum and maximum of the finite values, None if there are none.
pub fn finite_min_max<'a, I>(s: I) -> Option<(f64, f64)>
where
    I: Iterator<Item = &'a f64>,
{
    let mut finite = s.filter(|v| v.is_finite());
    let first = *finite.next()?;
    let (mut min, mut max) = (first, first);
    for &v in finite {
        if v > max {
            max = v
        } else if v < min {
            min = v
        }
    }
    Some((min, max))
}

/// Largest magnitude an axis end can take; wider data is clipped by the chart.
/// Keeps the axis span finite so that the mesh key points can be computed.
pub const AXIS_LIMIT: f64 = 1e300;

/// Axis range over the finite values, padded on both sides by a fraction of the span.
/// A single value is widened to +-1 around it (or by 10% of it when larger);
/// no finite values at all gives [-1, 1].
/// Both ends stay within +-AXIS_LIMIT, plus the padding.
pub fn padded_range<'a, I>(s: I, pad_fraction: f64) -> (f64, f64)
where
    I: Iterator<Item = &'a f64>,
{
    let (min, max) = match finite_min_max(s) {
        Some((min, max)) => (
            min.clamp(-AXIS_LIMIT, AXIS_LIMIT),
            max.clamp(-AXIS_LIMIT, AXIS_LIMIT),
        ),
        None => return (-1., 1.),
    };
    if max - min == 0. {
        let w = (min.abs() * 0.1).max(1.);
        (min - w, max + w)
    } else {
        let pad = (max - min) * pad_fraction;
        (min - pad, max + pad)
    }
}

/// Split the (x, y) pairs into runs of consecutive finite points.
/// A NaN in either coordinate ends the current run, so lines are not drawn across gaps.
pub fn finite_runs(x: &[f64], y: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (&xe, &ye) in x.iter().zip(y) {
        if xe.is_finite() && ye.is_finite() {
            current.push((xe, ye));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Accelerometer and gyroscope output paths, named after the input stem:
/// `<outdir>/<stem>_accel.<ext>` and `<outdir>/<stem>_gyro.<ext>`.
/// Without an outdir the charts go next to the input file.
pub fn output_paths(csvin: &Path, outdir: Option<&Path>, ext: &str) -> (PathBuf, PathBuf) {
    let stem = csvin
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("mpu_data"));
    let dir: PathBuf = match outdir {
        Some(d) => d.to_owned(),
        None => csvin.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    (
        dir.join(format!("{}_accel.{}", stem, ext)),
        dir.join(format!("{}_gyro.{}", stem, ext)),
    )
}
