//! Motion features for the fall model and the SisFall recording reader.
//!
//! A window of accelerometer and gyroscope readings is reduced to eight
//! numbers: mean, standard deviation, maximum and minimum of the
//! acceleration magnitude, then the same four for the angular-rate
//! magnitude.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ndarray::{Array1, Array2};
use ndarray_npy::write_npy;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::PipelineError;

pub const FEATURE_COUNT: usize = 8;

/// Samples per analysis window (2 s at the SisFall rate of 200 Hz).
pub const DEFAULT_WINDOW: usize = 400;
pub const DEFAULT_STEP: usize = 200;

pub const FALL_LABEL: i64 = 1;
pub const ADL_LABEL: i64 = 0;

/// ADXL345 counts to g: 13-bit resolution over a ±16 g range.
const ADXL345_SCALE: f64 = (2.0 * 16.0) / 8192.0;

/// ITG3200 counts to °/s: 16-bit resolution over ±2000 °/s.
const ITG3200_SCALE: f64 = (2.0 * 2000.0) / 65536.0;

/// Activity code at the start of a SisFall file name, e.g. `F05_SA01_R01.txt`.
static ACTIVITY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kind>[DF])(?P<num>\d{2})_").expect("valid activity code regex")
});

/// One accelerometer + gyroscope reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Acceleration in g.
    pub accel: [f64; 3],
    /// Angular rate in °/s.
    pub gyro: [f64; 3],
}

fn magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// `[mean, std, max, min]` with population standard deviation.
fn summarize(values: impl Iterator<Item = f64> + Clone) -> [f64; 4] {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let var = values.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = values.fold(f64::INFINITY, f64::min);
    [mean, var.sqrt(), max, min]
}

/// Reduce a window of readings to the eight-value feature vector.
pub fn extract_motion_features(window: &[ImuSample]) -> Result<[f64; FEATURE_COUNT], PipelineError> {
    if window.is_empty() {
        return Err(PipelineError::InvalidInput(
            "cannot extract features from an empty window".to_string(),
        ));
    }

    let accel = summarize(window.iter().map(|s| magnitude(&s.accel)));
    let gyro = summarize(window.iter().map(|s| magnitude(&s.gyro)));

    let mut out = [0.0; FEATURE_COUNT];
    out[..4].copy_from_slice(&accel);
    out[4..].copy_from_slice(&gyro);
    Ok(out)
}

/// Fixed-size windows advancing by `step`. A recording shorter than one
/// window yields nothing.
pub fn windows(samples: &[ImuSample], size: usize, step: usize) -> impl Iterator<Item = &[ImuSample]> {
    let step = step.max(1);
    let count = if size == 0 || samples.len() < size {
        0
    } else {
        (samples.len() - size) / step + 1
    };
    (0..count).map(move |i| &samples[i * step..i * step + size])
}

// ---------------------------------------------------------------------------
// SisFall
// ---------------------------------------------------------------------------

/// Label for a SisFall file name: `F##` is a fall, `D##` an activity of
/// daily living. Anything else is not a recording.
pub fn activity_label(file_name: &str) -> Option<i64> {
    let caps = ACTIVITY_CODE.captures(file_name)?;
    match &caps["kind"] {
        "F" => Some(FALL_LABEL),
        "D" => Some(ADL_LABEL),
        _ => None,
    }
}

/// Parse a SisFall recording.
///
/// Each record holds nine comma-separated counts terminated by `;`: ADXL345
/// x/y/z, ITG3200 x/y/z, then the MMA8451Q accelerometer, which is ignored.
pub fn parse_sisfall(text: &str, path: &Path) -> Result<Vec<ImuSample>, PipelineError> {
    let parse_err = |line: usize, message: String| PipelineError::Parse {
        path: path.to_path_buf(),
        message: format!("line {line}: {message}"),
    };

    let mut samples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let record = line.trim().trim_end_matches(';').trim();
        if record.is_empty() {
            continue;
        }

        let values = record
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| parse_err(idx + 1, e.to_string()))?;
        if values.len() != 9 {
            return Err(parse_err(idx + 1, format!("expected 9 columns, found {}", values.len())));
        }

        samples.push(ImuSample {
            accel: [
                values[0] * ADXL345_SCALE,
                values[1] * ADXL345_SCALE,
                values[2] * ADXL345_SCALE,
            ],
            gyro: [
                values[3] * ITG3200_SCALE,
                values[4] * ITG3200_SCALE,
                values[5] * ITG3200_SCALE,
            ],
        });
    }
    Ok(samples)
}

/// Windowed motion features for both classes.
#[derive(Debug, Clone)]
pub struct MotionDataset {
    pub falls: Array2<f32>,
    pub adls: Array2<f32>,
    pub files_read: usize,
    pub files_skipped: usize,
}

impl MotionDataset {
    /// Write `fall_features.npy`, `fall_labels.npy`, `adl_features.npy` and
    /// `adl_labels.npy` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<(), PipelineError> {
        std::fs::create_dir_all(dir)?;
        write_npy(dir.join("fall_features.npy"), &self.falls)?;
        write_npy(
            dir.join("fall_labels.npy"),
            &Array1::from_elem(self.falls.nrows(), FALL_LABEL),
        )?;
        write_npy(dir.join("adl_features.npy"), &self.adls)?;
        write_npy(
            dir.join("adl_labels.npy"),
            &Array1::from_elem(self.adls.nrows(), ADL_LABEL),
        )?;
        Ok(())
    }
}

fn into_matrix(rows: Vec<[f64; FEATURE_COUNT]>) -> Result<Array2<f32>, PipelineError> {
    let n = rows.len();
    let flat = rows.into_iter().flatten().map(|v| v as f32).collect();
    Ok(Array2::from_shape_vec((n, FEATURE_COUNT), flat)?)
}

/// Walk a SisFall tree and extract windowed features from every recording.
///
/// Files that fail to parse are logged and skipped.
pub fn extract_sisfall(root: &Path, window: usize, step: usize) -> Result<MotionDataset, PipelineError> {
    if window == 0 {
        return Err(PipelineError::InvalidInput("window must be positive".to_string()));
    }

    let mut recordings: Vec<(PathBuf, i64)> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".txt") {
            continue;
        }
        if let Some(label) = activity_label(&name) {
            recordings.push((entry.path().to_path_buf(), label));
        }
    }

    let mut falls = Vec::new();
    let mut adls = Vec::new();
    let mut files_read = 0;
    let mut files_skipped = 0;

    for (path, label) in &recordings {
        let samples = match std::fs::read_to_string(path)
            .map_err(PipelineError::from)
            .and_then(|text| parse_sisfall(&text, path))
        {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping recording");
                files_skipped += 1;
                continue;
            }
        };
        files_read += 1;

        let target = if *label == FALL_LABEL { &mut falls } else { &mut adls };
        for w in windows(&samples, window, step) {
            target.push(extract_motion_features(w)?);
        }
    }

    tracing::info!(
        root = %root.display(),
        files_read,
        files_skipped,
        fall_windows = falls.len(),
        adl_windows = adls.len(),
        "SisFall extraction finished"
    );

    Ok(MotionDataset {
        falls: into_matrix(falls)?,
        adls: into_matrix(adls)?,
        files_read,
        files_skipped,
    })
}
