//! Merge per-subject IMU exports into one training table per class.
//!
//! Input layout: `<root>/sub*/<Falls|ADLs>/*.xlsx`, one workbook per trial
//! whose first sheet carries the full sensor header set. Only the sternum
//! sensor is kept and the merged tables are written as CSV.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use serde::Serialize;

use crate::error::PipelineError;

/// Sternum columns in output order: accX, accY, accZ, gyroX, gyroY, gyroZ.
pub const STERNUM_COLUMNS: [&str; 6] = [
    "sternum Acceleration X (m/s^2)",
    "sternum Acceleration Y (m/s^2)",
    "sternum Acceleration Z (m/s^2)",
    "sternum Angular Velocity X (rad/s)",
    "sternum Angular Velocity Y (rad/s)",
    "sternum Angular Velocity Z (rad/s)",
];

pub const RAD_TO_DEG: f64 = 57.2958;

/// Activity folder and the label its rows receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuCategory {
    Falls,
    Adls,
}

impl ImuCategory {
    pub fn folder(self) -> &'static str {
        match self {
            Self::Falls => "Falls",
            Self::Adls => "ADLs",
        }
    }

    pub fn label(self) -> i64 {
        match self {
            Self::Falls => 1,
            Self::Adls => 0,
        }
    }

    pub fn output_file(self) -> &'static str {
        match self {
            Self::Falls => "training_falls.csv",
            Self::Adls => "training_adls.csv",
        }
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImuRow {
    #[serde(rename = "accX")]
    pub acc_x: f64,
    #[serde(rename = "accY")]
    pub acc_y: f64,
    #[serde(rename = "accZ")]
    pub acc_z: f64,
    #[serde(rename = "gyroX")]
    pub gyro_x: f64,
    #[serde(rename = "gyroY")]
    pub gyro_y: f64,
    #[serde(rename = "gyroZ")]
    pub gyro_z: f64,
    pub label: i64,
}

/// Outcome of merging one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_found: usize,
    pub files_merged: usize,
    pub rows: usize,
    /// `None` when nothing was merged and no file was written.
    pub output: Option<PathBuf>,
}

/// Workbooks for a category across all subjects, sorted.
pub fn find_category_files(root: &Path, category: ImuCategory) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for subject in std::fs::read_dir(root)? {
        let subject = subject?;
        if !subject.file_type()?.is_dir() || !subject.file_name().to_string_lossy().starts_with("sub") {
            continue;
        }
        let folder = subject.path().join(category.folder());
        if !folder.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&folder)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("xlsx")) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read the first sheet of one workbook. Returns `Ok(None)` when a sternum
/// column is missing.
pub fn read_export(path: &Path, label: i64) -> Result<Option<Vec<ImuRow>>, PipelineError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet = workbook.worksheet_range_at(0).ok_or_else(|| PipelineError::Parse {
        path: path.to_path_buf(),
        message: "workbook has no sheets".to_string(),
    })??;
    sheet_rows(&sheet, label).map_err(|message| PipelineError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Map a sheet whose first row is the header onto output rows.
///
/// Empty trailing rows are ignored; any other non-numeric sternum cell is an
/// error naming its 1-based spreadsheet row.
pub fn sheet_rows(sheet: &Range<Data>, label: i64) -> Result<Option<Vec<ImuRow>>, String> {
    let mut rows_iter = sheet.rows();
    let Some(headers) = rows_iter.next() else {
        return Ok(None);
    };

    let mut indices = [0usize; 6];
    for (slot, name) in indices.iter_mut().zip(STERNUM_COLUMNS) {
        let found = headers
            .iter()
            .position(|h| matches!(h, Data::String(s) if s.trim() == name));
        match found {
            Some(i) => *slot = i,
            None => return Ok(None),
        }
    }

    let mut rows = Vec::new();
    for (line, record) in rows_iter.enumerate() {
        if record.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut values = [0.0f64; 6];
        for (value, &i) in values.iter_mut().zip(&indices) {
            let cell = record.get(i).unwrap_or(&Data::Empty);
            *value = cell_number(cell)
                .ok_or_else(|| format!("row {}: invalid number '{cell}'", line + 2))?;
        }
        rows.push(ImuRow {
            acc_x: values[0],
            acc_y: values[1],
            acc_z: values[2],
            gyro_x: values[3] * RAD_TO_DEG,
            gyro_y: values[4] * RAD_TO_DEG,
            gyro_z: values[5] * RAD_TO_DEG,
            label,
        });
    }
    Ok(Some(rows))
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Merge every export of `category` under `root` into `<out_dir>/<output_file>`.
///
/// Office lock files (`~$*`), exports without the sternum columns and
/// unreadable files are skipped.
pub fn merge_category(
    root: &Path,
    category: ImuCategory,
    out_dir: &Path,
) -> Result<MergeSummary, PipelineError> {
    let files = find_category_files(root, category)?;
    tracing::info!(category = category.folder(), files = files.len(), "Merging IMU exports");

    let mut summary = MergeSummary {
        files_found: files.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();

    for path in &files {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if name.starts_with("~$") {
            continue;
        }
        match read_export(path, category.label()) {
            Ok(Some(mut file_rows)) => {
                rows.append(&mut file_rows);
                summary.files_merged += 1;
                if summary.files_merged % 50 == 0 {
                    tracing::info!(merged = summary.files_merged, "Merge progress");
                }
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "Missing sternum columns, skipping");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read export");
            }
        }
    }

    summary.rows = rows.len();
    if rows.is_empty() {
        return Ok(summary);
    }

    std::fs::create_dir_all(out_dir)?;
    let output = out_dir.join(category.output_file());
    write_rows(&output, &rows)?;

    tracing::info!(path = %output.display(), rows = summary.rows, "Wrote merged table");
    summary.output = Some(output);
    Ok(summary)
}

/// Write merged rows as a CSV table with an `accX,...,label` header.
pub fn write_rows(path: &Path, rows: &[ImuRow]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
