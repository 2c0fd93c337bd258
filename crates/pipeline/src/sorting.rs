//! Dataset curation: pick confident coughs and sample background noise.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::index;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::PipelineError;

/// Minimum `cough_detected` score for a clip to count as a cough.
pub const MIN_COUGH_CONFIDENCE: f64 = 0.85;

/// Default number of clips collected per class.
pub const DEFAULT_TARGET_COUNT: usize = 3000;

/// Folders never sampled for noise.
pub const NOISE_SKIP_FOLDERS: &[&str] = &["cough"];

/// Audio extensions a cough report may sit next to, in preference order.
const COUGH_AUDIO_EXTENSIONS: &[&str] = &["webm", "wav"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub scanned: usize,
    pub copied: usize,
}

/// Read the `cough_detected` score from a report. Scores may be numbers or
/// numeric strings; a missing score is 0.
pub fn cough_score(report: &Value) -> Option<f64> {
    match report.get("cough_detected") {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    }
}

fn sibling_audio(report: &Path) -> Option<PathBuf> {
    COUGH_AUDIO_EXTENSIONS
        .iter()
        .map(|ext| report.with_extension(ext))
        .find(|p| p.is_file())
}

/// Copy clips whose JSON report scores at least `min_confidence` from
/// `source` into `target`, stopping after `max_files`.
///
/// Corrupt reports and reports without audio are skipped.
pub fn sort_coughs(
    source: &Path,
    target: &Path,
    min_confidence: f64,
    max_files: usize,
) -> Result<SortSummary, PipelineError> {
    std::fs::create_dir_all(target)?;

    let mut reports: Vec<PathBuf> = std::fs::read_dir(source)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    reports.sort();
    tracing::info!(source = %source.display(), reports = reports.len(), "Scanning cough reports");

    let mut summary = SortSummary::default();
    for report in &reports {
        if summary.copied >= max_files {
            tracing::info!(copied = summary.copied, "Target reached");
            break;
        }
        summary.scanned += 1;

        let score = std::fs::read_to_string(report)
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .and_then(|json| cough_score(&json));
        let Some(score) = score else {
            tracing::debug!(path = %report.display(), "Unreadable report");
            continue;
        };
        if score < min_confidence {
            continue;
        }
        let Some(audio) = sibling_audio(report) else {
            continue;
        };
        let Some(name) = audio.file_name() else {
            continue;
        };

        match std::fs::copy(&audio, target.join(name)) {
            Ok(_) => {
                summary.copied += 1;
                if summary.copied % 100 == 0 {
                    tracing::info!(copied = summary.copied, "Cough sort progress");
                }
            }
            Err(e) => tracing::warn!(path = %audio.display(), error = %e, "Copy failed"),
        }
    }

    tracing::info!(copied = summary.copied, target = %target.display(), "Cough sort finished");
    Ok(summary)
}

/// All `.wav` files under `source`, excluding [`NOISE_SKIP_FOLDERS`], sorted.
pub fn noise_candidates(source: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let walker = WalkDir::new(source).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !(e.file_type().is_dir() && e.depth() > 0 && NOISE_SKIP_FOLDERS.iter().any(|s| *s == name))
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "wav") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Randomly pick up to `count` noise clips and copy them into `target` as
/// `noise_0000.wav`, `noise_0001.wav`, ...
pub fn sort_noise(
    source: &Path,
    target: &Path,
    count: usize,
    rng: &mut StdRng,
) -> Result<SortSummary, PipelineError> {
    std::fs::create_dir_all(target)?;

    let candidates = noise_candidates(source)?;
    if candidates.len() < count {
        tracing::warn!(found = candidates.len(), wanted = count, "Not enough noise files");
    }
    let take = count.min(candidates.len());
    let picked = index::sample(rng, candidates.len(), take);

    let mut summary = SortSummary {
        scanned: candidates.len(),
        copied: 0,
    };
    for i in picked.iter() {
        let src = &candidates[i];
        let dst = target.join(format!("noise_{:04}.wav", summary.copied));
        match std::fs::copy(src, &dst) {
            Ok(_) => {
                summary.copied += 1;
                if summary.copied % 500 == 0 {
                    tracing::info!(copied = summary.copied, "Noise sort progress");
                }
            }
            Err(e) => tracing::warn!(path = %src.display(), error = %e, "Copy failed"),
        }
    }

    tracing::info!(copied = summary.copied, target = %target.display(), "Noise sort finished");
    Ok(summary)
}
