//! Audio dataset scanning and batch MFCC extraction.

use std::path::{Path, PathBuf};

use ndarray::{s, Array1, Array3};
use ndarray_npy::write_npy;
use walkdir::WalkDir;

use crate::audio::load_audio;
use crate::error::PipelineError;
use crate::mfcc::{MfccExtractor, N_FRAMES, N_MFCC};

/// Extensions picked up by a dataset scan.
pub const DATASET_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "webm"];

pub const COUGH_LABEL: i64 = 1;
pub const NOISE_LABEL: i64 = 0;

/// Recursively collect audio files under `root`, sorted by path.
pub fn scan_audio_files(
    root: &Path,
    max_samples: Option<usize>,
) -> Result<Vec<PathBuf>, PipelineError> {
    if !root.is_dir() {
        return Err(PipelineError::InvalidInput(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DATASET_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if let Some(max) = max_samples {
        files.truncate(max);
    }
    Ok(files)
}

/// MFCC matrices for one class, stacked as `(clips, frames, coefficients)`.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub features: Array3<f32>,
    pub labels: Array1<i64>,
    /// Files found but not decodable.
    pub skipped: usize,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Keep only the first `n` clips.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len() {
            return;
        }
        self.features = self.features.slice(s![..n, .., ..]).to_owned();
        self.labels = self.labels.slice(s![..n]).to_owned();
    }

    /// Write `<prefix>_features.npy` and `<prefix>_labels.npy` into `dir`.
    pub fn save(&self, dir: &Path, prefix: &str) -> Result<(), PipelineError> {
        std::fs::create_dir_all(dir)?;
        write_npy(dir.join(format!("{prefix}_features.npy")), &self.features)?;
        write_npy(dir.join(format!("{prefix}_labels.npy")), &self.labels)?;
        Ok(())
    }
}

/// Extract MFCCs for every clip under `root`, all labelled `label`.
///
/// Undecodable or too-short clips are skipped with a warning.
pub fn extract_dataset(
    root: &Path,
    label: i64,
    max_samples: Option<usize>,
) -> Result<FeatureSet, PipelineError> {
    let files = scan_audio_files(root, max_samples)?;
    if files.is_empty() {
        tracing::warn!(root = %root.display(), "No audio files found");
    }

    let extractor = MfccExtractor::new();
    let mut flat = Vec::with_capacity(files.len() * N_FRAMES * N_MFCC);
    let mut count = 0;
    let mut skipped = 0;

    for path in &files {
        match load_audio(path) {
            Ok(samples) => {
                flat.extend(extractor.extract(&samples).iter().copied());
                count += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping clip");
                skipped += 1;
            }
        }
    }

    tracing::info!(
        root = %root.display(),
        label,
        extracted = count,
        skipped,
        "Dataset extraction finished"
    );

    Ok(FeatureSet {
        features: Array3::from_shape_vec((count, N_FRAMES, N_MFCC), flat)?,
        labels: Array1::from_elem(count, label),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tone(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer
                .write_sample(((i as f32 * 0.1).sin() * 5000.0) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn scan_is_recursive_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.wav"), b"").unwrap();
        std::fs::write(dir.path().join("a.ogg"), b"").unwrap();
        std::fs::write(dir.path().join("nested/c.webm"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = scan_audio_files(dir.path(), None).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ogg", "b.wav", "nested/c.webm"]);

        assert_eq!(scan_audio_files(dir.path(), Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(scan_audio_files(Path::new("/definitely/not/here"), None).is_err());
    }

    #[test]
    fn extracts_good_clips_and_skips_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(&dir.path().join("one.wav"), 16_000);
        write_tone(&dir.path().join("two.wav"), 8_000);
        write_tone(&dir.path().join("tiny.wav"), 100);
        std::fs::write(dir.path().join("three.webm"), b"not decodable").unwrap();

        let mut set = extract_dataset(dir.path(), COUGH_LABEL, None).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.skipped, 2);
        assert_eq!(set.features.dim(), (2, N_FRAMES, N_MFCC));
        assert!(set.labels.iter().all(|&l| l == COUGH_LABEL));

        set.truncate(1);
        assert_eq!(set.features.dim(), (1, N_FRAMES, N_MFCC));

        let out = tempfile::tempdir().unwrap();
        set.save(out.path(), "cough").unwrap();
        assert!(out.path().join("cough_features.npy").exists());
        assert!(out.path().join("cough_labels.npy").exists());
    }
}
