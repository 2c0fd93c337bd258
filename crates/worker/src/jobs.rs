//! One function per subcommand: load inputs, call into the pipeline, log a
//! summary.

use std::path::Path;

use anyhow::{bail, Context};
use ndarray::{Array1, ArrayD};
use ndarray_npy::read_npy;
use rand::rngs::StdRng;
use rand::SeedableRng;

use wayfarer_pipeline::dataset::{extract_dataset, COUGH_LABEL, NOISE_LABEL};
use wayfarer_pipeline::imu::{merge_category, ImuCategory};
use wayfarer_pipeline::metrics::{evaluate, EvaluationReport};
use wayfarer_pipeline::motion::extract_sisfall;
use wayfarer_pipeline::quantize::{c_header, calibrate, max_round_trip_error, QuantParams};
use wayfarer_pipeline::sorting::{sort_coughs, sort_noise};
use wayfarer_pipeline::split::balance_and_split;

use crate::cli::{
    CalibrateCommand, CoughFeaturesCommand, EvaluateCommand, ExportHeaderCommand,
    FallFeaturesCommand, ImuMergeCommand, SortCoughsCommand, SortNoiseCommand, SplitCommand,
};

fn read_features(path: &Path) -> anyhow::Result<ArrayD<f32>> {
    read_npy(path).with_context(|| format!("reading {}", path.display()))
}

pub fn cough_features(cmd: &CoughFeaturesCommand) -> anyhow::Result<()> {
    let coughs = extract_dataset(&cmd.cough_dir, COUGH_LABEL, cmd.max_samples)?;
    let noise = extract_dataset(&cmd.noise_dir, NOISE_LABEL, cmd.max_samples)?;
    if coughs.is_empty() && noise.is_empty() {
        bail!("no decodable clips under either input directory");
    }

    coughs.save(&cmd.output_dir, "cough")?;
    noise.save(&cmd.output_dir, "noise")?;

    tracing::info!(
        coughs = coughs.len(),
        noise = noise.len(),
        skipped = coughs.skipped + noise.skipped,
        shape = ?coughs.features.shape(),
        output = %cmd.output_dir.display(),
        "Cough features written"
    );
    Ok(())
}

pub fn fall_features(cmd: &FallFeaturesCommand) -> anyhow::Result<()> {
    let dataset = extract_sisfall(&cmd.dataset_dir, cmd.window, cmd.step)?;
    dataset.save(&cmd.output_dir)?;

    tracing::info!(
        falls = dataset.falls.nrows(),
        adls = dataset.adls.nrows(),
        files_read = dataset.files_read,
        files_skipped = dataset.files_skipped,
        output = %cmd.output_dir.display(),
        "Fall features written"
    );
    Ok(())
}

pub fn imu_merge(cmd: &ImuMergeCommand) -> anyhow::Result<()> {
    for category in [ImuCategory::Falls, ImuCategory::Adls] {
        let summary = merge_category(&cmd.dataset_dir, category, &cmd.output_dir)?;
        match &summary.output {
            Some(path) => tracing::info!(
                category = category.folder(),
                files = summary.files_merged,
                rows = summary.rows,
                path = %path.display(),
                "Category merged"
            ),
            None => tracing::warn!(
                category = category.folder(),
                files_found = summary.files_found,
                "Nothing merged for category"
            ),
        }
    }
    Ok(())
}

pub fn split(cmd: &SplitCommand) -> anyhow::Result<()> {
    let positive = read_features(&cmd.positive)?;
    let negative = read_features(&cmd.negative)?;
    let splits = balance_and_split(&positive, &negative, cmd.seed)?;
    splits.save(&cmd.output_dir)?;

    tracing::info!(
        train = splits.train.len(),
        val = splits.val.len(),
        test = splits.test.len(),
        train_positives = splits.train.positives(),
        output = %cmd.output_dir.display(),
        "Splits written"
    );
    Ok(())
}

pub fn sort_cough_clips(cmd: &SortCoughsCommand) -> anyhow::Result<()> {
    let summary = sort_coughs(&cmd.source, &cmd.target, cmd.min_confidence, cmd.max_files)?;
    tracing::info!(scanned = summary.scanned, copied = summary.copied, "Coughs sorted");
    Ok(())
}

pub fn sort_noise_clips(cmd: &SortNoiseCommand) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(cmd.seed);
    let summary = sort_noise(&cmd.source, &cmd.target, cmd.count, &mut rng)?;
    tracing::info!(scanned = summary.scanned, copied = summary.copied, "Noise sorted");
    Ok(())
}

pub fn calibrate_features(cmd: &CalibrateCommand) -> anyhow::Result<QuantParams> {
    let features = read_features(&cmd.features)?;
    let params = calibrate(&features)?;
    let error = max_round_trip_error(&params, &features);

    write_json(&cmd.output, &params)?;
    tracing::info!(
        scale = params.scale,
        zero_point = params.zero_point,
        max_round_trip_error = error,
        output = %cmd.output.display(),
        "Quantisation parameters written"
    );
    Ok(params)
}

pub fn export_header(cmd: &ExportHeaderCommand) -> anyhow::Result<()> {
    let bytes = std::fs::read(&cmd.model)
        .with_context(|| format!("reading {}", cmd.model.display()))?;
    let name = match &cmd.name {
        Some(name) => name.clone(),
        None => cmd
            .model
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model_data".to_string()),
    };

    std::fs::write(&cmd.output, c_header(&bytes, &name))
        .with_context(|| format!("writing {}", cmd.output.display()))?;
    tracing::info!(bytes = bytes.len(), name = %name, output = %cmd.output.display(), "Header written");
    Ok(())
}

pub fn evaluate_scores(cmd: &EvaluateCommand) -> anyhow::Result<EvaluationReport> {
    let labels: Array1<i64> = read_npy(&cmd.labels)
        .with_context(|| format!("reading {}", cmd.labels.display()))?;
    // Model output is usually (n, 1); any shape with n elements is accepted.
    let scores = read_features(&cmd.scores)?;
    let scores: Vec<f32> = scores.iter().copied().collect();

    let report = evaluate(&labels.to_vec(), &scores, cmd.threshold)?;
    if let Some(output) = &cmd.output {
        write_json(output, &report)?;
    }

    tracing::info!(
        samples = report.samples,
        accuracy = report.accuracy,
        precision = report.precision,
        recall = report.recall,
        f1 = report.f1,
        roc_auc = ?report.roc_auc,
        "Evaluation finished"
    );
    Ok(report)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
