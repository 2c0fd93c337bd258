//! Command line interface for the dataset preparation jobs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wayfarer_pipeline::metrics::DEFAULT_THRESHOLD;
use wayfarer_pipeline::motion::{DEFAULT_STEP, DEFAULT_WINDOW};
use wayfarer_pipeline::sorting::{DEFAULT_TARGET_COUNT, MIN_COUGH_CONFIDENCE};
use wayfarer_pipeline::split::DEFAULT_SEED;

/// Batch jobs that turn raw sensor and audio datasets into model inputs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract MFCC features from cough and noise clips
    CoughFeatures(CoughFeaturesCommand),

    /// Extract windowed motion features from a SisFall tree
    FallFeatures(FallFeaturesCommand),

    /// Merge per-subject IMU exports into training CSVs
    ImuMerge(ImuMergeCommand),

    /// Balance two classes and write train/val/test splits
    Split(SplitCommand),

    /// Copy confidently labelled coughs out of a crowd-sourced dump
    SortCoughs(SortCoughsCommand),

    /// Sample background noise clips
    SortNoise(SortNoiseCommand),

    /// Derive int8 quantisation parameters from representative features
    Calibrate(CalibrateCommand),

    /// Export a model file as a C array header
    ExportHeader(ExportHeaderCommand),

    /// Score predictions against ground-truth labels
    Evaluate(EvaluateCommand),
}

#[derive(Parser, Debug)]
pub struct CoughFeaturesCommand {
    /// Directory of cough clips
    #[arg(long)]
    pub cough_dir: PathBuf,

    /// Directory of noise clips
    #[arg(long)]
    pub noise_dir: PathBuf,

    /// Where the `.npy` files are written
    #[arg(short, long, default_value = "data/processed")]
    pub output_dir: PathBuf,

    /// Cap on clips read per class
    #[arg(long)]
    pub max_samples: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct FallFeaturesCommand {
    /// Root of the SisFall recordings
    #[arg(long)]
    pub dataset_dir: PathBuf,

    #[arg(short, long, default_value = "data/processed")]
    pub output_dir: PathBuf,

    /// Samples per window
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Samples between window starts
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: usize,
}

#[derive(Parser, Debug)]
pub struct ImuMergeCommand {
    /// Directory holding the `Falls` and `ADLs` folders
    #[arg(long)]
    pub dataset_dir: PathBuf,

    #[arg(short, long, default_value = "data/processed")]
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SplitCommand {
    /// Features of the positive class (`.npy`)
    #[arg(long)]
    pub positive: PathBuf,

    /// Features of the negative class (`.npy`)
    #[arg(long)]
    pub negative: PathBuf,

    #[arg(short, long, default_value = "data/splits")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct SortCoughsCommand {
    /// Directory of clips with JSON reports
    #[arg(long)]
    pub source: PathBuf,

    #[arg(long)]
    pub target: PathBuf,

    /// Minimum `cough_detected` score
    #[arg(long, default_value_t = MIN_COUGH_CONFIDENCE)]
    pub min_confidence: f64,

    #[arg(long, default_value_t = DEFAULT_TARGET_COUNT)]
    pub max_files: usize,
}

#[derive(Parser, Debug)]
pub struct SortNoiseCommand {
    /// Directory tree of `.wav` clips
    #[arg(long)]
    pub source: PathBuf,

    #[arg(long)]
    pub target: PathBuf,

    #[arg(long, default_value_t = DEFAULT_TARGET_COUNT)]
    pub count: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct CalibrateCommand {
    /// Representative features (`.npy`), first axis is the sample axis
    #[arg(long)]
    pub features: PathBuf,

    /// JSON file receiving the parameters
    #[arg(short, long, default_value = "quant_params.json")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExportHeaderCommand {
    /// Binary model file
    #[arg(long)]
    pub model: PathBuf,

    /// Header to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Array name, defaults to the model's file stem
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    /// Ground-truth labels (`.npy`, int64)
    #[arg(long)]
    pub labels: PathBuf,

    /// Predicted probabilities (`.npy`, float32, any shape)
    #[arg(long)]
    pub scores: PathBuf,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Optional JSON report path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
