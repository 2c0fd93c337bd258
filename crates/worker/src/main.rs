//! Batch jobs that prepare datasets and model artefacts for the on-device
//! cough and fall detectors.

mod cli;
mod jobs;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_worker=info,wayfarer_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Job failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::CoughFeatures(cmd) => jobs::cough_features(&cmd),
        Commands::FallFeatures(cmd) => jobs::fall_features(&cmd),
        Commands::ImuMerge(cmd) => jobs::imu_merge(&cmd),
        Commands::Split(cmd) => jobs::split(&cmd),
        Commands::SortCoughs(cmd) => jobs::sort_cough_clips(&cmd),
        Commands::SortNoise(cmd) => jobs::sort_noise_clips(&cmd),
        Commands::Calibrate(cmd) => jobs::calibrate_features(&cmd).map(|_| ()),
        Commands::ExportHeader(cmd) => jobs::export_header(&cmd),
        Commands::Evaluate(cmd) => jobs::evaluate_scores(&cmd).map(|_| ()),
    }
}
