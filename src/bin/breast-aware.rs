//! Command-line front end.
//!
//! Usage:
//! ```text
//! breast-aware [--config <file>] [--models-dir <dir>] predict --model <id> <image>
//! breast-aware [--config <file>] [--models-dir <dir>] health [--preload]
//! ```
//!
//! `predict` prints the response document as JSON and exits with 1 when the
//! request was rejected. `health` prints which families are loaded.

use breast_aware::core::init_tracing;
use breast_aware::prelude::*;
use breast_aware::utils::load_image_bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Command-line arguments
#[derive(Parser)]
#[command(name = "breast-aware")]
#[command(about = "Classifies breast ultrasound images with a neural network or an SVM")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the model artifacts (overrides the configuration)
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one image
    Predict {
        /// Model identifier: neural-network, DenseNet121, svm or SVM
        #[arg(short, long)]
        model: String,

        /// Image file to classify
        image: PathBuf,
    },
    /// Report which model families are loaded
    Health {
        /// Load every family before reporting
        #[arg(long)]
        preload: bool,
    },
}

fn load_config(args: &Args) -> InferenceResult<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = &args.models_dir {
        config.models_dir = dir.clone();
    }
    Ok(config)
}

fn print_json(value: &impl Serialize) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            false
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let dispatcher = match load_config(&args).and_then(InferenceDispatcher::from_config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &args.command {
        Command::Predict { model, image } => {
            let response = match load_image_bytes(image) {
                Ok(bytes) => dispatcher.respond(&bytes, model),
                Err(e) => {
                    error!("Failed to read {}: {}", image.display(), e);
                    InferenceResponse::failure(model.as_str(), &e)
                }
            };
            if print_json(&response) && response.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Health { preload } => {
            if *preload {
                dispatcher.preload();
            }
            if print_json(&dispatcher.health()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
