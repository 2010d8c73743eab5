//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::config::{OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::{InferenceError, InferenceResult};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Loads a session applying the given runtime options.
pub fn load_session_with(
    model_path: impl AsRef<Path>,
    config: &OrtSessionConfig,
) -> InferenceResult<Session> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(InferenceError::model_load::<ort::Error>(
            path,
            "model file not found",
            Some("check models_dir and the configured model_file"),
            None,
        ));
    }

    let builder = Session::builder()
        .and_then(|builder| apply_ort_config(builder, config))
        .map_err(|e| {
            InferenceError::model_load(
                path,
                "failed to configure ONNX session",
                Some("check the ONNX Runtime session options"),
                Some(e),
            )
        })?;

    builder.commit_from_file(path).map_err(|e| {
        InferenceError::model_load(
            path,
            SESSION_CREATION_FAILURE,
            Some("verify the file is a valid ONNX model"),
            Some(e),
        )
    })
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    builder = builder.with_log_level(LogLevel::Error)?;
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(level) = cfg.optimization_level {
        let mapped = match level {
            OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
            OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    Ok(builder)
}
