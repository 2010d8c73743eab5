//! Core ONNX Runtime inference engine with a round-robin session pool.

use crate::core::config::OrtSessionConfig;
use crate::core::errors::{InferenceError, InferenceResult};
use crate::core::inference::session::load_session_with;
use ort::{session::Session, value::ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;

#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;

pub use ort_infer_execution::{OutputTensor, OutputType, first_row};

/// A loaded model artifact ready for prediction.
///
/// Sessions need exclusive access while running, so each sits behind its own
/// mutex and calls are spread across the pool.
pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: AtomicUsize,
    pub(super) input_name: String,
    pub(super) output_names: Vec<String>,
    pub(super) model_path: PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Opens `session_pool_size` sessions over the artifact at `model_path`.
    ///
    /// The input tensor name is taken from `input_name` or, when `None`, from
    /// the first input the model declares.
    pub fn from_config(
        config: &OrtSessionConfig,
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> InferenceResult<Self> {
        let path = model_path.as_ref();
        let pool_size = config.session_pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            sessions.push(load_session_with(path, config)?);
        }

        let first = &sessions[0];
        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => first
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| {
                    InferenceError::model_load::<ort::Error>(
                        path,
                        "model declares no inputs",
                        Some("re-export the model with a named input"),
                        None,
                    )
                })?,
        };
        if !first.inputs.iter().any(|input| input.name == input_name) {
            return Err(InferenceError::model_load::<ort::Error>(
                path,
                format!("model has no input named '{input_name}'"),
                None,
                None,
            ));
        }

        let output_names: Vec<String> = first.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(InferenceError::model_load::<ort::Error>(
                path,
                "model declares no outputs",
                None,
                None,
            ));
        }

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            sessions: sessions.into_iter().map(Mutex::new).collect(),
            next_idx: AtomicUsize::new(0),
            input_name,
            output_names,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Name of the tensor fed on every run.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Output tensor names in declaration order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Whether the model declares an output with this name.
    pub fn has_output(&self, name: &str) -> bool {
        self.output_names.iter().any(|n| n == name)
    }

    /// Attempts to retrieve the primary input tensor shape from the first session.
    ///
    /// Dynamic dimensions (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.sessions.first()?.lock().ok()?;
        let input = session_guard
            .inputs
            .iter()
            .find(|input| input.name == self.input_name)?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }
}
