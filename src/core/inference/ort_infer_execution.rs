use super::*;
use ndarray::ArrayViewD;
use ort::value::TensorRef;
use std::sync::atomic::Ordering;

/// An output tensor copied out of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTensor {
    /// `f32` tensor.
    F32 {
        /// Tensor shape.
        shape: Vec<i64>,
        /// Row-major values.
        data: Vec<f32>,
    },
    /// `i64` tensor.
    I64 {
        /// Tensor shape.
        shape: Vec<i64>,
        /// Row-major values.
        data: Vec<i64>,
    },
}

/// Element type requested for an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Extract as `f32`.
    F32,
    /// Extract as `i64`.
    I64,
}

impl OrtInfer {
    /// Runs the model on `x` and copies out the requested outputs.
    ///
    /// Every requested name must be one of [`OrtInfer::output_names`].
    pub fn run(
        &self,
        x: ArrayViewD<'_, f32>,
        requested: &[(&str, OutputType)],
    ) -> InferenceResult<Vec<OutputTensor>> {
        let input_shape = x.shape().to_vec();

        if let Some((missing, _)) = requested.iter().find(|(name, _)| !self.has_output(name)) {
            return Err(InferenceError::inference_mismatch(
                &self.model_name,
                format!(
                    "requested output '{}' not in model outputs {:?}",
                    missing, self.output_names
                ),
            ));
        }

        let input_tensor = TensorRef::from_array_view(x).map_err(|e| {
            InferenceError::inference_execution(
                &self.model_name,
                format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            InferenceError::inference_mismatch(
                &self.model_name,
                format!(
                    "session {}/{} is poisoned by an earlier panic",
                    idx,
                    self.sessions.len()
                ),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            InferenceError::inference_execution(
                &self.model_name,
                format!(
                    "ONNX Runtime forward pass failed for input '{}' with shape {:?}",
                    self.input_name, input_shape
                ),
                e,
            )
        })?;

        let mut tensors = Vec::with_capacity(requested.len());
        for &(name, ty) in requested {
            let value = &outputs[name];
            let tensor = match ty {
                OutputType::F32 => {
                    let (shape, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                        InferenceError::inference_execution(
                            &self.model_name,
                            format!("failed to extract output '{name}' as f32"),
                            e,
                        )
                    })?;
                    OutputTensor::F32 {
                        shape: shape.iter().copied().collect(),
                        data: data.to_vec(),
                    }
                }
                OutputType::I64 => {
                    let (shape, data) = value.try_extract_tensor::<i64>().map_err(|e| {
                        InferenceError::inference_execution(
                            &self.model_name,
                            format!("failed to extract output '{name}' as i64"),
                            e,
                        )
                    })?;
                    OutputTensor::I64 {
                        shape: shape.iter().copied().collect(),
                        data: data.to_vec(),
                    }
                }
            };
            tensors.push(tensor);
        }

        Ok(tensors)
    }

    /// Runs the model and returns the first row of an `f32` output of shape
    /// `[1, C]` or `[C]`.
    pub fn infer_row(&self, x: ArrayViewD<'_, f32>, output: &str) -> InferenceResult<Vec<f32>> {
        let mut tensors = self.run(x, &[(output, OutputType::F32)])?;
        match tensors.pop() {
            Some(OutputTensor::F32 { shape, data }) => {
                first_row(&self.model_name, output, &shape, data)
            }
            _ => Err(InferenceError::inference_mismatch(
                &self.model_name,
                format!("output '{output}' missing from run results"),
            )),
        }
    }
}

/// Validates a `[1, C]` or `[C]` output shape and returns its values.
pub fn first_row<T>(
    model_name: &str,
    output: &str,
    shape: &[i64],
    data: Vec<T>,
) -> InferenceResult<Vec<T>> {
    let batch = match shape {
        [_] => 1,
        [batch, _] => *batch,
        _ => {
            return Err(InferenceError::inference_mismatch(
                model_name,
                format!("output '{output}' expected rank 1 or 2, got shape {shape:?}"),
            ));
        }
    };
    if batch != 1 {
        return Err(InferenceError::inference_mismatch(
            model_name,
            format!("output '{output}' expected batch size 1, got shape {shape:?}"),
        ));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FailureKind;

    #[test]
    fn test_first_row_accepts_single_row() {
        let row = first_row("m", "probs", &[1, 3], vec![0.2, 0.3, 0.5]).unwrap();
        assert_eq!(row, vec![0.2, 0.3, 0.5]);
        let row = first_row("m", "probs", &[3], vec![0.2, 0.3, 0.5]).unwrap();
        assert_eq!(row, vec![0.2, 0.3, 0.5]);
    }

    #[test]
    fn test_first_row_rejects_batches_and_rank() {
        let err = first_row("m", "probs", &[2, 3], vec![0.0f32; 6]).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InferenceExecution);
        assert!(err.to_string().contains("batch size 1"));

        let err = first_row("m", "probs", &[1, 1, 3], vec![0.0f32; 3]).unwrap_err();
        assert!(err.to_string().contains("rank 1 or 2"));
    }
}
