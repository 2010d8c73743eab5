//! Maps each family's native output onto one [`PredictionResult`].

use crate::core::config::ScorePolicy;
use crate::core::errors::{InferenceError, InferenceResult};
use crate::domain::{ClassLabel, ModelOutput, NUM_CLASSES, PredictionResult};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const SUM_TOLERANCE: f32 = 1e-3;

/// Turns raw model outputs into percentages keyed by label.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionNormalizer {
    score_policy: ScorePolicy,
}

impl PredictionNormalizer {
    /// Creates a normalizer with the given score policy.
    pub fn new(score_policy: ScorePolicy) -> Self {
        Self { score_policy }
    }

    /// Normalizes one output of the model named `model_name`.
    ///
    /// Dense scores and probability vectors yield a mapping over every label.
    /// A bare label yields a degenerate mapping with only that label at 100%.
    pub fn normalize(
        &self,
        model_name: &str,
        output: ModelOutput,
    ) -> InferenceResult<PredictionResult> {
        match output {
            ModelOutput::Scores(scores) => self.from_distribution(model_name, scores),
            ModelOutput::LabelWithProbabilities {
                label,
                probabilities,
            } => {
                let result = self.from_distribution(model_name, probabilities)?;
                if usize::try_from(label).ok() != Some(result.prediction().index()) {
                    debug!(
                        model = model_name,
                        label,
                        argmax = %result.prediction(),
                        "label output disagrees with most probable class"
                    );
                }
                Ok(result)
            }
            ModelOutput::Label(label) => {
                let prediction = label_from_raw(model_name, label)?;
                Ok(PredictionResult::new(
                    prediction,
                    BTreeMap::from([(prediction, 100.0)]),
                ))
            }
        }
    }

    fn from_distribution(
        &self,
        model_name: &str,
        scores: Vec<f32>,
    ) -> InferenceResult<PredictionResult> {
        if scores.len() != NUM_CLASSES {
            return Err(InferenceError::inference_mismatch(
                model_name,
                format!("expected {} class scores, got {}", NUM_CLASSES, scores.len()),
            ));
        }

        let scores = match self.score_policy {
            ScorePolicy::Trust => scores,
            ScorePolicy::Verify if is_distribution(&scores) => scores,
            ScorePolicy::Verify => {
                warn!(
                    model = model_name,
                    ?scores,
                    "scores are not a probability distribution, applying softmax"
                );
                softmax(&scores)
            }
        };

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::inference_mismatch(
                model_name,
                format!("non-finite class scores {scores:?}"),
            ));
        }

        let best = argmax(&scores)
            .ok_or_else(|| InferenceError::inference_mismatch(model_name, "empty score vector"))?;
        let prediction = ClassLabel::from_index(best).ok_or_else(|| {
            InferenceError::inference_mismatch(
                model_name,
                format!("class index {best} out of range"),
            )
        })?;

        let probabilities = ClassLabel::ALL
            .into_iter()
            .zip(scores)
            .map(|(label, score)| (label, score * 100.0))
            .collect();
        Ok(PredictionResult::new(prediction, probabilities))
    }
}

fn label_from_raw(model_name: &str, label: i64) -> InferenceResult<ClassLabel> {
    usize::try_from(label)
        .ok()
        .and_then(ClassLabel::from_index)
        .ok_or_else(|| {
            InferenceError::inference_mismatch(
                model_name,
                format!("predicted label {label} is outside 0..{NUM_CLASSES}"),
            )
        })
}

fn is_distribution(scores: &[f32]) -> bool {
    let in_range = scores
        .iter()
        .all(|s| s.is_finite() && (0.0..=1.0).contains(s));
    in_range && (scores.iter().sum::<f32>() - 1.0).abs() <= SUM_TOLERANCE
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FailureKind;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_scores_become_percentages() {
        let normalizer = PredictionNormalizer::default();
        let result = normalizer
            .normalize("densenet", ModelOutput::Scores(vec![0.7, 0.2, 0.1]))
            .unwrap();

        assert_eq!(result.prediction(), ClassLabel::Benign);
        assert_close(result.confidence().unwrap(), 70.0);
        let probabilities = result.probabilities();
        assert_eq!(probabilities.len(), NUM_CLASSES);
        assert_close(probabilities[&ClassLabel::Benign], 70.0);
        assert_close(probabilities[&ClassLabel::Malignant], 20.0);
        assert_close(probabilities[&ClassLabel::Normal], 10.0);
    }

    #[test]
    fn test_probabilities_use_argmax_not_label() {
        let normalizer = PredictionNormalizer::default();
        let result = normalizer
            .normalize(
                "svm",
                ModelOutput::LabelWithProbabilities {
                    label: 0,
                    probabilities: vec![0.1, 0.15, 0.75],
                },
            )
            .unwrap();

        assert_eq!(result.prediction(), ClassLabel::Normal);
        assert_close(result.confidence().unwrap(), 75.0);
    }

    #[test]
    fn test_ties_resolve_to_first_label() {
        let normalizer = PredictionNormalizer::default();
        let result = normalizer
            .normalize("svm", ModelOutput::Scores(vec![0.4, 0.4, 0.2]))
            .unwrap();
        assert_eq!(result.prediction(), ClassLabel::Benign);
    }

    #[test]
    fn test_label_only_is_degenerate() {
        let normalizer = PredictionNormalizer::default();
        let result = normalizer.normalize("svm", ModelOutput::Label(2)).unwrap();

        assert_eq!(result.prediction(), ClassLabel::Normal);
        assert_eq!(result.confidence(), Some(100.0));
        assert_eq!(
            result.probabilities(),
            &BTreeMap::from([(ClassLabel::Normal, 100.0)])
        );
    }

    #[test]
    fn test_label_out_of_range_is_execution_error() {
        let normalizer = PredictionNormalizer::default();
        for label in [-1, 3, 42] {
            let err = normalizer
                .normalize("svm", ModelOutput::Label(label))
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::InferenceExecution);
        }
    }

    #[test]
    fn test_wrong_score_count_is_execution_error() {
        let normalizer = PredictionNormalizer::default();
        let err = normalizer
            .normalize("densenet", ModelOutput::Scores(vec![0.5, 0.5]))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InferenceExecution);
    }

    #[test]
    fn test_verify_applies_softmax_to_logits() {
        let normalizer = PredictionNormalizer::new(ScorePolicy::Verify);
        let result = normalizer
            .normalize("densenet", ModelOutput::Scores(vec![2.0, 0.5, -1.0]))
            .unwrap();

        assert_eq!(result.prediction(), ClassLabel::Benign);
        let total: f32 = result.probabilities().values().sum();
        assert_close(total, 100.0);
        assert!(result.confidence().unwrap() <= 100.0);
    }

    #[test]
    fn test_trust_keeps_raw_scores() {
        let normalizer = PredictionNormalizer::new(ScorePolicy::Trust);
        let result = normalizer
            .normalize("densenet", ModelOutput::Scores(vec![2.0, 0.5, -1.0]))
            .unwrap();

        assert_close(result.confidence().unwrap(), 200.0);
    }

    #[test]
    fn test_non_finite_scores_rejected() {
        let normalizer = PredictionNormalizer::new(ScorePolicy::Trust);
        let err = normalizer
            .normalize("densenet", ModelOutput::Scores(vec![f32::NAN, 0.5, 0.5]))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InferenceExecution);
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
    }
}
