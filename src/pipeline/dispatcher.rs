//! Request entry point: identifier, handle, features, prediction, result.

use crate::core::config::ServiceConfig;
use crate::core::errors::InferenceResult;
use crate::core::traits::FeatureExtractor;
use crate::domain::{HealthStatus, InferenceResponse, ModelFamily, PredictionResult};
use crate::pipeline::extractors::{HistogramExtractor, TensorExtractor};
use crate::pipeline::normalizer::PredictionNormalizer;
use crate::pipeline::registry::ModelRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Routes an image to the requested model family.
///
/// Each request runs the same fixed sequence and stops at the first failing
/// step, so a failure's [`kind`](crate::core::errors::InferenceError::kind) says which step it was:
///
/// 1. parse the identifier (`UnknownModel`)
/// 2. fetch the family handle from the registry (`ModelUnavailable`)
/// 3. extract features (`ImageDecode`, `FeatureExtraction`)
/// 4. predict (`InferenceExecution`)
/// 5. normalize (`InferenceExecution`)
#[derive(Debug)]
pub struct InferenceDispatcher {
    registry: Arc<ModelRegistry>,
    tensor_extractor: TensorExtractor,
    histogram_extractor: HistogramExtractor,
    normalizer: PredictionNormalizer,
}

impl InferenceDispatcher {
    /// Creates a dispatcher over an existing registry.
    pub fn new(registry: Arc<ModelRegistry>, config: &ServiceConfig) -> InferenceResult<Self> {
        Ok(Self {
            registry,
            tensor_extractor: TensorExtractor::new(
                &config.neural_network,
                config.max_image_bytes,
            )?,
            histogram_extractor: HistogramExtractor::new(&config.svm.hog, config.max_image_bytes),
            normalizer: PredictionNormalizer::new(config.score_policy),
        })
    }

    /// Validates `config` and creates a dispatcher whose registry loads the
    /// configured ONNX artifacts on demand.
    pub fn from_config(config: ServiceConfig) -> InferenceResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = Arc::new(ModelRegistry::from_config(Arc::clone(&config)));
        Self::new(registry, &config)
    }

    /// The registry backing this dispatcher.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    fn extractor(&self, family: ModelFamily) -> &dyn FeatureExtractor {
        match family {
            ModelFamily::NeuralNetwork => &self.tensor_extractor,
            ModelFamily::Svm => &self.histogram_extractor,
        }
    }

    /// Runs one prediction.
    pub fn dispatch(
        &self,
        image_bytes: &[u8],
        model_id: &str,
    ) -> InferenceResult<PredictionResult> {
        let start = Instant::now();
        let family = ModelFamily::parse(model_id)?;

        let handle = self.registry.get(family).inspect_err(|e| {
            warn!(model_id, error = %e, "rejecting request for unavailable model");
        })?;

        let features = self.extractor(family).extract(image_bytes)?;
        debug!(
            model_id,
            kind = features.kind_name(),
            shape = ?features.shape(),
            "features extracted"
        );

        let output = handle.predict(&features)?;
        let result = self.normalizer.normalize(handle.name(), output)?;

        info!(
            model_id,
            prediction = %result.prediction(),
            confidence = ?result.confidence(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "prediction complete"
        );
        Ok(result)
    }

    /// Runs one prediction and packs the outcome into a response document.
    pub fn respond(&self, image_bytes: &[u8], model_id: &str) -> InferenceResponse {
        match self.dispatch(image_bytes, model_id) {
            Ok(result) => InferenceResponse::success(model_id, result),
            Err(e) => {
                debug!(model_id, kind = %e.kind(), error = %e, "request rejected");
                InferenceResponse::failure(model_id, &e)
            }
        }
    }

    /// Liveness snapshot of both families.
    pub fn health(&self) -> HealthStatus {
        self.registry.health()
    }

    /// Eagerly loads every family; failures are recorded in the registry.
    pub fn preload(&self) {
        self.registry.preload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{FailureKind, InferenceError};
    use crate::core::traits::{Capability, Classifier};
    use crate::domain::{ClassLabel, FeatureVector, ModelOutput, NUM_CLASSES};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FixedScores(Vec<f32>);

    impl Classifier for FixedScores {
        fn name(&self) -> &str {
            "fixed-scores"
        }

        fn capability(&self) -> Capability {
            Capability::Scores
        }

        fn predict(&self, features: &FeatureVector) -> InferenceResult<ModelOutput> {
            assert_eq!(features.shape(), &[1, 224, 224, 3]);
            Ok(ModelOutput::Scores(self.0.clone()))
        }
    }

    #[derive(Debug)]
    struct FixedLabel(i64);

    impl Classifier for FixedLabel {
        fn name(&self) -> &str {
            "fixed-label"
        }

        fn capability(&self) -> Capability {
            Capability::LabelOnly
        }

        fn predict(&self, features: &FeatureVector) -> InferenceResult<ModelOutput> {
            assert_eq!(features.shape(), &[1, 512]);
            Ok(ModelOutput::Label(self.0))
        }
    }

    #[derive(Debug)]
    struct Exploding;

    impl Classifier for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn capability(&self) -> Capability {
            Capability::Scores
        }

        fn predict(&self, _features: &FeatureVector) -> InferenceResult<ModelOutput> {
            Err(InferenceError::inference_mismatch(self.name(), "input shape rejected"))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn serving(
        classifier: impl Classifier + 'static,
    ) -> impl Fn() -> InferenceResult<Arc<dyn Classifier>> + Send + Sync {
        let handle: Arc<dyn Classifier> = Arc::new(classifier);
        move || Ok(Arc::clone(&handle))
    }

    fn unavailable() -> InferenceResult<Arc<dyn Classifier>> {
        Err(InferenceError::model_load::<std::io::Error>(
            std::path::Path::new("models/densenet121_model.onnx"),
            "model file not found",
            None,
            None,
        ))
    }

    fn dispatcher(registry: ModelRegistry) -> InferenceDispatcher {
        InferenceDispatcher::new(Arc::new(registry), &ServiceConfig::default()).unwrap()
    }

    #[test]
    fn test_neural_network_prediction() {
        let dispatcher = dispatcher(ModelRegistry::new(
            serving(FixedScores(vec![0.7, 0.2, 0.1])),
            unavailable,
        ));

        let result = dispatcher.dispatch(&png(224, 224), "neural-network").unwrap();
        assert_eq!(result.prediction(), ClassLabel::Benign);
        assert!((result.confidence().unwrap() - 70.0).abs() < 1e-3);
        assert_eq!(result.probabilities().len(), NUM_CLASSES);

        let alias = dispatcher.dispatch(&png(40, 60), "DenseNet121").unwrap();
        assert_eq!(alias.prediction(), ClassLabel::Benign);
    }

    #[test]
    fn test_unknown_model_checked_before_image() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let dispatcher = dispatcher(ModelRegistry::new(
            move || -> InferenceResult<Arc<dyn Classifier>> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(FixedScores(vec![1.0, 0.0, 0.0])))
            },
            unavailable,
        ));

        let err = dispatcher.dispatch(b"not an image", "random-model").unwrap_err();
        assert_eq!(err.kind(), FailureKind::UnknownModel);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unavailable_family_is_isolated() {
        let dispatcher = dispatcher(ModelRegistry::new(unavailable, serving(FixedLabel(1))));
        let image = png(128, 128);

        for _ in 0..2 {
            let err = dispatcher.dispatch(&image, "neural-network").unwrap_err();
            assert_eq!(err.kind(), FailureKind::ModelUnavailable);
        }

        let result = dispatcher.dispatch(&image, "svm").unwrap();
        assert_eq!(result.prediction(), ClassLabel::Malignant);
        assert_eq!(result.confidence(), Some(100.0));

        let health = dispatcher.health();
        assert!(!health.neural_network_loaded);
        assert!(health.svm_loaded);
    }

    #[test]
    fn test_unavailable_reported_before_decoding() {
        let dispatcher = dispatcher(ModelRegistry::new(unavailable, unavailable));
        let err = dispatcher.dispatch(b"garbage", "SVM").unwrap_err();
        assert_eq!(err.kind(), FailureKind::ModelUnavailable);
    }

    #[test]
    fn test_corrupted_image_is_decode_error() {
        let dispatcher = dispatcher(ModelRegistry::new(
            serving(FixedScores(vec![0.3, 0.3, 0.4])),
            serving(FixedLabel(0)),
        ));
        let mut bytes = png(64, 64);
        bytes.truncate(bytes.len() / 3);

        for model_id in ["neural-network", "svm"] {
            let err = dispatcher.dispatch(&bytes, model_id).unwrap_err();
            assert_eq!(err.kind(), FailureKind::ImageDecode);
        }
        let err = dispatcher.dispatch(&[], "svm").unwrap_err();
        assert_eq!(err.kind(), FailureKind::ImageDecode);
    }

    #[test]
    fn test_runtime_failure_is_execution_error() {
        let dispatcher = dispatcher(ModelRegistry::new(serving(Exploding), unavailable));
        let err = dispatcher.dispatch(&png(32, 32), "neural-network").unwrap_err();
        assert_eq!(err.kind(), FailureKind::InferenceExecution);
    }

    #[test]
    fn test_respond_echoes_identifier() {
        let dispatcher = dispatcher(ModelRegistry::new(
            serving(FixedScores(vec![0.1, 0.8, 0.1])),
            unavailable,
        ));

        let ok = dispatcher.respond(&png(50, 50), "DenseNet121");
        assert!(ok.success);
        assert_eq!(ok.model_name, "DenseNet121");

        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["prediction"], "Malignant");
        assert_eq!(json["modelName"], "DenseNet121");

        let failed = dispatcher.respond(&png(50, 50), "svm");
        assert!(!failed.success);
        assert_eq!(failed.error_kind(), Some(FailureKind::ModelUnavailable));
    }
}
