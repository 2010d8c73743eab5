//! Lazily loaded, once-per-process model handles.
//!
//! The registry owns one slot per [`ModelFamily`]. A slot starts unloaded and
//! moves exactly once to either loaded or failed, on the first request that
//! needs it (or on [`ModelRegistry::preload`]). Concurrent first requests for
//! the same family block on the slot's initialization, so the loader runs at
//! most once. A failed slot stays failed for the rest of the process and never
//! affects the other family.

use crate::core::config::ServiceConfig;
use crate::core::errors::{InferenceError, InferenceResult};
use crate::core::traits::Classifier;
use crate::domain::{HealthStatus, ModelFamily};
use crate::models::{load_neural_network, load_svm};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Produces the handle for one family.
pub trait ModelLoader: Send + Sync {
    /// Loads the artifact. Called at most once per registry slot.
    fn load(&self) -> InferenceResult<Arc<dyn Classifier>>;
}

impl<F> ModelLoader for F
where
    F: Fn() -> InferenceResult<Arc<dyn Classifier>> + Send + Sync,
{
    fn load(&self) -> InferenceResult<Arc<dyn Classifier>> {
        self()
    }
}

/// Observable state of a registry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No request has needed the family yet.
    Unloaded,
    /// The handle is cached and serving.
    Loaded,
    /// Loading failed; the family is unavailable.
    Failed,
}

type LoadOutcome = Result<Arc<dyn Classifier>, String>;

struct Slot {
    family: ModelFamily,
    loader: Box<dyn ModelLoader>,
    cell: OnceCell<LoadOutcome>,
}

impl Slot {
    fn new(family: ModelFamily, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            family,
            loader,
            cell: OnceCell::new(),
        }
    }

    fn outcome(&self) -> &LoadOutcome {
        self.cell.get_or_init(|| {
            let start = Instant::now();
            match self.loader.load() {
                Ok(handle) => {
                    info!(
                        family = %self.family,
                        model = handle.name(),
                        capability = ?handle.capability(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "model loaded"
                    );
                    Ok(handle)
                }
                Err(e) => {
                    error!(
                        family = %self.family,
                        error = %e,
                        "model failed to load; family unavailable for this process"
                    );
                    Err(e.to_string())
                }
            }
        })
    }

    fn state(&self) -> SlotState {
        match self.cell.get() {
            None => SlotState::Unloaded,
            Some(Ok(_)) => SlotState::Loaded,
            Some(Err(_)) => SlotState::Failed,
        }
    }
}

/// Holds one lazily initialized handle per model family.
pub struct ModelRegistry {
    neural_network: Slot,
    svm: Slot,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("neural_network", &self.neural_network.state())
            .field("svm", &self.svm.state())
            .finish()
    }
}

impl ModelRegistry {
    /// Creates a registry from one loader per family. Nothing is loaded yet.
    pub fn new(
        neural_network: impl ModelLoader + 'static,
        svm: impl ModelLoader + 'static,
    ) -> Self {
        Self {
            neural_network: Slot::new(ModelFamily::NeuralNetwork, Box::new(neural_network)),
            svm: Slot::new(ModelFamily::Svm, Box::new(svm)),
        }
    }

    /// Creates a registry that loads the ONNX artifacts named by `config`.
    pub fn from_config(config: Arc<ServiceConfig>) -> Self {
        let nn_config = Arc::clone(&config);
        Self::new(
            move || load_neural_network(&nn_config),
            move || load_svm(&config),
        )
    }

    fn slot(&self, family: ModelFamily) -> &Slot {
        match family {
            ModelFamily::NeuralNetwork => &self.neural_network,
            ModelFamily::Svm => &self.svm,
        }
    }

    /// Returns the handle for `family`, loading it on first use.
    ///
    /// A family whose load failed yields [`InferenceError::ModelUnavailable`]
    /// with the recorded reason; the load is not retried.
    pub fn get(&self, family: ModelFamily) -> InferenceResult<Arc<dyn Classifier>> {
        match self.slot(family).outcome() {
            Ok(handle) => Ok(Arc::clone(handle)),
            Err(reason) => Err(InferenceError::model_unavailable(family, reason.clone())),
        }
    }

    /// Current state of the slot, without triggering a load.
    pub fn state(&self, family: ModelFamily) -> SlotState {
        self.slot(family).state()
    }

    /// Whether `family` is loaded and serving.
    pub fn is_loaded(&self, family: ModelFamily) -> bool {
        self.state(family) == SlotState::Loaded
    }

    /// Liveness snapshot. Does not trigger loading.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::from_fn(|family| self.is_loaded(family))
    }

    /// Attempts to load every family once. Failures are recorded, not returned.
    pub fn preload(&self) {
        for family in ModelFamily::ALL {
            let _ = self.slot(family).outcome();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FailureKind;
    use crate::core::traits::Capability;
    use crate::domain::{FeatureVector, ModelOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct StubClassifier;

    impl Classifier for StubClassifier {
        fn name(&self) -> &str {
            "stub"
        }

        fn capability(&self) -> Capability {
            Capability::LabelOnly
        }

        fn predict(&self, _features: &FeatureVector) -> InferenceResult<ModelOutput> {
            Ok(ModelOutput::Label(0))
        }
    }

    fn counting_loader(
        counter: Arc<AtomicUsize>,
        succeed: bool,
    ) -> impl Fn() -> InferenceResult<Arc<dyn Classifier>> + Send + Sync {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if succeed {
                Ok(Arc::new(StubClassifier) as Arc<dyn Classifier>)
            } else {
                Err(InferenceError::model_load::<std::io::Error>(
                    std::path::Path::new("models/missing.onnx"),
                    "model file not found",
                    None,
                    None,
                ))
            }
        }
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let nn_loads = Arc::new(AtomicUsize::new(0));
        let svm_loads = Arc::new(AtomicUsize::new(0));
        let registry = ModelRegistry::new(
            counting_loader(Arc::clone(&nn_loads), true),
            counting_loader(Arc::clone(&svm_loads), true),
        );

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let handle = registry.get(ModelFamily::NeuralNetwork).unwrap();
                    assert_eq!(handle.name(), "stub");
                });
            }
        });

        assert_eq!(nn_loads.load(Ordering::SeqCst), 1);
        assert_eq!(svm_loads.load(Ordering::SeqCst), 0);
        assert_eq!(registry.state(ModelFamily::NeuralNetwork), SlotState::Loaded);
        assert_eq!(registry.state(ModelFamily::Svm), SlotState::Unloaded);
    }

    #[test]
    fn test_failure_is_isolated_and_not_retried() {
        let nn_loads = Arc::new(AtomicUsize::new(0));
        let svm_loads = Arc::new(AtomicUsize::new(0));
        let registry = ModelRegistry::new(
            counting_loader(Arc::clone(&nn_loads), false),
            counting_loader(Arc::clone(&svm_loads), true),
        );

        for _ in 0..3 {
            let err = registry.get(ModelFamily::NeuralNetwork).unwrap_err();
            assert_eq!(err.kind(), FailureKind::ModelUnavailable);
            assert!(err.to_string().contains("model file not found"));
        }
        assert_eq!(nn_loads.load(Ordering::SeqCst), 1);

        assert!(registry.get(ModelFamily::Svm).is_ok());
        assert_eq!(registry.state(ModelFamily::NeuralNetwork), SlotState::Failed);
        assert!(registry.is_loaded(ModelFamily::Svm));
    }

    #[test]
    fn test_health_reflects_slots_without_loading() {
        let nn_loads = Arc::new(AtomicUsize::new(0));
        let svm_loads = Arc::new(AtomicUsize::new(0));
        let registry = ModelRegistry::new(
            counting_loader(Arc::clone(&nn_loads), true),
            counting_loader(Arc::clone(&svm_loads), false),
        );

        let health = registry.health();
        assert!(!health.neural_network_loaded);
        assert!(!health.svm_loaded);
        assert_eq!(nn_loads.load(Ordering::SeqCst), 0);

        registry.preload();
        registry.preload();
        let health = registry.health();
        assert!(health.neural_network_loaded);
        assert!(!health.svm_loaded);
        assert_eq!(nn_loads.load(Ordering::SeqCst), 1);
        assert_eq!(svm_loads.load(Ordering::SeqCst), 1);
    }
}
