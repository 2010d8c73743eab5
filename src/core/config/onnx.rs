//! ONNX Runtime configuration types.

use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Configuration for ONNX Runtime sessions.
///
/// `session_pool_size` controls how many sessions are opened over the same
/// artifact; predictions are spread across them round-robin so concurrent
/// callers do not serialize on a single session lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of sessions in the pool (at least 1).
    pub session_pool_size: usize,
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
}

impl Default for OrtSessionConfig {
    fn default() -> Self {
        Self {
            session_pool_size: 1,
            intra_threads: None,
            inter_threads: None,
            optimization_level: None,
        }
    }
}
