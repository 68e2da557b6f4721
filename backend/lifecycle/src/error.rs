use std::sync::Arc;

use thiserror::Error;

use crate::phase::Phase;

/// Fatal controller failures.
///
/// Recoverable conditions — a plugin declining activation, a handler
/// failing during a sweep — are ordinary values and never appear here.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The phase computed by the state machine did not match the caller's
    /// expectation. Carries the full diagnostic report and the first
    /// recorded cause.
    #[error(
        "fatal transition: expected {expected}, reached {computed}; first failure in '{plugin_id}': {cause}"
    )]
    Transition {
        expected: Phase,
        computed: Phase,
        /// Plugin owning the first recorded failure.
        plugin_id: String,
        cause: Arc<anyhow::Error>,
        /// Rendered per-plugin state report at the time of failure.
        report: String,
    },

    /// An ad hoc event could not be constructed from its kind descriptor.
    #[error("failed to construct event from descriptor '{descriptor}'")]
    EventConstruction {
        descriptor: String,
        #[source]
        source: anyhow::Error,
    },
}
