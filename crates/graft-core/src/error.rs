//! Error types for the reconciliation runtime.

use crate::instance::InstanceId;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reconciling or rendering an instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle is an empty slot; nothing was ever mounted into it.
    #[error("Instance handle is not mounted")]
    Detached,

    /// The instance is already borrowed by an outer reconcile or render call.
    #[error("Instance {0} is already in use; reconcile and render calls must not re-enter it")]
    Busy(InstanceId),

    /// The instance holds a different implementation type than requested.
    #[error("Instance {instance} of `{component}` is not a `{expected}`")]
    Mismatch {
        instance: InstanceId,
        component: &'static str,
        expected: &'static str,
    },

    /// No reconcile function is registered for the spec type.
    #[error("No reconciler registered for `{0}`")]
    Unregistered(String),
}
