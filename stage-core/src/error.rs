//! Error types for presentation operations.

use thiserror::Error;

use crate::hooks::{HookName, SubscriberError};

/// Result type for presentation operations.
pub type StageResult<T> = Result<T, StageError>;

/// Errors that can occur while driving a presentation.
///
/// Rejected or cancelled selections are not errors; `select` reports those
/// as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StageError {
    /// Operation name is not part of the public surface.
    #[error("Method {0} does not exist")]
    UnknownOperation(String),

    /// Internal operation invoked outside test mode.
    #[error("Method {0} is protected and should only be used internally")]
    ProtectedOperation(String),

    /// Hook name is not one of the lifecycle hooks.
    #[error("Unknown hook: {0}")]
    UnknownHook(String),

    /// Transform tier name is not recognised.
    #[error("Unknown backend: {0} (expected full3d, planar or fallback)")]
    UnknownBackend(String),

    /// Operation requires an argument that was not supplied.
    #[error("Operation {0} requires an argument")]
    MissingArgument(String),

    /// A step attribute could not be parsed as a number.
    #[error("Step {step}: attribute {name} has non-numeric value {value:?}")]
    InvalidAttribute {
        /// Step the attribute belongs to.
        step: String,
        /// Dataset key.
        name: String,
        /// Raw attribute value.
        value: String,
    },

    /// A CSS time value could not be parsed.
    #[error("Invalid CSS time: {0}")]
    InvalidTime(String),

    /// A hook subscriber failed; the triggering operation is aborted.
    #[error("{hook} subscriber failed: {source}")]
    Subscriber {
        /// Hook being dispatched.
        hook: HookName,
        /// Error raised by the subscriber.
        #[source]
        source: SubscriberError,
    },

    /// A plugin failed outside of a hook dispatch.
    #[error("Plugin {plugin} failed: {source}")]
    Plugin {
        /// Plugin name.
        plugin: &'static str,
        /// Error raised by the plugin.
        #[source]
        source: SubscriberError,
    },

    /// Settings or step serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
