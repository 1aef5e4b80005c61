/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for every fallible signal operation
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors with serialization support
///
/// Soft failures (queue full, illegal phase transition) are not errors;
/// they surface as `false` from the operation that attempted them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SignalError {
    #[error("Invalid name: {0}")]
    #[diagnostic(
        code(signals::invalid_name),
        help("Instance and signal names must be non-empty.")
    )]
    InvalidName(String),

    #[error("Signal definition {instance}/{signal} is already registered")]
    #[diagnostic(
        code(signals::duplicate_definition),
        help("Each (instance, signal) pair may only be registered once at start-up.")
    )]
    DuplicateDefinition { instance: String, signal: String },

    #[error("Signal definition {instance}/{signal} not found")]
    #[diagnostic(
        code(signals::definition_not_found),
        help("Register the definition before triggering or querying it.")
    )]
    DefinitionNotFound { instance: String, signal: String },

    #[error("Signal {0} not found")]
    #[diagnostic(
        code(signals::signal_not_found),
        help("The signal may have been finalized or was never enqueued.")
    )]
    SignalNotFound(String),

    #[error("Signal {0} is already live")]
    #[diagnostic(
        code(signals::duplicate_uuid),
        help("A UUID can address at most one live signal in the process.")
    )]
    DuplicateUuid(String),

    #[error("Invalid reaction timeout: {0} ms")]
    #[diagnostic(
        code(signals::invalid_timeout),
        help("Reaction timeouts must lie between 1 ms and 3600000 ms.")
    )]
    InvalidTimeout(u32),

    #[error("Invalid queue capacity: {0}")]
    #[diagnostic(
        code(signals::invalid_queue_capacity),
        help("Queue capacity must lie between 1 and 1024.")
    )]
    InvalidQueueCapacity(u32),

    #[error("Invalid UUID: {0}")]
    #[diagnostic(code(signals::invalid_uuid))]
    InvalidUuid(String),

    #[error("Unknown parameter: {0}")]
    #[diagnostic(
        code(signals::unknown_parameter),
        help("Only parameters declared in the signal definition can be accessed.")
    )]
    UnknownParameter(String),

    #[error("Parameter {name} has type {declared}, not {requested}")]
    #[diagnostic(code(signals::parameter_type_mismatch))]
    ParameterTypeMismatch {
        name: String,
        declared: String,
        requested: String,
    },

    #[error("Invalid payload: {0}")]
    #[diagnostic(
        code(signals::invalid_payload),
        help("Parameter and result payloads must be JSON objects.")
    )]
    InvalidPayload(String),

    #[error("Signal {0} has not been triggered")]
    #[diagnostic(code(signals::not_triggered))]
    NotTriggered(String),

    #[error("Signal {0} has already been triggered")]
    #[diagnostic(
        code(signals::already_triggered),
        help("Timeouts and parameters are frozen once a signal is in the queue.")
    )]
    AlreadyTriggered(String),

    #[error("Signal {0} could not be triggered")]
    #[diagnostic(
        code(signals::trigger_rejected),
        help("The signal queue is full. Use try_trigger to poll for capacity.")
    )]
    TriggerRejected(String),
}

impl SignalError {
    pub(crate) fn definition_not_found(instance: &str, signal: &str) -> Self {
        SignalError::DefinitionNotFound {
            instance: instance.to_string(),
            signal: signal.to_string(),
        }
    }

    /// True for errors that name a missing signal or definition
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SignalError::SignalNotFound(_) | SignalError::DefinitionNotFound { .. }
        )
    }
}
