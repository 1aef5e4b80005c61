/*!
 * State Signals Library
 * Coordination core for machine-control state machines: typed, JSON-carrying
 * request/response signals with bounded queues, UUID routing and phase tracking
 */

pub mod core;
pub mod monitoring;
pub mod signals;

// Re-exports
pub use crate::core::{normalize_uuid, SignalError, SignalResult, SignalUuid};
pub use monitoring::init_tracing;
pub use signals::{
    ParameterDescriptor, ParameterGroup, ParameterType, SignalDefinition, SignalHandler,
    SignalPhase, SignalRouter, SignalTrigger, WaitConfig,
};
