/*!
 * Signals Module
 * Instance-scoped request/response signals with bounded queues and UUID routing
 */

pub mod atomic_stats;
pub mod config;
pub mod definition;
pub mod handler;
pub mod message;
pub mod parameters;
pub mod router;
pub mod slot;
pub mod traits;
pub mod trigger;
pub mod types;

// Re-export public API
pub use atomic_stats::AtomicSignalStats;
pub use config::WaitConfig;
pub use definition::{ParameterDescriptor, ParameterType, SignalDefinition};
pub use handler::SignalHandler;
pub use message::SignalMessage;
pub use parameters::ParameterGroup;
pub use router::{SignalOwner, SignalRouter};
pub use slot::SignalSlot;
pub use traits::DescriptorSink;
pub use trigger::SignalTrigger;
pub use types::{SignalPhase, SignalStats, SlotSnapshot};
