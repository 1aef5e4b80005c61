/*!
 * Core Module
 * Fundamental signal types, identifiers and error handling
 */

pub mod errors;
pub mod id;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::{normalize_uuid, SignalUuid};
pub use types::*;
