/*!
 * Monitoring Module
 * Structured logging for the signal core
 */

pub mod tracer;

pub use tracer::{init_tracing, span_signal};
