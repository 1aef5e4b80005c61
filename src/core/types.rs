/*!
 * Core Types
 * Common types and limits shared by slots, the router and the client handles
 */

use super::errors::{SignalError, SignalResult};

/// Name of the state machine instance that owns a signal family
pub type InstanceName = String;

/// Name of a signal within an instance
pub type SignalName = String;

/// Reaction timeout in milliseconds
pub type TimeoutMs = u32;

// Queue limits
pub const MIN_QUEUE_SIZE: u32 = 1;
pub const MAX_QUEUE_SIZE: u32 = 1024;

// Reaction timeout limits
pub const MIN_REACTION_TIMEOUT_MS: TimeoutMs = 1;
pub const MAX_REACTION_TIMEOUT_MS: TimeoutMs = 3_600_000;

/// Sleep between phase polls in the producer wait loop
pub const DEFAULT_WAIT_POLL_INTERVAL_MS: u64 = 1;

/// Reject reaction timeouts outside [`MIN_REACTION_TIMEOUT_MS`, `MAX_REACTION_TIMEOUT_MS`]
#[inline]
pub fn validate_reaction_timeout(timeout_ms: TimeoutMs) -> SignalResult<TimeoutMs> {
    if (MIN_REACTION_TIMEOUT_MS..=MAX_REACTION_TIMEOUT_MS).contains(&timeout_ms) {
        Ok(timeout_ms)
    } else {
        Err(SignalError::InvalidTimeout(timeout_ms))
    }
}

/// Reject queue capacities outside [`MIN_QUEUE_SIZE`, `MAX_QUEUE_SIZE`]
#[inline]
pub fn validate_queue_capacity(capacity: u32) -> SignalResult<u32> {
    if (MIN_QUEUE_SIZE..=MAX_QUEUE_SIZE).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(SignalError::InvalidQueueCapacity(capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_bounds() {
        assert!(validate_reaction_timeout(0).is_err());
        assert_eq!(validate_reaction_timeout(1).unwrap(), 1);
        assert_eq!(validate_reaction_timeout(3_600_000).unwrap(), 3_600_000);
        assert_eq!(
            validate_reaction_timeout(3_600_001),
            Err(SignalError::InvalidTimeout(3_600_001))
        );
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(validate_queue_capacity(0).is_err());
        assert_eq!(validate_queue_capacity(1024).unwrap(), 1024);
        assert_eq!(
            validate_queue_capacity(1025),
            Err(SignalError::InvalidQueueCapacity(1025))
        );
    }
}
