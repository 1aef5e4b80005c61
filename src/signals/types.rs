/*!
 * Signal Types
 * Lifecycle phases and statistics records
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of one signal message
///
/// Numeric values are stable and ordered by lifecycle position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum SignalPhase {
    #[default]
    Invalid = 0,
    /// Producer-local phase before the signal is enqueued
    InPreparation = 10,
    InQueue = 20,
    InProcess = 30,
    Handled = 40,
    Failed = 50,
    /// Part of the vocabulary; no transition assigns it
    TimedOut = 60,
    /// Purged from the queue by an administrative clear
    Cleared = 70,
    /// Part of the vocabulary; no transition assigns it
    Retracted = 80,
}

impl SignalPhase {
    /// Convert from the numeric phase value
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(SignalPhase::Invalid),
            10 => Some(SignalPhase::InPreparation),
            20 => Some(SignalPhase::InQueue),
            30 => Some(SignalPhase::InProcess),
            40 => Some(SignalPhase::Handled),
            50 => Some(SignalPhase::Failed),
            60 => Some(SignalPhase::TimedOut),
            70 => Some(SignalPhase::Cleared),
            80 => Some(SignalPhase::Retracted),
            _ => None,
        }
    }

    /// Numeric phase value
    #[inline]
    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Phases that end a producer's wait loop
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SignalPhase::Handled
                | SignalPhase::Failed
                | SignalPhase::Cleared
                | SignalPhase::Retracted
                | SignalPhase::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalPhase::Invalid => "invalid",
            SignalPhase::InPreparation => "inpreparation",
            SignalPhase::InQueue => "inqueue",
            SignalPhase::InProcess => "inprocess",
            SignalPhase::Handled => "handled",
            SignalPhase::Failed => "failed",
            SignalPhase::TimedOut => "timedout",
            SignalPhase::Cleared => "cleared",
            SignalPhase::Retracted => "retracted",
        }
    }
}

impl fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.value())
    }
}

/// Router-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStats {
    pub definitions_registered: u64,
    pub total_enqueued: u64,
    pub total_rejected: u64,
    pub total_handled: u64,
    pub total_failed: u64,
    pub total_cleared: u64,
    pub total_finalized: u64,
    pub live_signals: usize,
}

/// Point-in-time view of one slot's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub instance: String,
    pub signal: String,
    pub capacity: u32,
    pub queued: usize,
    pub in_process: usize,
    pub handled: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub cleared: usize,
    pub tracked: usize,
}
