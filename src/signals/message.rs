/*!
 * Signal Message
 * Record of one signal occurrence owned by its slot
 */

use super::types::SignalPhase;
use crate::core::id::SignalUuid;
use crate::core::types::TimeoutMs;

/// One in-flight or completed signal
///
/// Plain record; all synchronization lives in the owning slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMessage {
    uuid: SignalUuid,
    phase: SignalPhase,
    reaction_timeout_ms: TimeoutMs,
    parameter_json: String,
    result_json: String,
    error_message: String,
}

impl SignalMessage {
    pub fn new(uuid: SignalUuid, reaction_timeout_ms: TimeoutMs, phase: SignalPhase) -> Self {
        Self {
            uuid,
            phase,
            reaction_timeout_ms,
            parameter_json: String::new(),
            result_json: String::new(),
            error_message: String::new(),
        }
    }

    #[inline]
    pub fn uuid(&self) -> &SignalUuid {
        &self.uuid
    }

    #[inline]
    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    #[inline]
    pub fn set_phase(&mut self, phase: SignalPhase) {
        self.phase = phase;
    }

    #[inline]
    pub fn reaction_timeout_ms(&self) -> TimeoutMs {
        self.reaction_timeout_ms
    }

    pub fn parameter_json(&self) -> &str {
        &self.parameter_json
    }

    pub fn set_parameter_json(&mut self, json: impl Into<String>) {
        self.parameter_json = json.into();
    }

    pub fn result_json(&self) -> &str {
        &self.result_json
    }

    pub fn set_result_json(&mut self, json: impl Into<String>) {
        self.result_json = json.into();
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = message.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_is_empty() {
        let uuid = SignalUuid::generate();
        let msg = SignalMessage::new(uuid.clone(), 250, SignalPhase::InQueue);
        assert_eq!(msg.uuid(), &uuid);
        assert_eq!(msg.phase(), SignalPhase::InQueue);
        assert_eq!(msg.reaction_timeout_ms(), 250);
        assert!(msg.parameter_json().is_empty());
        assert!(msg.result_json().is_empty());
        assert!(msg.error_message().is_empty());
    }

    #[test]
    fn test_mutators() {
        let mut msg = SignalMessage::new(SignalUuid::generate(), 10, SignalPhase::InQueue);
        msg.set_phase(SignalPhase::Failed);
        msg.set_parameter_json(r#"{"a":1}"#);
        msg.set_result_json("{}");
        msg.set_error_message("door jammed");
        assert_eq!(msg.phase(), SignalPhase::Failed);
        assert_eq!(msg.parameter_json(), r#"{"a":1}"#);
        assert_eq!(msg.result_json(), "{}");
        assert_eq!(msg.error_message(), "door jammed");
    }
}
