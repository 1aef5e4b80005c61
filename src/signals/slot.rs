/*!
 * Signal Slot
 * FIFO queue and phase bookkeeping for one (instance, signal) pair
 *
 * Every public operation takes the slot lock for its full duration and
 * never calls back into the router while holding it.
 */

use super::definition::SignalDefinition;
use super::message::SignalMessage;
use super::traits::DescriptorSink;
use super::types::{SignalPhase, SlotSnapshot};
use crate::core::errors::{SignalError, SignalResult};
use crate::core::id::SignalUuid;
use crate::core::types::TimeoutMs;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

type UuidMap<V> = HashMap<SignalUuid, V, RandomState>;
type UuidSet = HashSet<SignalUuid, RandomState>;

/// Lock-protected slot internals
///
/// The queue is keyed by a monotonically increasing ticket so iteration
/// order is enqueue order; `queue_index` maps a UUID to its ticket for
/// removal by UUID.
#[derive(Default)]
struct SlotState {
    messages: UuidMap<SignalMessage>,
    queue: BTreeMap<u64, SignalUuid>,
    queue_index: UuidMap<u64>,
    next_ticket: u64,
    in_process: UuidSet,
    handled: UuidSet,
    failed: UuidSet,
    timed_out: UuidSet,
    cleared: UuidSet,
}

impl SlotState {
    fn message_mut(&mut self, uuid: &SignalUuid) -> SignalResult<&mut SignalMessage> {
        self.messages
            .get_mut(uuid)
            .ok_or_else(|| SignalError::SignalNotFound(uuid.to_string()))
    }

    fn message(&self, uuid: &SignalUuid) -> SignalResult<&SignalMessage> {
        self.messages
            .get(uuid)
            .ok_or_else(|| SignalError::SignalNotFound(uuid.to_string()))
    }

    /// Remove a message from the queue; true if it was queued
    fn dequeue(&mut self, uuid: &SignalUuid) -> bool {
        match self.queue_index.remove(uuid) {
            Some(ticket) => self.queue.remove(&ticket).is_some(),
            None => false,
        }
    }

    fn forget_phase(&mut self, uuid: &SignalUuid) {
        self.in_process.remove(uuid);
        self.handled.remove(uuid);
        self.failed.remove(uuid);
        self.timed_out.remove(uuid);
        self.cleared.remove(uuid);
    }

    /// Move a queued or in-process message to a terminal phase
    fn resolve(
        &mut self,
        uuid: &SignalUuid,
        phase: SignalPhase,
        result_json: &str,
        error_message: Option<&str>,
    ) -> SignalResult<bool> {
        let current = self.message(uuid)?.phase();
        match current {
            SignalPhase::InQueue => {
                self.dequeue(uuid);
            }
            SignalPhase::InProcess => {
                self.in_process.remove(uuid);
            }
            _ => return Ok(false),
        }

        let message = self.message_mut(uuid)?;
        message.set_result_json(result_json);
        if let Some(error) = error_message {
            message.set_error_message(error);
        }
        message.set_phase(phase);

        match phase {
            SignalPhase::Failed => self.failed.insert(uuid.clone()),
            _ => self.handled.insert(uuid.clone()),
        };
        Ok(true)
    }
}

/// Queue and message store for one signal type
pub struct SignalSlot {
    definition: SignalDefinition,
    state: Mutex<SlotState>,
}

impl SignalSlot {
    pub fn new(definition: SignalDefinition) -> Self {
        Self {
            definition,
            state: Mutex::new(SlotState::default()),
        }
    }

    pub fn instance(&self) -> &str {
        &self.definition.instance
    }

    pub fn signal(&self) -> &str {
        &self.definition.signal
    }

    pub fn definition(&self) -> &SignalDefinition {
        &self.definition
    }

    /// Append a new `InQueue` message at the tail
    ///
    /// Returns false when the queue is at capacity or the UUID is already
    /// tracked by this slot.
    pub fn enqueue(
        &self,
        uuid: &SignalUuid,
        parameter_json: &str,
        reaction_timeout_ms: TimeoutMs,
    ) -> bool {
        let mut state = self.state.lock();

        if state.queue.len() >= self.definition.queue_capacity as usize {
            debug!(
                instance = %self.definition.instance,
                signal = %self.definition.signal,
                uuid = %uuid,
                "Signal queue full"
            );
            return false;
        }
        if state.messages.contains_key(uuid) {
            debug!(uuid = %uuid, "Signal already tracked by slot");
            return false;
        }

        let mut message = SignalMessage::new(uuid.clone(), reaction_timeout_ms, SignalPhase::InQueue);
        message.set_parameter_json(parameter_json);

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.insert(ticket, uuid.clone());
        state.queue_index.insert(uuid.clone(), ticket);
        state.messages.insert(uuid.clone(), message);

        trace!(uuid = %uuid, ticket, "Signal enqueued");
        true
    }

    /// `InQueue` -> `InProcess`; false for any other current phase
    pub fn advance_to_in_process(&self, uuid: &SignalUuid) -> SignalResult<bool> {
        let mut state = self.state.lock();
        if state.message(uuid)?.phase() != SignalPhase::InQueue {
            return Ok(false);
        }

        state.dequeue(uuid);
        state.message_mut(uuid)?.set_phase(SignalPhase::InProcess);
        state.in_process.insert(uuid.clone());
        Ok(true)
    }

    /// `InQueue | InProcess` -> `Handled`; false for any other current phase
    pub fn advance_to_handled(&self, uuid: &SignalUuid, result_json: &str) -> SignalResult<bool> {
        self.state
            .lock()
            .resolve(uuid, SignalPhase::Handled, result_json, None)
    }

    /// `InQueue | InProcess` -> `Failed`; false for any other current phase
    pub fn advance_to_failed(
        &self,
        uuid: &SignalUuid,
        result_json: &str,
        error_message: &str,
    ) -> SignalResult<bool> {
        self.state
            .lock()
            .resolve(uuid, SignalPhase::Failed, result_json, Some(error_message))
    }

    /// Forget a message completely, whatever its phase
    pub fn erase(&self, uuid: &SignalUuid) -> bool {
        let mut state = self.state.lock();
        state.dequeue(uuid);
        state.forget_phase(uuid);
        state.messages.remove(uuid).is_some()
    }

    /// Purge every queued message
    ///
    /// Purged messages move to `Cleared` and stay tracked until erased, so
    /// their phase remains observable. Returns the purged UUIDs in queue order.
    pub fn clear(&self) -> Vec<SignalUuid> {
        let mut state = self.state.lock();
        let drained: Vec<SignalUuid> = std::mem::take(&mut state.queue).into_values().collect();

        for uuid in &drained {
            state.queue_index.remove(uuid);
            if let Some(message) = state.messages.get_mut(uuid) {
                message.set_phase(SignalPhase::Cleared);
            }
            state.cleared.insert(uuid.clone());
        }

        if !drained.is_empty() {
            debug!(
                instance = %self.definition.instance,
                signal = %self.definition.signal,
                count = drained.len(),
                "Cleared signal queue"
            );
        }
        drained
    }

    /// UUID at the head of the queue
    pub fn peek_front(&self) -> Option<SignalUuid> {
        self.state
            .lock()
            .queue
            .first_key_value()
            .map(|(_, uuid)| uuid.clone())
    }

    /// Run `f` on a message under the slot lock
    pub fn with_message<R>(
        &self,
        uuid: &SignalUuid,
        f: impl FnOnce(&SignalMessage) -> R,
    ) -> SignalResult<R> {
        let state = self.state.lock();
        state.message(uuid).map(f)
    }

    pub fn contains(&self, uuid: &SignalUuid) -> bool {
        self.state.lock().messages.contains_key(uuid)
    }

    pub fn phase_of(&self, uuid: &SignalUuid) -> SignalResult<SignalPhase> {
        self.with_message(uuid, SignalMessage::phase)
    }

    pub fn result_json_of(&self, uuid: &SignalUuid) -> SignalResult<String> {
        self.with_message(uuid, |m| m.result_json().to_string())
    }

    pub fn parameter_json_of(&self, uuid: &SignalUuid) -> SignalResult<String> {
        self.with_message(uuid, |m| m.parameter_json().to_string())
    }

    pub fn error_message_of(&self, uuid: &SignalUuid) -> SignalResult<String> {
        self.with_message(uuid, |m| m.error_message().to_string())
    }

    pub fn reaction_timeout_of(&self, uuid: &SignalUuid) -> SignalResult<TimeoutMs> {
        self.with_message(uuid, SignalMessage::reaction_timeout_ms)
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().queue.len() >= self.definition.queue_capacity as usize
    }

    pub fn available_capacity(&self) -> u32 {
        let queued = self.state.lock().queue.len() as u32;
        self.definition.queue_capacity.saturating_sub(queued)
    }

    pub fn total_capacity(&self) -> u32 {
        self.definition.queue_capacity
    }

    pub fn default_reaction_timeout(&self) -> TimeoutMs {
        self.definition.default_reaction_timeout_ms
    }

    pub fn populate_parameter_descriptors<S: DescriptorSink + ?Sized>(&self, sink: &mut S) {
        for descriptor in &self.definition.parameters {
            sink.add_typed_parameter(&descriptor.name, descriptor.parameter_type);
        }
    }

    pub fn populate_result_descriptors<S: DescriptorSink + ?Sized>(&self, sink: &mut S) {
        for descriptor in &self.definition.results {
            sink.add_typed_parameter(&descriptor.name, descriptor.parameter_type);
        }
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let state = self.state.lock();
        SlotSnapshot {
            instance: self.definition.instance.clone(),
            signal: self.definition.signal.clone(),
            capacity: self.definition.queue_capacity,
            queued: state.queue.len(),
            in_process: state.in_process.len(),
            handled: state.handled.len(),
            failed: state.failed.len(),
            timed_out: state.timed_out.len(),
            cleared: state.cleared.len(),
            tracked: state.messages.len(),
        }
    }
}

impl std::fmt::Debug for SignalSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSlot")
            .field("instance", &self.definition.instance)
            .field("signal", &self.definition.signal)
            .field("capacity", &self.definition.queue_capacity)
            .finish()
    }
}
