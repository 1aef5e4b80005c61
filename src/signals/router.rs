/*!
 * Signal Router
 * Process-wide registry of signal slots with a crosscutting UUID index
 *
 * # Lock ordering
 * Router-level locks (definition map, UUID index) may be held while a slot
 * lock is taken, never the reverse, and no operation holds two slot locks.
 */

use super::atomic_stats::AtomicSignalStats;
use super::definition::{ParameterDescriptor, SignalDefinition};
use super::slot::SignalSlot;
use super::traits::DescriptorSink;
use super::types::{SignalPhase, SignalStats, SlotSnapshot};
use crate::core::errors::{SignalError, SignalResult};
use crate::core::id::SignalUuid;
use crate::core::types::{validate_reaction_timeout, InstanceName, SignalName, TimeoutMs};
use ahash::RandomState;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

type SlotMap = HashMap<SignalName, Arc<SignalSlot>, RandomState>;
type DefinitionMap = HashMap<InstanceName, SlotMap, RandomState>;
type UuidIndex = HashMap<SignalUuid, Arc<SignalSlot>, RandomState>;

/// Owner of a live signal as resolved from its UUID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalOwner {
    pub instance: String,
    pub signal: String,
    pub parameter_json: String,
}

/// Signal router
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct SignalRouter {
    definitions: Arc<RwLock<DefinitionMap>>,
    uuid_index: Arc<Mutex<UuidIndex>>,
    stats: Arc<AtomicSignalStats>,
}

impl SignalRouter {
    pub fn new() -> Self {
        info!("Signal router initialized");
        Self {
            definitions: Arc::new(RwLock::new(HashMap::with_hasher(RandomState::new()))),
            uuid_index: Arc::new(Mutex::new(HashMap::with_hasher(RandomState::new()))),
            stats: Arc::new(AtomicSignalStats::new()),
        }
    }

    /// Register a signal type; called once per (instance, signal) at start-up
    pub fn register_definition(
        &self,
        instance: &str,
        signal: &str,
        parameters: Vec<ParameterDescriptor>,
        results: Vec<ParameterDescriptor>,
        default_reaction_timeout_ms: TimeoutMs,
        queue_capacity: u32,
    ) -> SignalResult<()> {
        let definition = SignalDefinition::new(
            instance,
            signal,
            parameters,
            results,
            default_reaction_timeout_ms,
            queue_capacity,
        )?;
        self.register(definition)
    }

    /// Register a pre-built definition
    pub fn register(&self, definition: SignalDefinition) -> SignalResult<()> {
        let mut definitions = self.definitions.write();
        let slots = definitions
            .entry(definition.instance.clone())
            .or_insert_with(|| HashMap::with_hasher(RandomState::new()));

        if slots.contains_key(&definition.signal) {
            return Err(SignalError::DuplicateDefinition {
                instance: definition.instance,
                signal: definition.signal,
            });
        }

        info!(
            instance = %definition.instance,
            signal = %definition.signal,
            capacity = definition.queue_capacity,
            default_timeout_ms = definition.default_reaction_timeout_ms,
            "Registered signal definition"
        );
        slots.insert(
            definition.signal.clone(),
            Arc::new(SignalSlot::new(definition)),
        );
        self.stats.inc_definitions();
        Ok(())
    }

    pub fn has_definition(&self, instance: &str, signal: &str) -> bool {
        self.definitions
            .read()
            .get(instance)
            .is_some_and(|slots| slots.contains_key(signal))
    }

    pub fn definition(&self, instance: &str, signal: &str) -> SignalResult<SignalDefinition> {
        Ok(self.slot(instance, signal)?.definition().clone())
    }

    /// Resolve a slot and release the definition lock before returning
    fn slot(&self, instance: &str, signal: &str) -> SignalResult<Arc<SignalSlot>> {
        self.definitions
            .read()
            .get(instance)
            .and_then(|slots| slots.get(signal))
            .cloned()
            .ok_or_else(|| SignalError::definition_not_found(instance, signal))
    }

    /// Resolve a UUID to its canonical form and owning slot
    fn resolve(&self, uuid: &str) -> SignalResult<(SignalUuid, Arc<SignalSlot>)> {
        let uuid = SignalUuid::parse(uuid)?;
        let slot = self
            .uuid_index
            .lock()
            .get(&uuid)
            .cloned()
            .ok_or_else(|| SignalError::SignalNotFound(uuid.to_string()))?;
        Ok((uuid, slot))
    }

    /// True iff the target queue has room
    pub fn can_trigger(&self, instance: &str, signal: &str) -> SignalResult<bool> {
        Ok(!self.slot(instance, signal)?.is_full())
    }

    /// Admit a new signal into the queue of (instance, signal)
    ///
    /// Returns `Ok(false)` when the slot turns the signal away (queue full).
    /// The UUID index stays locked from the uniqueness check until the
    /// accepted UUID is recorded, so no UUID can become live twice.
    pub fn try_enqueue(
        &self,
        instance: &str,
        signal: &str,
        uuid: &str,
        parameter_json: &str,
        reaction_timeout_ms: TimeoutMs,
    ) -> SignalResult<bool> {
        let uuid = SignalUuid::parse(uuid)?;
        validate_reaction_timeout(reaction_timeout_ms)?;
        let slot = self.slot(instance, signal)?;

        let mut index = self.uuid_index.lock();
        if index.contains_key(&uuid) {
            warn!(uuid = %uuid, instance, signal, "Rejected duplicate signal UUID");
            return Err(SignalError::DuplicateUuid(uuid.to_string()));
        }

        if !slot.enqueue(&uuid, parameter_json, reaction_timeout_ms) {
            drop(index);
            self.stats.inc_rejected();
            debug!(uuid = %uuid, instance, signal, "Signal rejected by slot");
            return Ok(false);
        }

        index.insert(uuid.clone(), slot);
        self.stats.inc_enqueued();
        drop(index);

        debug!(uuid = %uuid, instance, signal, reaction_timeout_ms, "Signal enqueued");
        Ok(true)
    }

    pub fn advance_to_in_process(&self, uuid: &str) -> SignalResult<bool> {
        let (uuid, slot) = self.resolve(uuid)?;
        let moved = slot.advance_to_in_process(&uuid)?;
        if !moved {
            debug!(uuid = %uuid, "Ignored InProcess transition");
        }
        Ok(moved)
    }

    pub fn advance_to_handled(&self, uuid: &str, result_json: &str) -> SignalResult<bool> {
        let (uuid, slot) = self.resolve(uuid)?;
        let moved = slot.advance_to_handled(&uuid, result_json)?;
        if moved {
            self.stats.inc_handled();
            debug!(uuid = %uuid, "Signal handled");
        } else {
            debug!(uuid = %uuid, "Ignored Handled transition");
        }
        Ok(moved)
    }

    pub fn advance_to_failed(
        &self,
        uuid: &str,
        result_json: &str,
        error_message: &str,
    ) -> SignalResult<bool> {
        let (uuid, slot) = self.resolve(uuid)?;
        let moved = slot.advance_to_failed(&uuid, result_json, error_message)?;
        if moved {
            self.stats.inc_failed();
            debug!(uuid = %uuid, error = error_message, "Signal failed");
        } else {
            debug!(uuid = %uuid, "Ignored Failed transition");
        }
        Ok(moved)
    }

    pub fn phase_of(&self, uuid: &str) -> SignalResult<SignalPhase> {
        let (uuid, slot) = self.resolve(uuid)?;
        slot.phase_of(&uuid)
    }

    pub fn result_json_of(&self, uuid: &str) -> SignalResult<String> {
        let (uuid, slot) = self.resolve(uuid)?;
        slot.result_json_of(&uuid)
    }

    pub fn parameter_json_of(&self, uuid: &str) -> SignalResult<String> {
        let (uuid, slot) = self.resolve(uuid)?;
        slot.parameter_json_of(&uuid)
    }

    pub fn error_message_of(&self, uuid: &str) -> SignalResult<String> {
        let (uuid, slot) = self.resolve(uuid)?;
        slot.error_message_of(&uuid)
    }

    pub fn reaction_timeout_of(&self, uuid: &str) -> SignalResult<TimeoutMs> {
        let (uuid, slot) = self.resolve(uuid)?;
        slot.reaction_timeout_of(&uuid)
    }

    /// Instance, signal name and parameters of a live signal
    pub fn find_owner(&self, uuid: &str) -> Option<SignalOwner> {
        let (uuid, slot) = self.resolve(uuid).ok()?;
        let parameter_json = slot.parameter_json_of(&uuid).ok()?;
        Some(SignalOwner {
            instance: slot.instance().to_string(),
            signal: slot.signal().to_string(),
            parameter_json,
        })
    }

    /// Forget a signal everywhere; false if the UUID was not live
    ///
    /// The UUID index stays locked until the slot has erased the message,
    /// so an indexed UUID always resolves to a tracked message.
    pub fn finalize(&self, uuid: &str) -> bool {
        let Ok(uuid) = SignalUuid::parse(uuid) else {
            return false;
        };

        let mut index = self.uuid_index.lock();
        let Some(slot) = index.remove(&uuid) else {
            return false;
        };
        let erased = slot.erase(&uuid);
        self.stats.inc_finalized();
        drop(index);

        debug!(uuid = %uuid, erased, "Signal finalized");
        true
    }

    /// Purge the queues of every signal type of `instance`
    ///
    /// Purged signals stay addressable in phase `Cleared` until finalized.
    pub fn clear_signals_for(&self, instance: &str) -> usize {
        let slots: Vec<Arc<SignalSlot>> = self
            .definitions
            .read()
            .get(instance)
            .map(|slots| slots.values().cloned().collect())
            .unwrap_or_default();

        let count: usize = slots.iter().map(|slot| slot.clear().len()).sum();
        self.record_cleared(instance, None, count);
        count
    }

    /// Purge the queue of one signal type
    pub fn clear_signals_for_type(&self, instance: &str, signal: &str) -> usize {
        let count = match self.slot(instance, signal) {
            Ok(slot) => slot.clear().len(),
            Err(_) => 0,
        };
        self.record_cleared(instance, Some(signal), count);
        count
    }

    fn record_cleared(&self, instance: &str, signal: Option<&str>, count: usize) {
        if count == 0 {
            return;
        }
        self.stats.add_cleared(count);
        info!(instance, signal, count, "Cleared unhandled signals");
    }

    /// UUID at the head of the queue of (instance, signal)
    pub fn peek_signal(&self, instance: &str, signal: &str) -> SignalResult<Option<String>> {
        Ok(self
            .slot(instance, signal)?
            .peek_front()
            .map(String::from))
    }

    pub fn available_queue_slots(&self, instance: &str, signal: &str) -> SignalResult<u32> {
        Ok(self.slot(instance, signal)?.available_capacity())
    }

    pub fn total_queue_slots(&self, instance: &str, signal: &str) -> SignalResult<u32> {
        Ok(self.slot(instance, signal)?.total_capacity())
    }

    pub fn default_reaction_timeout(&self, instance: &str, signal: &str) -> SignalResult<TimeoutMs> {
        Ok(self.slot(instance, signal)?.default_reaction_timeout())
    }

    pub fn populate_parameter_group<S: DescriptorSink + ?Sized>(
        &self,
        instance: &str,
        signal: &str,
        sink: &mut S,
    ) -> SignalResult<()> {
        self.slot(instance, signal)?
            .populate_parameter_descriptors(sink);
        Ok(())
    }

    pub fn populate_result_group<S: DescriptorSink + ?Sized>(
        &self,
        instance: &str,
        signal: &str,
        sink: &mut S,
    ) -> SignalResult<()> {
        self.slot(instance, signal)?.populate_result_descriptors(sink);
        Ok(())
    }

    pub fn slot_snapshot(&self, instance: &str, signal: &str) -> SignalResult<SlotSnapshot> {
        Ok(self.slot(instance, signal)?.snapshot())
    }

    /// Snapshots of every registered slot, ordered by (instance, signal)
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        let slots: Vec<Arc<SignalSlot>> = self
            .definitions
            .read()
            .values()
            .flat_map(|slots| slots.values().cloned())
            .collect();

        let mut snapshots: Vec<SlotSnapshot> = slots.iter().map(|slot| slot.snapshot()).collect();
        snapshots.sort_by(|a, b| (&a.instance, &a.signal).cmp(&(&b.instance, &b.signal)));
        snapshots
    }

    /// Number of UUIDs currently addressable through the router
    pub fn live_signal_count(&self) -> usize {
        self.uuid_index.lock().len()
    }

    pub fn stats(&self) -> SignalStats {
        self.stats.snapshot()
    }
}

impl Default for SignalRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRouter")
            .field("live_signals", &self.live_signal_count())
            .finish()
    }
}
