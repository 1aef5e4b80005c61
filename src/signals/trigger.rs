/*!
 * Signal Trigger
 * Producer handle: prepare parameters, enqueue, then poll until a terminal phase
 */

use super::config::WaitConfig;
use super::parameters::ParameterGroup;
use super::router::SignalRouter;
use super::types::SignalPhase;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::id::SignalUuid;
use crate::core::types::{validate_reaction_timeout, TimeoutMs};
use crate::monitoring::span_signal;
use std::time::{Duration, Instant};
use tracing::debug;

/// One producer-side signal exchange
///
/// Starts in the local `InPreparation` phase. Once the router accepts the
/// signal the trigger is armed: parameters and timeout are frozen and the
/// phase is read from the router.
pub struct SignalTrigger {
    router: SignalRouter,
    instance: String,
    signal: String,
    uuid: SignalUuid,
    armed: bool,
    reaction_timeout_ms: TimeoutMs,
    parameters: ParameterGroup,
    results: ParameterGroup,
    config: WaitConfig,
}

impl SignalTrigger {
    /// Prepare a trigger for a registered (instance, signal)
    pub fn new(router: &SignalRouter, instance: &str, signal: &str) -> SignalResult<Self> {
        let reaction_timeout_ms = router.default_reaction_timeout(instance, signal)?;

        let mut parameters = ParameterGroup::new();
        let mut results = ParameterGroup::new();
        router.populate_parameter_group(instance, signal, &mut parameters)?;
        router.populate_result_group(instance, signal, &mut results)?;

        Ok(Self {
            router: router.clone(),
            instance: instance.to_string(),
            signal: signal.to_string(),
            uuid: SignalUuid::generate(),
            armed: false,
            reaction_timeout_ms,
            parameters,
            results,
            config: WaitConfig::default(),
        })
    }

    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn uuid(&self) -> &str {
        self.uuid.as_str()
    }

    pub fn signal_name(&self) -> &str {
        &self.signal
    }

    pub fn instance_name(&self) -> &str {
        &self.instance
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// False once armed, otherwise whether the queue has room
    pub fn can_trigger(&self) -> SignalResult<bool> {
        if self.armed {
            return Ok(false);
        }
        self.router.can_trigger(&self.instance, &self.signal)
    }

    pub fn available_queue_slots(&self) -> SignalResult<u32> {
        self.router
            .available_queue_slots(&self.instance, &self.signal)
    }

    pub fn total_queue_slots(&self) -> SignalResult<u32> {
        self.router.total_queue_slots(&self.instance, &self.signal)
    }

    pub fn phase(&self) -> SignalResult<SignalPhase> {
        if !self.armed {
            return Ok(SignalPhase::InPreparation);
        }
        self.router.phase_of(self.uuid.as_str())
    }

    pub fn set_reaction_timeout(&mut self, timeout_ms: TimeoutMs) -> SignalResult<()> {
        validate_reaction_timeout(timeout_ms)?;
        self.ensure_preparing()?;
        self.reaction_timeout_ms = timeout_ms;
        Ok(())
    }

    pub fn reaction_timeout(&self) -> SignalResult<TimeoutMs> {
        if !self.armed {
            return Ok(self.reaction_timeout_ms);
        }
        self.router.reaction_timeout_of(self.uuid.as_str())
    }

    /// Attempt to enqueue; `Ok(false)` if the queue is full
    pub fn try_trigger(&mut self) -> SignalResult<bool> {
        self.ensure_preparing()?;

        let accepted = self.router.try_enqueue(
            &self.instance,
            &self.signal,
            self.uuid.as_str(),
            &self.parameters.to_json(),
            self.reaction_timeout_ms,
        )?;
        if accepted {
            self.armed = true;
        }
        Ok(accepted)
    }

    pub fn try_trigger_with_timeout(&mut self, timeout_ms: TimeoutMs) -> SignalResult<bool> {
        self.set_reaction_timeout(timeout_ms)?;
        self.try_trigger()
    }

    /// Enqueue or fail with `TriggerRejected`
    pub fn trigger(&mut self) -> SignalResult<()> {
        if self.try_trigger()? {
            Ok(())
        } else {
            Err(SignalError::TriggerRejected(self.uuid.to_string()))
        }
    }

    /// Poll the router until the signal reaches a terminal phase
    ///
    /// Returns `Ok(true)` on a terminal phase (results decoded), `Ok(false)`
    /// once `timeout_ms` has elapsed. A zero timeout polls exactly once.
    pub fn wait_for_handling(&mut self, timeout_ms: u32) -> SignalResult<bool> {
        self.ensure_armed()?;
        let _span = span_signal(&self.instance, &self.signal, self.uuid.as_str()).entered();
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));

        loop {
            if self.poll_terminal()? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }

    /// Single non-blocking poll
    pub fn has_been_handled(&mut self) -> SignalResult<bool> {
        self.wait_for_handling(0)
    }

    /// [`wait_for_handling`](Self::wait_for_handling) for async callers
    pub async fn wait_for_handling_async(&mut self, timeout_ms: u32) -> SignalResult<bool> {
        self.ensure_armed()?;
        let deadline = tokio::time::Instant::now() + Duration::from_millis(u64::from(timeout_ms));

        loop {
            if self.poll_terminal()? {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    fn poll_terminal(&mut self) -> SignalResult<bool> {
        let phase = self.router.phase_of(self.uuid.as_str())?;
        if !phase.is_terminal() {
            return Ok(false);
        }

        let result_json = self.router.result_json_of(self.uuid.as_str())?;
        self.results.merge_json(&result_json)?;
        debug!(uuid = %self.uuid, phase = %phase, "Signal reached terminal phase");
        Ok(true)
    }

    /// Error message recorded by a failing consumer
    pub fn error_message(&self) -> SignalResult<String> {
        self.ensure_armed()?;
        self.router.error_message_of(self.uuid.as_str())
    }

    /// Release the signal from the router
    pub fn finalize(&self) -> bool {
        self.armed && self.router.finalize(self.uuid.as_str())
    }

    fn ensure_preparing(&self) -> SignalResult<()> {
        if self.armed {
            Err(SignalError::AlreadyTriggered(self.uuid.to_string()))
        } else {
            Ok(())
        }
    }

    fn ensure_armed(&self) -> SignalResult<()> {
        if self.armed {
            Ok(())
        } else {
            Err(SignalError::NotTriggered(self.uuid.to_string()))
        }
    }

    pub fn parameters(&self) -> &ParameterGroup {
        &self.parameters
    }

    pub fn results(&self) -> &ParameterGroup {
        &self.results
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> SignalResult<()> {
        self.ensure_preparing()?;
        self.parameters.set_string(name, value)
    }

    pub fn set_uuid(&mut self, name: &str, value: &str) -> SignalResult<()> {
        self.ensure_preparing()?;
        self.parameters.set_uuid(name, value)
    }

    pub fn set_double(&mut self, name: &str, value: f64) -> SignalResult<()> {
        self.ensure_preparing()?;
        self.parameters.set_double(name, value)
    }

    pub fn set_integer(&mut self, name: &str, value: i64) -> SignalResult<()> {
        self.ensure_preparing()?;
        self.parameters.set_integer(name, value)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> SignalResult<()> {
        self.ensure_preparing()?;
        self.parameters.set_bool(name, value)
    }

    pub fn get_string_result(&self, name: &str) -> SignalResult<String> {
        self.results.get_string(name)
    }

    pub fn get_uuid_result(&self, name: &str) -> SignalResult<String> {
        self.results.get_uuid(name)
    }

    pub fn get_double_result(&self, name: &str) -> SignalResult<f64> {
        self.results.get_double(name)
    }

    pub fn get_integer_result(&self, name: &str) -> SignalResult<i64> {
        self.results.get_integer(name)
    }

    pub fn get_bool_result(&self, name: &str) -> SignalResult<bool> {
        self.results.get_bool(name)
    }
}

impl std::fmt::Debug for SignalTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalTrigger")
            .field("instance", &self.instance)
            .field("signal", &self.signal)
            .field("uuid", &self.uuid)
            .field("armed", &self.armed)
            .finish()
    }
}
