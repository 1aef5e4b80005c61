/*!
 * Signal Handler
 * Consumer handle: pick up a queued signal, read its parameters, report the outcome
 */

use super::parameters::ParameterGroup;
use super::router::SignalRouter;
use super::types::SignalPhase;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::id::SignalUuid;
use crate::core::types::TimeoutMs;
use tracing::{debug, warn};

/// Consumer-side view of one live signal
pub struct SignalHandler {
    router: SignalRouter,
    instance: String,
    signal: String,
    uuid: SignalUuid,
    parameters: ParameterGroup,
    results: ParameterGroup,
}

impl SignalHandler {
    /// Open the signal at the head of the (instance, signal) queue, if any
    ///
    /// A head signal finalized by someone else between the peek and the
    /// open counts as an empty queue.
    pub fn next(router: &SignalRouter, instance: &str, signal: &str) -> SignalResult<Option<Self>> {
        match router.peek_signal(instance, signal)? {
            Some(uuid) => Self::try_open(router, &uuid),
            None => Ok(None),
        }
    }

    /// [`open`](Self::open), with `None` for a UUID that is no longer live
    pub fn try_open(router: &SignalRouter, uuid: &str) -> SignalResult<Option<Self>> {
        match Self::open(router, uuid) {
            Ok(handler) => Ok(Some(handler)),
            Err(SignalError::SignalNotFound(_)) => {
                debug!(uuid, "Signal vanished before it could be opened");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Open a live signal by UUID and decode its parameters
    pub fn open(router: &SignalRouter, uuid: &str) -> SignalResult<Self> {
        let uuid = SignalUuid::parse(uuid)?;
        let owner = router
            .find_owner(uuid.as_str())
            .ok_or_else(|| SignalError::SignalNotFound(uuid.to_string()))?;

        let mut parameters = ParameterGroup::new();
        let mut results = ParameterGroup::new();
        router.populate_parameter_group(&owner.instance, &owner.signal, &mut parameters)?;
        router.populate_result_group(&owner.instance, &owner.signal, &mut results)?;
        parameters.merge_json(&owner.parameter_json)?;

        Ok(Self {
            router: router.clone(),
            instance: owner.instance,
            signal: owner.signal,
            uuid,
            parameters,
            results,
        })
    }

    pub fn uuid(&self) -> &str {
        self.uuid.as_str()
    }

    pub fn instance_name(&self) -> &str {
        &self.instance
    }

    pub fn signal_name(&self) -> &str {
        &self.signal
    }

    pub fn phase(&self) -> SignalResult<SignalPhase> {
        self.router.phase_of(self.uuid.as_str())
    }

    pub fn reaction_timeout(&self) -> SignalResult<TimeoutMs> {
        self.router.reaction_timeout_of(self.uuid.as_str())
    }

    /// Take the signal off the queue; false if it is no longer queued
    pub fn mark_in_process(&self) -> SignalResult<bool> {
        self.router.advance_to_in_process(self.uuid.as_str())
    }

    /// Publish the result values and move to `Handled`
    pub fn signal_handled(&self) -> SignalResult<bool> {
        let handled = self
            .router
            .advance_to_handled(self.uuid.as_str(), &self.results.to_json())?;
        if !handled {
            warn!(uuid = %self.uuid, "Signal could not be marked handled");
        }
        Ok(handled)
    }

    /// Publish the result values with an error message and move to `Failed`
    pub fn signal_failed(&self, error_message: &str) -> SignalResult<bool> {
        let failed = self.router.advance_to_failed(
            self.uuid.as_str(),
            &self.results.to_json(),
            error_message,
        )?;
        debug!(uuid = %self.uuid, failed, error = error_message, "Signal failure reported");
        Ok(failed)
    }

    pub fn parameters(&self) -> &ParameterGroup {
        &self.parameters
    }

    pub fn results(&self) -> &ParameterGroup {
        &self.results
    }

    pub fn get_string(&self, name: &str) -> SignalResult<String> {
        self.parameters.get_string(name)
    }

    pub fn get_uuid(&self, name: &str) -> SignalResult<String> {
        self.parameters.get_uuid(name)
    }

    pub fn get_double(&self, name: &str) -> SignalResult<f64> {
        self.parameters.get_double(name)
    }

    pub fn get_integer(&self, name: &str) -> SignalResult<i64> {
        self.parameters.get_integer(name)
    }

    pub fn get_bool(&self, name: &str) -> SignalResult<bool> {
        self.parameters.get_bool(name)
    }

    pub fn set_string_result(&mut self, name: &str, value: &str) -> SignalResult<()> {
        self.results.set_string(name, value)
    }

    pub fn set_uuid_result(&mut self, name: &str, value: &str) -> SignalResult<()> {
        self.results.set_uuid(name, value)
    }

    pub fn set_double_result(&mut self, name: &str, value: f64) -> SignalResult<()> {
        self.results.set_double(name, value)
    }

    pub fn set_integer_result(&mut self, name: &str, value: i64) -> SignalResult<()> {
        self.results.set_integer(name, value)
    }

    pub fn set_bool_result(&mut self, name: &str, value: bool) -> SignalResult<()> {
        self.results.set_bool(name, value)
    }
}

impl std::fmt::Debug for SignalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHandler")
            .field("instance", &self.instance)
            .field("signal", &self.signal)
            .field("uuid", &self.uuid)
            .finish()
    }
}
