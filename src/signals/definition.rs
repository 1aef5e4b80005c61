/*!
 * Signal Definitions
 * Registration-time schema for one (instance, signal) pair
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::core::types::{validate_queue_capacity, validate_reaction_timeout, TimeoutMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value type of a signal parameter or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Uuid,
    Double,
    #[serde(rename = "int")]
    Integer,
    Bool,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Uuid => "uuid",
            ParameterType::Double => "double",
            ParameterType::Integer => "int",
            ParameterType::Bool => "bool",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(ParameterType::String),
            "uuid" => Ok(ParameterType::Uuid),
            "double" => Ok(ParameterType::Double),
            "int" | "integer" => Ok(ParameterType::Integer),
            "bool" | "boolean" => Ok(ParameterType::Bool),
            other => Err(SignalError::InvalidName(format!(
                "unknown parameter type '{}'",
                other
            ))),
        }
    }
}

/// Name and type of one declared parameter or result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub parameter_type: ParameterType,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            parameter_type,
        }
    }
}

/// Immutable schema of a signal type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDefinition {
    pub instance: String,
    pub signal: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub results: Vec<ParameterDescriptor>,
    pub default_reaction_timeout_ms: TimeoutMs,
    pub queue_capacity: u32,
}

impl SignalDefinition {
    /// Build a validated definition
    ///
    /// Names must be non-empty, the default timeout and the queue capacity
    /// must be within the crate limits.
    pub fn new(
        instance: impl Into<String>,
        signal: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
        results: Vec<ParameterDescriptor>,
        default_reaction_timeout_ms: TimeoutMs,
        queue_capacity: u32,
    ) -> SignalResult<Self> {
        let instance = instance.into();
        let signal = signal.into();

        if signal.is_empty() {
            return Err(SignalError::InvalidName(format!(
                "empty signal name for instance '{}'",
                instance
            )));
        }
        if instance.is_empty() {
            return Err(SignalError::InvalidName(format!(
                "empty instance name for signal '{}'",
                signal
            )));
        }

        Ok(Self {
            instance,
            signal,
            parameters,
            results,
            default_reaction_timeout_ms: validate_reaction_timeout(default_reaction_timeout_ms)?,
            queue_capacity: validate_queue_capacity(queue_capacity)?,
        })
    }

    /// Registry key
    pub fn key(&self) -> (String, String) {
        (self.instance.clone(), self.signal.clone())
    }
}
