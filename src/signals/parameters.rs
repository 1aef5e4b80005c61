/*!
 * Parameter Groups
 * Typed name/value container that serializes signal parameters and results to JSON
 */

use super::definition::{ParameterDescriptor, ParameterType};
use super::traits::DescriptorSink;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::id::SignalUuid;
use ahash::RandomState;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ParameterEntry {
    name: String,
    parameter_type: ParameterType,
    value: Value,
}

/// Ordered, typed set of values declared by a signal definition
#[derive(Debug, Clone, Default)]
pub struct ParameterGroup {
    entries: Vec<ParameterEntry>,
    index: HashMap<String, usize, RandomState>,
}

fn default_value(parameter_type: ParameterType) -> Value {
    match parameter_type {
        ParameterType::String => Value::String(String::new()),
        ParameterType::Uuid => Value::String(SignalUuid::nil().into()),
        ParameterType::Double => Value::from(0.0),
        ParameterType::Integer => Value::from(0i64),
        ParameterType::Bool => Value::Bool(false),
    }
}

impl ParameterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: &[ParameterDescriptor]) -> Self {
        let mut group = Self::new();
        for descriptor in descriptors {
            group.add_typed_parameter(&descriptor.name, descriptor.parameter_type);
        }
        group
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn parameter_type(&self, name: &str) -> SignalResult<ParameterType> {
        self.entry(name).map(|e| e.parameter_type)
    }

    fn entry(&self, name: &str) -> SignalResult<&ParameterEntry> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| SignalError::UnknownParameter(name.to_string()))
    }

    fn typed_entry_mut(
        &mut self,
        name: &str,
        expected: ParameterType,
    ) -> SignalResult<&mut ParameterEntry> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| SignalError::UnknownParameter(name.to_string()))?;
        let entry = &mut self.entries[idx];
        check_type(entry, expected)?;
        Ok(entry)
    }

    fn typed_value(&self, name: &str, expected: ParameterType) -> SignalResult<&Value> {
        let entry = self.entry(name)?;
        check_type(entry, expected)?;
        Ok(&entry.value)
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> SignalResult<()> {
        self.typed_entry_mut(name, ParameterType::String)?.value = Value::String(value.to_string());
        Ok(())
    }

    /// Stores the canonical form of `value`
    pub fn set_uuid(&mut self, name: &str, value: &str) -> SignalResult<()> {
        let uuid = SignalUuid::parse(value)?;
        self.typed_entry_mut(name, ParameterType::Uuid)?.value = Value::String(uuid.into());
        Ok(())
    }

    pub fn set_double(&mut self, name: &str, value: f64) -> SignalResult<()> {
        let number = Number::from_f64(value)
            .ok_or_else(|| SignalError::InvalidPayload(format!("{} is not finite", name)))?;
        self.typed_entry_mut(name, ParameterType::Double)?.value = Value::Number(number);
        Ok(())
    }

    pub fn set_integer(&mut self, name: &str, value: i64) -> SignalResult<()> {
        self.typed_entry_mut(name, ParameterType::Integer)?.value = Value::from(value);
        Ok(())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> SignalResult<()> {
        self.typed_entry_mut(name, ParameterType::Bool)?.value = Value::Bool(value);
        Ok(())
    }

    pub fn get_string(&self, name: &str) -> SignalResult<String> {
        Ok(self
            .typed_value(name, ParameterType::String)?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    pub fn get_uuid(&self, name: &str) -> SignalResult<String> {
        let raw = self
            .typed_value(name, ParameterType::Uuid)?
            .as_str()
            .unwrap_or_default();
        SignalUuid::parse(raw).map(String::from)
    }

    pub fn get_double(&self, name: &str) -> SignalResult<f64> {
        Ok(self
            .typed_value(name, ParameterType::Double)?
            .as_f64()
            .unwrap_or_default())
    }

    pub fn get_integer(&self, name: &str) -> SignalResult<i64> {
        Ok(self
            .typed_value(name, ParameterType::Integer)?
            .as_i64()
            .unwrap_or_default())
    }

    pub fn get_bool(&self, name: &str) -> SignalResult<bool> {
        Ok(self
            .typed_value(name, ParameterType::Bool)?
            .as_bool()
            .unwrap_or_default())
    }

    /// Serialize all values into one JSON object
    pub fn to_json(&self) -> String {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.value.clone()))
            .collect();
        Value::Object(object).to_string()
    }

    /// Overwrite declared values from a JSON object
    ///
    /// An empty payload is a no-op. Keys that are not declared are ignored;
    /// a declared key whose value has the wrong JSON type fails the whole
    /// merge without touching the group.
    pub fn merge_json(&mut self, json: &str) -> SignalResult<()> {
        if json.trim().is_empty() {
            return Ok(());
        }

        let parsed: Value =
            serde_json::from_str(json).map_err(|e| SignalError::InvalidPayload(e.to_string()))?;
        let object = match parsed {
            Value::Object(object) => object,
            other => {
                return Err(SignalError::InvalidPayload(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let mut updates = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Some(value) = object.get(&entry.name) {
                updates.push((idx, coerce(entry, value)?));
            }
        }
        for (idx, value) in updates {
            self.entries[idx].value = value;
        }
        Ok(())
    }
}

impl DescriptorSink for ParameterGroup {
    fn add_typed_parameter(&mut self, name: &str, parameter_type: ParameterType) {
        if let Some(&idx) = self.index.get(name) {
            let entry = &mut self.entries[idx];
            entry.parameter_type = parameter_type;
            entry.value = default_value(parameter_type);
            return;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(ParameterEntry {
            name: name.to_string(),
            parameter_type,
            value: default_value(parameter_type),
        });
    }
}

fn check_type(entry: &ParameterEntry, requested: ParameterType) -> SignalResult<()> {
    if entry.parameter_type == requested {
        Ok(())
    } else {
        Err(SignalError::ParameterTypeMismatch {
            name: entry.name.clone(),
            declared: entry.parameter_type.to_string(),
            requested: requested.to_string(),
        })
    }
}

fn coerce(entry: &ParameterEntry, value: &Value) -> SignalResult<Value> {
    let coerced = match entry.parameter_type {
        ParameterType::String => value.as_str().map(|s| Value::String(s.to_string())),
        ParameterType::Uuid => value
            .as_str()
            .and_then(|s| SignalUuid::parse(s).ok())
            .map(|u| Value::String(u.into())),
        ParameterType::Double => value.as_f64().and_then(Number::from_f64).map(Value::Number),
        ParameterType::Integer => value.as_i64().map(Value::from),
        ParameterType::Bool => value.as_bool().map(Value::Bool),
    };

    coerced.ok_or_else(|| {
        SignalError::InvalidPayload(format!(
            "value {} for '{}' is not a valid {}",
            value, entry.name, entry.parameter_type
        ))
    })
}
