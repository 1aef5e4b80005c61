/*!
 * Signal Traits
 * Seams between the signal core and its typed-value collaborators
 */

use super::definition::ParameterType;

/// Receiver of a definition's parameter or result schema
///
/// Slots only store opaque JSON. Anything that wants a typed view of a
/// signal's values implements this and gets populated from the definition.
pub trait DescriptorSink {
    /// Declare one typed entry
    fn add_typed_parameter(&mut self, name: &str, parameter_type: ParameterType);
}

impl DescriptorSink for Vec<(String, ParameterType)> {
    fn add_typed_parameter(&mut self, name: &str, parameter_type: ParameterType) {
        self.push((name.to_string(), parameter_type));
    }
}
