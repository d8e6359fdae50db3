//! Client-side bounded enum wrapper.
//!
//! An [`EnumValue`] is a `(type name, value, display string)` triple over a
//! fixed lookup table supporting bidirectional name/value lookup. The
//! value defaults to the first declared field; assigning an unknown string
//! or integer resets the wrapper to empty/0.

use serde::{Deserialize, Serialize};

/// Bounded enumeration value with a fixed field table.
///
/// # Examples
///
/// ```rust
/// use uamon::EnumValue;
///
/// let mut mode = EnumValue::new("ServerState", vec![
///     ("Running".to_string(), 0),
///     ("Failed".to_string(), 1),
///     ("Shutdown".to_string(), 4),
/// ]);
/// assert_eq!(mode.value(), 0);
/// assert_eq!(mode.display_string(), "Running");
///
/// mode.set_by_name("Shutdown");
/// assert_eq!(mode.value(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    type_name: String,
    fields: Vec<(String, i64)>,
    value: i64,
}

impl EnumValue {
    /// Wrapper over the given declared fields; the value defaults to the
    /// first declared field (or 0 when there are none).
    pub fn new(type_name: impl Into<String>, fields: Vec<(String, i64)>) -> Self {
        let value = fields.first().map(|(_, v)| *v).unwrap_or(0);
        Self {
            type_name: type_name.into(),
            fields,
            value,
        }
    }

    /// Declared type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Current numeric value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Display string of the current value; empty when the value is not a
    /// declared field.
    pub fn display_string(&self) -> &str {
        self.name_of(self.value).unwrap_or("")
    }

    /// Name declared for a value.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }

    /// Value declared for a name.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Assign by numeric value; an unknown value resets to 0.
    pub fn set_value(&mut self, value: i64) {
        self.value = if self.name_of(value).is_some() { value } else { 0 };
    }

    /// Assign by field name; an unknown name resets to empty/0.
    pub fn set_by_name(&mut self, name: &str) {
        self.value = self.value_of(name).unwrap_or(0);
    }
}
