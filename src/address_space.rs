// src/address_space.rs - variable storage shared by monitors and their siblings

use crate::error::{Result, UaError};
use crate::types::NodeId;
use crate::value::Value;
use dashmap::DashMap;
use log::trace;
use std::sync::Arc;

/// Thread-safe store of variable values keyed by node id.
///
/// This is the slice of the host SDK's address space the monitor layer
/// needs: the monitored variables themselves plus the auxiliary siblings
/// (normal value, setpoint, expected value) that off-normal, deviation and
/// discrepancy evaluation read *live* at comparison time. Reads are always
/// late-bound; nothing in the evaluation path caches a sibling's value.
///
/// # Examples
///
/// ```rust
/// use uamon::{AddressSpace, NodeId, Value};
///
/// let space = AddressSpace::new();
/// let id = NodeId::new(2, "Tank1.Level");
/// space.set(&id, Value::Float(23.5));
/// assert_eq!(space.get_float(&id).unwrap(), 23.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressSpace {
    variables: Arc<DashMap<NodeId, Value>>,
}

impl AddressSpace {
    /// Create an empty address space.
    pub fn new() -> Self {
        Self {
            variables: Arc::new(DashMap::new()),
        }
    }

    /// Set a variable value, creating the variable if needed.
    pub fn set(&self, id: &NodeId, value: Value) {
        trace!("Setting {} = {:?}", id, value);
        self.variables.insert(id.clone(), value);
    }

    /// Get a variable value. Returns `None` if the variable doesn't exist.
    pub fn get(&self, id: &NodeId) -> Option<Value> {
        self.variables.get(id).map(|entry| entry.value().clone())
    }

    /// Get a variable as a float, converting where appropriate.
    pub fn get_float(&self, id: &NodeId) -> Result<f64> {
        match self.get(id) {
            Some(v) => v.as_float().ok_or(UaError::TypeMismatch {
                expected: "float",
                actual: v.type_name(),
            }),
            None => Err(UaError::NodeNotFound(id.to_string())),
        }
    }

    /// Whether a variable exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.variables.contains_key(id)
    }

    /// Number of variables held.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the space is empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let space = AddressSpace::new();
        let id = NodeId::new(1, "x");
        space.set(&id, Value::Int(7));
        assert_eq!(space.get_float(&id).unwrap(), 7.0);
        assert!(space.contains(&id));
    }

    #[test]
    fn missing_node_is_an_error() {
        let space = AddressSpace::new();
        let err = space.get_float(&NodeId::new(1, "nope")).unwrap_err();
        assert!(matches!(err, UaError::NodeNotFound(_)));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let space = AddressSpace::new();
        let id = NodeId::new(1, "s");
        space.set(&id, Value::String("abc".into()));
        let err = space.get_float(&id).unwrap_err();
        assert!(matches!(err, UaError::TypeMismatch { .. }));
    }

    #[test]
    fn late_bound_read_sees_updates() {
        let space = AddressSpace::new();
        let id = NodeId::new(1, "normal");
        space.set(&id, Value::Float(10.0));
        assert_eq!(space.get_float(&id).unwrap(), 10.0);
        space.set(&id, Value::Float(12.0));
        assert_eq!(space.get_float(&id).unwrap(), 12.0);
    }
}
