//! Discrepancy alarm: actual vs. expected value comparison.
//!
//! The sample uses even parity of the monitored value as the mismatch
//! trigger. On activation the alarm records the expected time as a
//! millisecond tick count and the tolerance as the magnitude of the
//! deviation from the expected-value sibling, and — like the limit family
//! — re-arms acknowledgement on every re-activation.

use crate::address_space::AddressSpace;
use crate::condition::ConditionRecord;
use crate::error::Result;
use crate::types::{NodeId, SEVERITY_MEDIUM, SEVERITY_MIN};
use chrono::Utc;

/// Discrepancy alarm evaluation state.
#[derive(Debug, Clone)]
pub struct DiscrepancyAlarm {
    /// Sibling variable holding the expected value, read live
    pub expected_value_node: NodeId,
    /// Tick count recorded on the last activation
    pub expected_time_ms: i64,
    /// Deviation magnitude recorded on the last activation
    pub tolerance: f64,
}

impl DiscrepancyAlarm {
    /// Alarm comparing against the given expected-value sibling.
    pub fn new(expected_value_node: NodeId) -> Self {
        Self {
            expected_value_node,
            expected_time_ms: 0,
            tolerance: 0.0,
        }
    }

    /// Parity-triggered mismatch evaluation.
    pub fn evaluate(
        &mut self,
        space: &AddressSpace,
        record: &mut ConditionRecord,
        value: f64,
    ) -> Result<()> {
        let expected = space.get_float(&self.expected_value_node)?;
        let mismatch = (value as i64).rem_euclid(2) == 0;
        if mismatch {
            self.expected_time_ms = Utc::now().timestamp_millis();
            self.tolerance = (value - expected).abs();
        }
        record.validate_active_state_flags(mismatch);
        record.severity = if mismatch { SEVERITY_MEDIUM } else { SEVERITY_MIN };
        Ok(())
    }
}
