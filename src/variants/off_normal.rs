//! Off-normal family: binary normal/abnormal alarms and discrete
//! allowed-value-set alarms.
//!
//! An off-normal alarm is active exactly when the monitored value differs
//! from a sibling "normal value" variable. The sibling is read live at
//! comparison time, never cached, because the normal value can itself be
//! changed independently. The specializations differ only in which
//! condition class is instantiated and which extra fields are populated at
//! construction; the evaluation algorithm is shared.

use crate::address_space::AddressSpace;
use crate::condition::ConditionRecord;
use crate::error::Result;
use crate::types::{NodeId, SEVERITY_MEDIUM, SEVERITY_MIN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which concrete off-normal condition type is instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffNormalKind {
    /// Plain off-normal alarm
    OffNormal,
    /// System-raised off-normal alarm
    SystemOffNormal,
    /// Trip alarm
    Trip,
    /// System diagnostic alarm
    SystemDiagnostic,
    /// Instrument diagnostic alarm
    InstrumentDiagnostic,
    /// Certificate expiration alarm (carries an expiration date)
    CertificateExpiration,
    /// Trust list out of date alarm (carries a trust list id)
    TrustListOutOfDate,
}

/// Off-normal alarm evaluation state.
#[derive(Debug, Clone)]
pub struct OffNormalAlarm {
    /// Concrete condition type
    pub kind: OffNormalKind,
    /// Sibling variable holding the current normal value
    pub normal_value_node: NodeId,
    /// Mandatory for [`OffNormalKind::CertificateExpiration`], decided at
    /// construction
    pub expiration_date: Option<DateTime<Utc>>,
    /// Mandatory for [`OffNormalKind::TrustListOutOfDate`], decided at
    /// construction
    pub trust_list_id: Option<NodeId>,
}

impl OffNormalAlarm {
    /// Plain off-normal alarm comparing against the given sibling.
    pub fn new(kind: OffNormalKind, normal_value_node: NodeId) -> Self {
        Self {
            kind,
            normal_value_node,
            expiration_date: None,
            trust_list_id: None,
        }
    }

    /// Active iff the value differs from the normal value read live from
    /// the sibling variable.
    pub fn evaluate(
        &mut self,
        space: &AddressSpace,
        record: &mut ConditionRecord,
        value: f64,
    ) -> Result<()> {
        let normal = space.get_float(&self.normal_value_node)?;
        let active = value != normal;
        record.validate_active_state_flags(active);
        record.severity = if active { SEVERITY_MEDIUM } else { SEVERITY_MIN };
        Ok(())
    }
}

/// Discrete alarm: active when the value is outside an allowed set.
#[derive(Debug, Clone)]
pub struct DiscreteAlarm {
    /// Allowed discrete values
    pub allowed: Vec<i64>,
}

impl DiscreteAlarm {
    /// Alarm over the given allowed-value set.
    pub fn new(allowed: Vec<i64>) -> Self {
        Self { allowed }
    }

    /// Active iff the (truncated) value is not in the allowed set.
    pub fn evaluate(&mut self, record: &mut ConditionRecord, value: f64) -> Result<()> {
        let active = !self.allowed.contains(&(value as i64));
        record.validate_active_state_flags(active);
        record.severity = if active { SEVERITY_MEDIUM } else { SEVERITY_MIN };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ConditionRecord {
        ConditionRecord::new(
            NodeId::new(2, "Alarms.Valve.OffNormal"),
            NodeId::new(2, "Alarms.Valve"),
            "Valve",
            true,
        )
    }

    #[test]
    fn equal_to_normal_is_inactive() {
        let space = AddressSpace::new();
        let normal = NodeId::new(2, "Alarms.Valve.NormalValue");
        space.set(&normal, 10.0.into());
        let mut alarm = OffNormalAlarm::new(OffNormalKind::OffNormal, normal);
        let mut rec = record();

        alarm.evaluate(&space, &mut rec, 10.0).unwrap();
        assert!(!rec.active);
        assert_eq!(rec.severity, SEVERITY_MIN);

        alarm.evaluate(&space, &mut rec, 11.0).unwrap();
        assert!(rec.active);
        assert!(!rec.acked);
        assert_eq!(rec.severity, SEVERITY_MEDIUM);
    }

    #[test]
    fn normal_value_is_read_live() {
        let space = AddressSpace::new();
        let normal = NodeId::new(2, "Alarms.Valve.NormalValue");
        space.set(&normal, 10.0.into());
        let mut alarm = OffNormalAlarm::new(OffNormalKind::SystemOffNormal, normal.clone());
        let mut rec = record();

        alarm.evaluate(&space, &mut rec, 12.0).unwrap();
        assert!(rec.active);

        // The normal value moves to match; the same reading is now normal.
        space.set(&normal, 12.0.into());
        alarm.evaluate(&space, &mut rec, 12.0).unwrap();
        assert!(!rec.active);
    }

    #[test]
    fn missing_normal_sibling_is_an_evaluation_fault() {
        let space = AddressSpace::new();
        let mut alarm =
            OffNormalAlarm::new(OffNormalKind::Trip, NodeId::new(2, "Alarms.Valve.Missing"));
        let mut rec = record();
        assert!(alarm.evaluate(&space, &mut rec, 1.0).is_err());
    }

    #[test]
    fn discrete_set_membership() {
        let mut alarm = DiscreteAlarm::new(vec![0, 1, 2]);
        let mut rec = record();

        alarm.evaluate(&mut rec, 1.0).unwrap();
        assert!(!rec.active);
        alarm.evaluate(&mut rec, 5.0).unwrap();
        assert!(rec.active);
        alarm.evaluate(&mut rec, 2.0).unwrap();
        assert!(!rec.active);
    }
}
