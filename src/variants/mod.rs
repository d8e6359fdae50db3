//! Per-alarm-family evaluation strategies.
//!
//! Instead of an inheritance chain of monitor classes, a single
//! [`AlarmMonitor`](crate::monitor::AlarmMonitor) is parameterized over a
//! [`ConditionVariant`]: a tagged union carrying each family's thresholds
//! and mutable evaluation state, with evaluation dispatched by an explicit
//! match rather than virtual overrides.

pub mod dialog;
pub mod discrepancy;
pub mod limit;
pub mod off_normal;

use crate::address_space::AddressSpace;
use crate::condition::{ConditionRecord, ConditionSnapshot};
use crate::error::Result;
use crate::types::SEVERITY_MIN;
use dialog::DialogCondition;
use discrepancy::DiscrepancyAlarm;
use limit::LimitAlarm;
use off_normal::{DiscreteAlarm, OffNormalAlarm};

/// Capability descriptor and evaluation state for one condition family.
#[derive(Debug, Clone)]
pub enum ConditionVariant {
    /// Acknowledgeable condition: ack/confirm lifecycle only, no active
    /// notion; value changes refresh the event identity
    Acknowledgeable,
    /// Limit alarm (level, deviation or rate-of-change; exclusive or
    /// non-exclusive)
    Limit(LimitAlarm),
    /// Off-normal alarm family
    OffNormal(OffNormalAlarm),
    /// Discrete allowed-value-set alarm
    Discrete(DiscreteAlarm),
    /// Operator dialog condition
    Dialog(DialogCondition),
    /// Expected-vs-actual discrepancy alarm
    Discrepancy(DiscrepancyAlarm),
}

impl ConditionVariant {
    /// Whether this condition type has a notion of being active. Types
    /// without one derive `retain` from the enabled flag alone.
    pub fn has_active_state(&self) -> bool {
        !matches!(
            self,
            ConditionVariant::Acknowledgeable | ConditionVariant::Dialog(_)
        )
    }

    /// The limit family re-evaluates on every notification; all other
    /// families gate on value-changed-ness. Preserved sample behavior,
    /// not an optimization target.
    pub fn reevaluates_unconditionally(&self) -> bool {
        matches!(self, ConditionVariant::Limit(_))
    }

    /// Run the family's state evaluation for a new monitored value.
    pub fn evaluate(
        &mut self,
        space: &AddressSpace,
        record: &mut ConditionRecord,
        value: f64,
    ) -> Result<()> {
        match self {
            ConditionVariant::Acknowledgeable => {
                record.severity = SEVERITY_MIN;
                Ok(())
            }
            ConditionVariant::Limit(alarm) => alarm.evaluate(space, record, value),
            ConditionVariant::OffNormal(alarm) => alarm.evaluate(space, record, value),
            ConditionVariant::Discrete(alarm) => alarm.evaluate(record, value),
            ConditionVariant::Dialog(dialog) => dialog.evaluate(record, value),
            ConditionVariant::Discrepancy(alarm) => alarm.evaluate(space, record, value),
        }
    }

    /// Attach variant-specific detail to an event snapshot.
    pub fn decorate_snapshot(&self, snapshot: &mut ConditionSnapshot) {
        match self {
            ConditionVariant::Acknowledgeable
            | ConditionVariant::OffNormal(_)
            | ConditionVariant::Discrete(_) => {}
            ConditionVariant::Limit(alarm) => {
                snapshot.limit_band = alarm.band();
                snapshot.limit_flags = alarm.flags();
            }
            ConditionVariant::Dialog(dialog) => {
                snapshot.dialog_response = Some(dialog.last_response);
            }
            ConditionVariant::Discrepancy(alarm) => {
                snapshot.expected_time_ms = Some(alarm.expected_time_ms);
                snapshot.tolerance = Some(alarm.tolerance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;
    use limit::{LimitBand, LimitKind, LimitStyle, Thresholds};

    #[test]
    fn only_limit_family_reevaluates_unconditionally() {
        let limit = ConditionVariant::Limit(LimitAlarm::new(
            LimitKind::Level,
            Thresholds { low_low: 20.0, low: 30.0, high: 50.0, high_high: 80.0 },
            LimitStyle::Exclusive { band: LimitBand::Inactive },
            0.0,
        ));
        assert!(limit.reevaluates_unconditionally());
        assert!(!ConditionVariant::Acknowledgeable.reevaluates_unconditionally());
        assert!(!ConditionVariant::Discrete(DiscreteAlarm::new(vec![0]))
            .reevaluates_unconditionally());
    }

    #[test]
    fn active_notion_per_family() {
        assert!(!ConditionVariant::Acknowledgeable.has_active_state());
        assert!(!ConditionVariant::Dialog(DialogCondition::new(Default::default()))
            .has_active_state());
        assert!(ConditionVariant::Discrete(DiscreteAlarm::new(vec![0])).has_active_state());
        assert!(ConditionVariant::Discrepancy(DiscrepancyAlarm::new(NodeId::new(2, "x")))
            .has_active_state());
    }
}
