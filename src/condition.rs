//! Condition state records and event snapshots.
//!
//! A [`ConditionRecord`] is the persistent state of one alarm/condition
//! instance: the Part 9 sub-state booleans (enabled, active, acked,
//! confirmed), the derived `retain` flag, severity, message/comment text
//! and the opaque event-id token that correlates Acknowledge / Confirm /
//! AddComment calls to the specific emitted event.
//!
//! The overall behavior is the product of several quasi-independent
//! booleans rather than a single automaton; the canonical transition rules
//! live here and are shared by every variant strategy.

use crate::types::{LocalizedText, NodeId, SEVERITY_MIN};
use crate::variants::limit::{LimitBand, LimitFlags};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Default condition class assigned on every event renewal.
const BASE_CONDITION_CLASS: &str = "BaseConditionClass";

/// Persistent state of one alarm/condition instance.
#[derive(Debug, Clone)]
pub struct ConditionRecord {
    /// Node id of the condition instance itself
    pub node_id: NodeId,
    /// Owning monitor's node id; fixed at attach time, never changes
    pub source_node: NodeId,
    /// Owning monitor's browse name; fixed at attach time, never changes
    pub source_name: String,
    /// Opaque token regenerated on every reported state change
    pub event_id: Vec<u8>,
    /// Time of the last state change
    pub time: DateTime<Utc>,
    /// Time the change was received for reporting
    pub receive_time: DateTime<Utc>,
    /// Master on/off switch; disabled forces `retain` false and suppresses
    /// reporting, while bookkeeping continues
    pub enabled: bool,
    /// Whether the alarm condition currently holds
    pub active: bool,
    /// Whether this condition type has a notion of being active; decided
    /// once at construction
    pub has_active_state: bool,
    /// Acknowledgement lifecycle flag
    pub acked: bool,
    /// Confirmation lifecycle flag
    pub confirmed: bool,
    /// Derived: this condition currently deserves display
    pub retain: bool,
    /// Event severity, 1..=1000
    pub severity: u16,
    /// Last reported message
    pub message: LocalizedText,
    /// Operator comment
    pub comment: LocalizedText,
    /// Condition class id, reset to the base class on every renewal
    pub condition_class_id: NodeId,
    /// Condition class display name
    pub condition_class_name: LocalizedText,
    /// Branching is not supported; present for protocol completeness,
    /// always `None`
    pub branch_id: Option<NodeId>,
}

impl ConditionRecord {
    /// Create a record attached to its owning monitor.
    ///
    /// The source node/name back-references are established here and never
    /// change afterwards. A fresh record starts enabled, inactive and
    /// acknowledged (nothing pending), with minimum severity.
    pub fn new(
        node_id: NodeId,
        source_node: NodeId,
        source_name: impl Into<String>,
        has_active_state: bool,
    ) -> Self {
        let now = Utc::now();
        let mut record = Self {
            node_id,
            source_node,
            source_name: source_name.into(),
            event_id: fresh_event_id(),
            time: now,
            receive_time: now,
            enabled: true,
            active: false,
            has_active_state,
            acked: true,
            confirmed: true,
            retain: false,
            severity: SEVERITY_MIN,
            message: LocalizedText::empty(),
            comment: LocalizedText::empty(),
            condition_class_id: NodeId::new(0, BASE_CONDITION_CLASS),
            condition_class_name: LocalizedText::en(BASE_CONDITION_CLASS),
            branch_id: None,
        };
        record.update_retain();
        record
    }

    /// Enable or disable the condition, then recompute `retain`.
    pub fn set_enable_state(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.on_enable_disable();
    }

    /// Transition hook shared by every enable/disable path.
    fn on_enable_disable(&mut self) {
        self.update_retain();
    }

    /// Recompute the derived `retain` flag.
    ///
    /// `retain = enabled && active` for types with an active notion;
    /// `retain = enabled` for types without one.
    pub fn update_retain(&mut self) {
        self.retain = self.enabled && (self.active || !self.has_active_state);
    }

    /// Shared active-state transition helper.
    ///
    /// Entering inactive unconditionally clears `active`. Entering active
    /// sets it; if the record was previously acknowledged it is re-armed:
    /// `acked` drops to false and `retain` is forced true, so a freshly
    /// re-triggered alarm demands operator attention again.
    pub fn validate_active_state_flags(&mut self, active: bool) {
        if !active {
            self.active = false;
            return;
        }
        let was_active = self.active;
        self.active = true;
        if !was_active && self.acked {
            self.acked = false;
            self.retain = true;
        }
    }

    /// Regenerate the event identity for a new reported state change:
    /// fresh event-id token, stamped times, condition class and branch
    /// reset to their fixed defaults.
    pub fn renew_event(&mut self) {
        self.event_id = fresh_event_id();
        let now = Utc::now();
        self.time = now;
        self.receive_time = now;
        self.condition_class_id = NodeId::new(0, BASE_CONDITION_CLASS);
        self.condition_class_name = LocalizedText::en(BASE_CONDITION_CLASS);
        self.branch_id = None;
    }

    /// Stamp the state-change times without touching the event id. Used by
    /// method-triggered changes, which must keep the id stable so stale
    /// calls are still detected as already-acked/confirmed rather than
    /// unknown.
    pub fn stamp_time(&mut self) {
        let now = Utc::now();
        self.time = now;
        self.receive_time = now;
    }
}

/// Generate a fresh opaque event-id token.
fn fresh_event_id() -> Vec<u8> {
    Uuid::new_v4().as_bytes().to_vec()
}

/// Immutable copy of a condition record's reportable fields, handed to the
/// event sink. Variant-specific detail rides along as optional fields
/// populated by the owning monitor.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionSnapshot {
    /// Event-id token valid for this event
    pub event_id: Vec<u8>,
    /// Condition instance node id
    pub condition_id: String,
    /// Owning monitor browse name
    pub source_name: String,
    /// State-change time
    pub time: DateTime<Utc>,
    /// Reporting time
    pub receive_time: DateTime<Utc>,
    /// Enabled sub-state
    pub enabled: bool,
    /// Active sub-state; `None` for types without an active notion
    pub active: Option<bool>,
    /// Acknowledged sub-state
    pub acked: bool,
    /// Confirmed sub-state
    pub confirmed: bool,
    /// Retain flag
    pub retain: bool,
    /// Event severity
    pub severity: u16,
    /// Message text
    pub message: String,
    /// Comment text
    pub comment: String,
    /// Branch id, always `None` in this layer
    pub branch_id: Option<String>,
    /// Exclusive limit band, if this is an exclusive limit alarm
    pub limit_band: Option<LimitBand>,
    /// Non-exclusive limit flags, if this is a non-exclusive limit alarm
    pub limit_flags: Option<LimitFlags>,
    /// Last dialog response index, for dialog conditions
    pub dialog_response: Option<i32>,
    /// Expected-time tick count, for discrepancy alarms
    pub expected_time_ms: Option<i64>,
    /// Deviation magnitude, for discrepancy alarms
    pub tolerance: Option<f64>,
}

impl ConditionSnapshot {
    /// Snapshot of the common record fields; variant detail starts empty.
    pub fn of(record: &ConditionRecord) -> Self {
        Self {
            event_id: record.event_id.clone(),
            condition_id: record.node_id.to_string(),
            source_name: record.source_name.clone(),
            time: record.time,
            receive_time: record.receive_time,
            enabled: record.enabled,
            active: record.has_active_state.then_some(record.active),
            acked: record.acked,
            confirmed: record.confirmed,
            retain: record.retain,
            severity: record.severity,
            message: record.message.text.clone(),
            comment: record.comment.text.clone(),
            branch_id: record.branch_id.as_ref().map(|id| id.to_string()),
            limit_band: None,
            limit_flags: None,
            dialog_response: None,
            expected_time_ms: None,
            tolerance: None,
        }
    }
}
