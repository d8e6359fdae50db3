//! Alarm monitors: the update pipeline binding a monitored value to its
//! condition records.
//!
//! An [`AlarmMonitor`] owns the monitored value, one or more conditions
//! (each behind its own mutex so a value-change notification and an
//! Acknowledge racing from another thread cannot lose updates), the
//! address-space handle for late-bound sibling reads, and the event sink.
//!
//! Failure policy: best-effort, log-and-continue. An evaluation fault in
//! one condition is logged and swallowed; the monitored value itself is
//! stored before evaluation runs, so subsequent notifications self-heal.
//! One malfunctioning alarm must not take down unrelated monitored points.

use crate::address_space::AddressSpace;
use crate::condition::{ConditionRecord, ConditionSnapshot};
use crate::error::{Result, UaError};
use crate::methods;
use crate::sink::EventSink;
use crate::status::StatusCode;
use crate::types::{LocalizedText, NodeId, OperationContext};
use crate::value::Value;
use crate::variants::dialog::DialogCondition;
use crate::variants::discrepancy::DiscrepancyAlarm;
use crate::variants::limit::{LimitAlarm, LimitBand, LimitFlags, LimitKind, LimitStyle, Thresholds};
use crate::variants::off_normal::{DiscreteAlarm, OffNormalAlarm, OffNormalKind};
use crate::variants::ConditionVariant;
use chrono::{DateTime, Utc};
use log::error;
use parking_lot::Mutex;
use std::sync::Arc;

/// Browse-path segment of the sibling variable holding an off-normal
/// alarm's normal value.
pub const NORMAL_VALUE_SEGMENT: &str = "NormalValue";
/// Browse-path segment of a deviation alarm's setpoint sibling.
pub const SETPOINT_SEGMENT: &str = "Setpoint";
/// Browse-path segment of a discrepancy alarm's expected-value sibling.
pub const EXPECTED_VALUE_SEGMENT: &str = "ExpectedValue";

/// A condition record together with its variant evaluation state, guarded
/// as one unit.
#[derive(Debug)]
pub struct Condition {
    /// Persistent condition state
    pub record: ConditionRecord,
    /// Family-specific evaluation state
    pub variant: ConditionVariant,
}

/// Condition method selector, dispatched explicitly at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionMethod {
    /// Acknowledge the identified event
    Acknowledge,
    /// Confirm the identified event
    Confirm,
    /// Attach a comment to the identified event
    AddComment,
}

/// One monitored variable wired to its alarm conditions.
pub struct AlarmMonitor {
    name: String,
    node_id: NodeId,
    space: AddressSpace,
    sink: Arc<dyn EventSink>,
    value: Mutex<f64>,
    conditions: Vec<Arc<Mutex<Condition>>>,
}

impl AlarmMonitor {
    /// Attach a monitor with a single condition of the given variant.
    ///
    /// Creates the monitored variable in the address space, builds the
    /// condition record with its source back-references (fixed here, never
    /// changed afterwards) and registers the initial value.
    pub fn attach(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        variant: ConditionVariant,
    ) -> Arc<Self> {
        let node_id = NodeId::new(namespace, name);
        space.set(&node_id, Value::Float(initial_value));

        let record = ConditionRecord::new(
            node_id.child(alarm_name),
            node_id.clone(),
            name,
            variant.has_active_state(),
        );

        Arc::new(Self {
            name: name.to_string(),
            node_id,
            space: space.clone(),
            sink,
            value: Mutex::new(initial_value),
            conditions: vec![Arc::new(Mutex::new(Condition { record, variant }))],
        })
    }

    /// Exclusive limit alarm over the raw value.
    pub fn exclusive_limit(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        thresholds: Thresholds,
    ) -> Result<Arc<Self>> {
        thresholds.validate()?;
        let variant = ConditionVariant::Limit(LimitAlarm::new(
            LimitKind::Level,
            thresholds,
            LimitStyle::Exclusive { band: LimitBand::Inactive },
            initial_value,
        ));
        Ok(Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant))
    }

    /// Non-exclusive limit alarm over the raw value.
    pub fn non_exclusive_limit(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        thresholds: Thresholds,
    ) -> Result<Arc<Self>> {
        thresholds.validate()?;
        let variant = ConditionVariant::Limit(LimitAlarm::new(
            LimitKind::Level,
            thresholds,
            LimitStyle::NonExclusive { flags: LimitFlags::default() },
            initial_value,
        ));
        Ok(Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant))
    }

    /// Deviation alarm: ladder applied to the offset from a setpoint
    /// sibling created alongside the monitor.
    pub fn deviation(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        setpoint: f64,
        thresholds: Thresholds,
    ) -> Result<Arc<Self>> {
        thresholds.validate()?;
        let setpoint_node = NodeId::new(namespace, name).child(SETPOINT_SEGMENT);
        space.set(&setpoint_node, Value::Float(setpoint));
        let variant = ConditionVariant::Limit(LimitAlarm::new(
            LimitKind::Deviation { setpoint_node },
            thresholds,
            LimitStyle::Exclusive { band: LimitBand::Inactive },
            initial_value,
        ));
        Ok(Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant))
    }

    /// Rate-of-change alarm: ladder applied to the delta between
    /// successive notifications.
    pub fn rate_of_change(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        thresholds: Thresholds,
    ) -> Result<Arc<Self>> {
        thresholds.validate()?;
        let variant = ConditionVariant::Limit(LimitAlarm::new(
            LimitKind::RateOfChange,
            thresholds,
            LimitStyle::Exclusive { band: LimitBand::Inactive },
            initial_value,
        ));
        Ok(Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant))
    }

    /// Off-normal alarm of the given kind, with its normal-value sibling
    /// created alongside the monitor.
    pub fn off_normal(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        normal_value: f64,
        kind: OffNormalKind,
    ) -> Arc<Self> {
        let normal_node = NodeId::new(namespace, name).child(NORMAL_VALUE_SEGMENT);
        space.set(&normal_node, Value::Float(normal_value));
        let variant = ConditionVariant::OffNormal(OffNormalAlarm::new(kind, normal_node));
        Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant)
    }

    /// Certificate-expiration alarm: an off-normal specialization with a
    /// mandatory expiration date populated at construction.
    pub fn certificate_expiration(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        normal_value: f64,
        expiration_date: DateTime<Utc>,
    ) -> Arc<Self> {
        let normal_node = NodeId::new(namespace, name).child(NORMAL_VALUE_SEGMENT);
        space.set(&normal_node, Value::Float(normal_value));
        let mut alarm = OffNormalAlarm::new(OffNormalKind::CertificateExpiration, normal_node);
        alarm.expiration_date = Some(expiration_date);
        Self::attach(
            space,
            sink,
            namespace,
            name,
            alarm_name,
            initial_value,
            ConditionVariant::OffNormal(alarm),
        )
    }

    /// Trust-list-out-of-date alarm: an off-normal specialization carrying
    /// the trust list id.
    pub fn trust_list_out_of_date(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        normal_value: f64,
        trust_list_id: NodeId,
    ) -> Arc<Self> {
        let normal_node = NodeId::new(namespace, name).child(NORMAL_VALUE_SEGMENT);
        space.set(&normal_node, Value::Float(normal_value));
        let mut alarm = OffNormalAlarm::new(OffNormalKind::TrustListOutOfDate, normal_node);
        alarm.trust_list_id = Some(trust_list_id);
        Self::attach(
            space,
            sink,
            namespace,
            name,
            alarm_name,
            initial_value,
            ConditionVariant::OffNormal(alarm),
        )
    }

    /// Discrete alarm over an allowed-value set.
    pub fn discrete(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        allowed: Vec<i64>,
    ) -> Arc<Self> {
        let variant = ConditionVariant::Discrete(DiscreteAlarm::new(allowed));
        Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant)
    }

    /// Dialog condition with the given prompt.
    pub fn dialog(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        prompt: LocalizedText,
    ) -> Arc<Self> {
        let variant = ConditionVariant::Dialog(DialogCondition::new(prompt));
        Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant)
    }

    /// Discrepancy alarm with its expected-value sibling created alongside
    /// the monitor.
    pub fn discrepancy(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
        expected_value: f64,
    ) -> Arc<Self> {
        let expected_node = NodeId::new(namespace, name).child(EXPECTED_VALUE_SEGMENT);
        space.set(&expected_node, Value::Float(expected_value));
        let variant = ConditionVariant::Discrepancy(DiscrepancyAlarm::new(expected_node));
        Self::attach(space, sink, namespace, name, alarm_name, initial_value, variant)
    }

    /// Acknowledgeable condition: lifecycle methods only.
    pub fn acknowledgeable(
        space: &AddressSpace,
        sink: Arc<dyn EventSink>,
        namespace: u16,
        name: &str,
        alarm_name: &str,
        initial_value: f64,
    ) -> Arc<Self> {
        Self::attach(
            space,
            sink,
            namespace,
            name,
            alarm_name,
            initial_value,
            ConditionVariant::Acknowledgeable,
        )
    }

    /// Monitor browse name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node id of the monitored variable.
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Current monitored value.
    pub fn value(&self) -> f64 {
        *self.value.lock()
    }

    /// The held conditions, for registration and bulk iteration.
    pub fn condition_states(&self) -> Vec<Arc<Mutex<Condition>>> {
        self.conditions.clone()
    }

    /// Value-changed notification entry point.
    ///
    /// Evaluation exceptions never escape to the caller: they are logged
    /// with the originating monitor name and swallowed so a failed alarm
    /// evaluation cannot crash the notification dispatch path.
    pub fn on_value_changed(&self, context: &OperationContext, new_value: Value) {
        if let Err(e) = self.process_value(context, new_value) {
            error!("Alarm evaluation failed for monitor '{}': {}", self.name, e);
        }
    }

    fn process_value(&self, _context: &OperationContext, new_value: Value) -> Result<()> {
        let value = new_value.as_float().ok_or(UaError::TypeMismatch {
            expected: "float",
            actual: new_value.type_name(),
        })?;

        // The monitored value is stored before any evaluation so a failed
        // pass self-heals on the next notification.
        let previous = {
            let mut held = self.value.lock();
            std::mem::replace(&mut *held, value)
        };
        self.space.set(&self.node_id, Value::Float(value));

        for condition in &self.conditions {
            let mut guard = condition.lock();
            if !guard.variant.reevaluates_unconditionally() && value == previous {
                continue;
            }
            if let Err(e) = self.update_condition(&mut guard, value) {
                error!(
                    "Evaluation of condition {} on monitor '{}' failed: {}",
                    guard.record.node_id, self.name, e
                );
            }
        }
        Ok(())
    }

    /// One update-pipeline pass over a single condition: renew the event
    /// identity, run the variant strategy, recompute retain, refresh the
    /// message and hand a snapshot to the sink when reporting applies.
    fn update_condition(&self, condition: &mut Condition, value: f64) -> Result<()> {
        condition.record.renew_event();
        condition
            .variant
            .evaluate(&self.space, &mut condition.record, value)?;
        condition.record.update_retain();
        condition.record.message =
            LocalizedText::en(format!("{}: state update, value {}", self.name, value));
        self.report(condition);
        Ok(())
    }

    /// Report a snapshot when the record is enabled and someone monitors
    /// events from this source. Disabled records keep their bookkeeping
    /// but stay silent.
    fn report(&self, condition: &Condition) {
        if condition.record.enabled && self.sink.are_events_monitored() {
            let mut snapshot = ConditionSnapshot::of(&condition.record);
            condition.variant.decorate_snapshot(&mut snapshot);
            self.sink.report_event(snapshot);
        }
    }

    /// Enable or disable every condition on this monitor. Re-enabling is a
    /// reported state change; disabling recomputes retain (false) and goes
    /// quiet.
    pub fn set_enabled(&self, enabled: bool) {
        for condition in &self.conditions {
            let mut guard = condition.lock();
            guard.record.set_enable_state(enabled);
            if enabled {
                guard.record.renew_event();
                self.report(&guard);
            }
        }
    }

    /// Dispatch a condition method call.
    ///
    /// Argument contract: `[eventId: Bytes, comment: String]`. Wrong count
    /// or types are rejected with `BadInvalidArgument` before any state is
    /// touched. The event id selects the target condition; a successful
    /// state change stamps the time and reports a snapshot without
    /// regenerating the event id.
    pub fn call_method(
        &self,
        context: &OperationContext,
        method: ConditionMethod,
        args: &[Value],
    ) -> StatusCode {
        let (event_id, comment) = match parse_method_args(args) {
            Ok(parsed) => parsed,
            Err(status) => return status,
        };
        let user = context.user_id();

        for condition in &self.conditions {
            let mut guard = condition.lock();
            let status = match method {
                ConditionMethod::Acknowledge => {
                    methods::acknowledge(&mut guard.record, &event_id, &comment, user)
                }
                ConditionMethod::Confirm => {
                    methods::confirm(&mut guard.record, &event_id, &comment, user)
                }
                ConditionMethod::AddComment => {
                    methods::add_comment(&mut guard.record, &event_id, &comment)
                }
            };
            match status {
                // Not this condition's current event; try the siblings.
                StatusCode::BadEventIdUnknown => continue,
                StatusCode::Good => {
                    guard.record.stamp_time();
                    self.report(&guard);
                    return StatusCode::Good;
                }
                other => return other,
            }
        }
        StatusCode::BadEventIdUnknown
    }
}

fn parse_method_args(args: &[Value]) -> std::result::Result<(Vec<u8>, LocalizedText), StatusCode> {
    if args.len() != 2 {
        return Err(StatusCode::BadInvalidArgument);
    }
    let event_id = args[0]
        .as_bytes()
        .ok_or(StatusCode::BadInvalidArgument)?
        .to_vec();
    let comment = args[1]
        .as_str()
        .map(LocalizedText::en)
        .ok_or(StatusCode::BadInvalidArgument)?;
    Ok((event_id, comment))
}
