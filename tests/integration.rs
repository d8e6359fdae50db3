//! End-to-end pipeline tests: YAML config -> registry -> value churn ->
//! event snapshots -> condition method calls.

use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use uamon::sink::ChannelSink;
use uamon::variants::limit::LimitBand;
use uamon::{
    ConditionMethod, ConditionSnapshot, Config, MonitorRegistry, NodeId, OperationContext,
    StatusCode, Value,
};

const NS: u16 = 2;

const SAMPLE_CONFIG: &str = r#"
namespace: 2
monitors:
  - name: Tank1
    alarm_name: LevelAlarm
    initial_value: 40.0
    kind: exclusive_limit
    limits: { low_low: 20.0, low: 30.0, high: 50.0, high_high: 80.0 }
  - name: Tank2
    alarm_name: LevelAlarm
    initial_value: 40.0
    kind: non_exclusive_limit
    limits: { low_low: 20.0, low: 30.0, high: 50.0, high_high: 80.0 }
  - name: Valve1
    alarm_name: OffNormalAlarm
    initial_value: 10.0
    kind: off_normal
    normal_value: 10.0
  - name: Motor1
    alarm_name: DiscreteAlarm
    initial_value: 1.0
    kind: discrete
    allowed: [0, 1, 2]
  - name: Operator
    alarm_name: Dialog
    kind: dialog
    prompt: "Proceed with restart?"
  - name: Belt1
    alarm_name: DiscrepancyAlarm
    initial_value: 1.0
    kind: discrepancy
    expected_value: 1.0
"#;

fn build() -> (MonitorRegistry, Receiver<ConditionSnapshot>) {
    let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
    let (sink, rx) = ChannelSink::new(256);
    let registry = MonitorRegistry::from_config(&config, sink).unwrap();
    (registry, rx)
}

fn drain(rx: &mut Receiver<ConditionSnapshot>) -> Vec<ConditionSnapshot> {
    let mut out = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        out.push(snapshot);
    }
    out
}

fn events_for<'a>(
    events: &'a [ConditionSnapshot],
    source: &str,
) -> Vec<&'a ConditionSnapshot> {
    events.iter().filter(|e| e.source_name == source).collect()
}

#[test]
fn exclusive_limit_walks_the_ladder() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();
    let tank = NodeId::new(NS, "Tank1");

    registry.write_value(&ctx, &tank, Value::Float(85.0)).unwrap();
    let events = drain(&mut rx);
    let tank_events = events_for(&events, "Tank1");
    assert_eq!(tank_events.len(), 1);
    let event = tank_events[0];
    assert_eq!(event.limit_band, Some(LimitBand::HighHigh));
    assert_eq!(event.active, Some(true));
    assert!(!event.acked);
    assert!(event.retain);
    assert_eq!(event.severity, 1000);

    registry.write_value(&ctx, &tank, Value::Float(55.0)).unwrap();
    registry.write_value(&ctx, &tank, Value::Float(40.0)).unwrap();
    registry.write_value(&ctx, &tank, Value::Float(25.0)).unwrap();
    registry.write_value(&ctx, &tank, Value::Float(5.0)).unwrap();
    let events = drain(&mut rx);
    let bands: Vec<_> = events_for(&events, "Tank1")
        .iter()
        .map(|e| e.limit_band.unwrap())
        .collect();
    assert_eq!(
        bands,
        vec![LimitBand::High, LimitBand::Inactive, LimitBand::Low, LimitBand::LowLow]
    );
    let severities: Vec<_> = events_for(&events, "Tank1").iter().map(|e| e.severity).collect();
    assert_eq!(severities, vec![500, 1, 500, 1000]);
}

#[test]
fn non_exclusive_high_asserts_both_flags() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();

    registry
        .write_value(&ctx, &NodeId::new(NS, "Tank2"), Value::Float(55.0))
        .unwrap();
    let events = drain(&mut rx);
    let flags = events_for(&events, "Tank2")[0].limit_flags.unwrap();
    assert!(flags.high && flags.high_high);
    assert!(!flags.low && !flags.low_low);

    registry
        .write_value(&ctx, &NodeId::new(NS, "Tank2"), Value::Float(10.0))
        .unwrap();
    let events = drain(&mut rx);
    let flags = events_for(&events, "Tank2")[0].limit_flags.unwrap();
    assert!(flags.low_low);
    assert!(!flags.low && !flags.high && !flags.high_high);
}

#[test]
fn off_normal_gates_on_change_and_compares_live_normal() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();
    let valve = NodeId::new(NS, "Valve1");

    // Unchanged value: the off-normal family does not re-evaluate.
    registry.write_value(&ctx, &valve, Value::Float(10.0)).unwrap();
    assert!(events_for(&drain(&mut rx), "Valve1").is_empty());

    registry.write_value(&ctx, &valve, Value::Float(11.0)).unwrap();
    let events = drain(&mut rx);
    let event = events_for(&events, "Valve1")[0];
    assert_eq!(event.active, Some(true));
    assert!(event.retain);

    // Moving the normal-value sibling changes the next comparison.
    registry
        .write_value(&ctx, &NodeId::new(NS, "Valve1.NormalValue"), Value::Float(11.0))
        .unwrap();
    assert!(drain(&mut rx).is_empty(), "aux writes are plain stores, no event");
    registry.write_value(&ctx, &valve, Value::Float(11.5)).unwrap();
    registry.write_value(&ctx, &valve, Value::Float(11.0)).unwrap();
    let events = drain(&mut rx);
    let last = events_for(&events, "Valve1").last().copied().unwrap().clone();
    assert_eq!(last.active, Some(false), "back at the (new) normal value");
}

#[test]
fn discrete_alarm_fires_outside_the_allowed_set() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();
    let motor = NodeId::new(NS, "Motor1");

    registry.write_value(&ctx, &motor, Value::Float(2.0)).unwrap();
    let events = drain(&mut rx);
    assert_eq!(events_for(&events, "Motor1")[0].active, Some(false));

    registry.write_value(&ctx, &motor, Value::Float(7.0)).unwrap();
    let events = drain(&mut rx);
    assert_eq!(events_for(&events, "Motor1")[0].active, Some(true));
}

#[test]
fn dialog_cycles_on_even_inputs() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();
    let operator = NodeId::new(NS, "Operator");

    // Even input: open then immediately closed by the synthetic response.
    registry.write_value(&ctx, &operator, Value::Float(4.0)).unwrap();
    let events = drain(&mut rx);
    let event = events_for(&events, "Operator")[0];
    assert_eq!(event.dialog_response, Some(0));
    assert_eq!(event.active, None, "dialogs have no active notion");
    assert!(event.retain, "no active notion: retained while enabled");

    registry.write_value(&ctx, &operator, Value::Float(3.0)).unwrap();
    let events = drain(&mut rx);
    assert_eq!(events_for(&events, "Operator")[0].dialog_response, Some(1));
}

#[test]
fn acknowledge_confirm_lifecycle_via_method_dispatch() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::with_user("operator1");
    let condition_id = NodeId::new(NS, "Tank1.LevelAlarm");

    registry
        .write_value(&ctx, &NodeId::new(NS, "Tank1"), Value::Float(85.0))
        .unwrap();
    let alarm = events_for(&drain(&mut rx), "Tank1")[0].clone();
    assert!(!alarm.acked);

    let args = vec![
        Value::Bytes(alarm.event_id.clone()),
        Value::String("seen it".into()),
    ];

    assert_eq!(
        registry.call_method(&ctx, &condition_id, ConditionMethod::Acknowledge, &args),
        StatusCode::Good
    );
    assert_eq!(
        registry.call_method(&ctx, &condition_id, ConditionMethod::Acknowledge, &args),
        StatusCode::BadConditionBranchAlreadyAcked,
        "the ack does not regenerate the event id, so the stale call is detected as already-acked"
    );

    // The ack re-armed the confirm cycle; same id confirms once.
    assert_eq!(
        registry.call_method(&ctx, &condition_id, ConditionMethod::Confirm, &args),
        StatusCode::Good
    );
    assert_eq!(
        registry.call_method(&ctx, &condition_id, ConditionMethod::Confirm, &args),
        StatusCode::BadConditionBranchAlreadyConfirmed
    );

    // Both state changes were reported under the original event id.
    let method_events = drain(&mut rx);
    let tank_events = events_for(&method_events, "Tank1");
    assert_eq!(tank_events.len(), 2);
    assert!(tank_events.iter().all(|e| e.event_id == alarm.event_id));
    assert!(tank_events[0].acked);
    assert!(tank_events[1].confirmed);
    assert_eq!(tank_events[0].comment, "seen it");
}

#[test]
fn stale_event_id_is_rejected_after_a_new_state_change() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();
    let tank = NodeId::new(NS, "Tank1");
    let condition_id = NodeId::new(NS, "Tank1.LevelAlarm");

    registry.write_value(&ctx, &tank, Value::Float(85.0)).unwrap();
    let first = events_for(&drain(&mut rx), "Tank1")[0].clone();

    // A new band transition renews the event id.
    registry.write_value(&ctx, &tank, Value::Float(55.0)).unwrap();
    drain(&mut rx);

    let stale_args = vec![Value::Bytes(first.event_id), Value::String("late".into())];
    assert_eq!(
        registry.call_method(&ctx, &condition_id, ConditionMethod::Acknowledge, &stale_args),
        StatusCode::BadEventIdUnknown
    );
}

#[test]
fn add_comment_requires_an_instance_node() {
    let (registry, _rx) = build();
    let ctx = OperationContext::anonymous();
    let args = vec![Value::Bytes(vec![0; 16]), Value::String("note".into())];

    assert_eq!(
        registry.call_method(
            &ctx,
            &NodeId::new(0, "AcknowledgeableConditionType"),
            ConditionMethod::AddComment,
            &args
        ),
        StatusCode::BadNodeIdInvalid
    );
}

#[test]
fn disable_all_silences_reporting_and_reenable_reports() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();

    registry.disable_all();
    drain(&mut rx);

    registry
        .write_value(&ctx, &NodeId::new(NS, "Tank1"), Value::Float(85.0))
        .unwrap();
    assert!(drain(&mut rx).is_empty(), "disabled conditions stay silent");

    // Bookkeeping continued: the alarm is active underneath.
    registry.enable_all();
    let events = drain(&mut rx);
    let tank = events_for(&events, "Tank1")[0];
    assert_eq!(tank.active, Some(true));
    assert!(tank.retain);
}

#[test]
fn change_all_values_exercises_every_monitor() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();

    registry.change_all_values(&ctx, 1.0);
    let events = drain(&mut rx);
    // Every family with a changed value evaluates; the limit monitors at
    // 41.0 stay in band (no transition for the non-exclusive flags, but
    // the exclusive family still re-evaluates and reports).
    assert!(!events_for(&events, "Valve1").is_empty());
    assert!(!events_for(&events, "Operator").is_empty());
    assert_eq!(registry.monitors()[0].value(), 41.0);

    // Walk Tank1 into the High band step by step.
    for _ in 0..10 {
        registry.change_all_values(&ctx, 1.0);
    }
    let events = drain(&mut rx);
    let last_band = events_for(&events, "Tank1").last().copied().unwrap().limit_band;
    assert_eq!(last_band, Some(LimitBand::High), "51.0 is in the High band");
}

#[test]
fn snapshots_serialize_for_export() {
    let (registry, mut rx) = build();
    let ctx = OperationContext::anonymous();

    registry
        .write_value(&ctx, &NodeId::new(NS, "Tank1"), Value::Float(85.0))
        .unwrap();
    let event = events_for(&drain(&mut rx), "Tank1")[0].clone();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["severity"], 1000);
    assert_eq!(json["limit_band"], "HighHigh");
    assert!(json["branch_id"].is_null());
}
