//! Monitor registry: the node-manager-role collaborator that owns the
//! address space, routes value writes and condition method calls, and
//! carries the bulk test tooling (enable/disable all, value churn).

use crate::address_space::AddressSpace;
use crate::config::{Config, MonitorKind};
use crate::error::{Result, UaError};
use crate::monitor::{AlarmMonitor, Condition, ConditionMethod};
use crate::sink::EventSink;
use crate::status::StatusCode;
use crate::types::{LocalizedText, NodeId, OperationContext};
use crate::value::Value;
use log::info;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the alarm monitors and dispatches host traffic to them.
pub struct MonitorRegistry {
    space: AddressSpace,
    sink: Arc<dyn EventSink>,
    monitors: Vec<Arc<AlarmMonitor>>,
    by_variable: HashMap<NodeId, Arc<AlarmMonitor>>,
    by_condition: HashMap<NodeId, Arc<AlarmMonitor>>,
}

impl MonitorRegistry {
    /// Empty registry over a fresh address space.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            space: AddressSpace::new(),
            sink,
            monitors: Vec::new(),
            by_variable: HashMap::new(),
            by_condition: HashMap::new(),
        }
    }

    /// Build a registry with one monitor per configuration entry.
    pub fn from_config(config: &Config, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        let mut registry = Self::new(sink);
        for entry in &config.monitors {
            let monitor = registry.build_monitor(config.namespace, entry)?;
            registry.register(monitor);
        }
        info!("Registered {} alarm monitors from config", registry.monitors.len());
        Ok(registry)
    }

    fn build_monitor(
        &self,
        namespace: u16,
        entry: &crate::config::MonitorConfig,
    ) -> Result<Arc<AlarmMonitor>> {
        let space = &self.space;
        let sink = self.sink.clone();
        let name = entry.name.as_str();
        let alarm = entry.alarm_name.as_str();
        let initial = entry.initial_value;

        let monitor = match &entry.kind {
            MonitorKind::ExclusiveLimit { limits } => AlarmMonitor::exclusive_limit(
                space, sink, namespace, name, alarm, initial, limits.thresholds(),
            )?,
            MonitorKind::NonExclusiveLimit { limits } => AlarmMonitor::non_exclusive_limit(
                space, sink, namespace, name, alarm, initial, limits.thresholds(),
            )?,
            MonitorKind::Deviation { limits, setpoint } => AlarmMonitor::deviation(
                space, sink, namespace, name, alarm, initial, *setpoint, limits.thresholds(),
            )?,
            MonitorKind::RateOfChange { limits } => AlarmMonitor::rate_of_change(
                space, sink, namespace, name, alarm, initial, limits.thresholds(),
            )?,
            MonitorKind::OffNormal { normal_value, kind } => AlarmMonitor::off_normal(
                space, sink, namespace, name, alarm, initial, *normal_value, *kind,
            ),
            MonitorKind::Discrete { allowed } => AlarmMonitor::discrete(
                space, sink, namespace, name, alarm, initial, allowed.clone(),
            ),
            MonitorKind::Dialog { prompt } => AlarmMonitor::dialog(
                space, sink, namespace, name, alarm, initial, LocalizedText::en(prompt.clone()),
            ),
            MonitorKind::Discrepancy { expected_value } => AlarmMonitor::discrepancy(
                space, sink, namespace, name, alarm, initial, *expected_value,
            ),
            MonitorKind::Acknowledgeable => AlarmMonitor::acknowledgeable(
                space, sink, namespace, name, alarm, initial,
            ),
        };
        Ok(monitor)
    }

    /// Register a monitor built against this registry's address space.
    pub fn register(&mut self, monitor: Arc<AlarmMonitor>) {
        self.by_variable.insert(monitor.node_id().clone(), monitor.clone());
        for condition in monitor.condition_states() {
            let id = condition.lock().record.node_id.clone();
            self.by_condition.insert(id, monitor.clone());
        }
        self.monitors.push(monitor);
    }

    /// The shared address space.
    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// The registered monitors.
    pub fn monitors(&self) -> &[Arc<AlarmMonitor>] {
        &self.monitors
    }

    /// All condition states across all monitors, for bulk iteration.
    pub fn condition_states(&self) -> Vec<Arc<Mutex<Condition>>> {
        self.monitors
            .iter()
            .flat_map(|m| m.condition_states())
            .collect()
    }

    /// Write a value to a node.
    ///
    /// A monitored variable runs its monitor's update pipeline; auxiliary
    /// variables (normal values, setpoints) are plain stores whose effect
    /// shows up on the next late-bound read.
    pub fn write_value(
        &self,
        context: &OperationContext,
        node_id: &NodeId,
        value: Value,
    ) -> Result<()> {
        if let Some(monitor) = self.by_variable.get(node_id) {
            monitor.on_value_changed(context, value);
            Ok(())
        } else if self.space.contains(node_id) {
            self.space.set(node_id, value);
            Ok(())
        } else {
            Err(UaError::NodeNotFound(node_id.to_string()))
        }
    }

    /// Dispatch a condition method call by condition node id.
    ///
    /// A node id that does not name a condition instance — including the
    /// condition type nodes themselves — is rejected with
    /// `BadNodeIdInvalid`. This is a deliberate guard, not an oversight.
    pub fn call_method(
        &self,
        context: &OperationContext,
        condition_id: &NodeId,
        method: ConditionMethod,
        args: &[Value],
    ) -> StatusCode {
        match self.by_condition.get(condition_id) {
            Some(monitor) => monitor.call_method(context, method, args),
            None => StatusCode::BadNodeIdInvalid,
        }
    }

    /// Enable every condition on every monitor.
    pub fn enable_all(&self) {
        for monitor in &self.monitors {
            monitor.set_enabled(true);
        }
    }

    /// Disable every condition on every monitor.
    pub fn disable_all(&self) {
        for monitor in &self.monitors {
            monitor.set_enabled(false);
        }
    }

    /// Bulk value churn: bump every monitored value by `step` and run each
    /// pipeline. Mirrors the sample server's cyclic all-alarms exerciser.
    pub fn change_all_values(&self, context: &OperationContext, step: f64) {
        for monitor in &self.monitors {
            let next = monitor.value() + step;
            monitor.on_value_changed(context, Value::Float(next));
        }
    }
}
