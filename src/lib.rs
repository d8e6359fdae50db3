//! UAMON - Alarms & Conditions monitor layer for OPC UA address spaces.
//!
//! UAMON wires OPC UA Part 9 alarm/condition state machines onto monitored
//! variables and reports immutable condition snapshots to an event sink.
//! The host SDK (session transport, secure channel, subscription engine,
//! codecs) stays external: this crate consumes it through narrow
//! interfaces — a value-changed notification entry point, a method
//! dispatch entry point and the [`sink::EventSink`] trait.
//!
//! # Overview
//!
//! A value-changed notification arrives at an [`AlarmMonitor`], which
//! recomputes state on its held condition record per the variant's rule
//! set. If any field changed it stamps a new event identity, updates the
//! retain flag and hands an immutable snapshot to the sink. Acknowledge,
//! Confirm and AddComment arrive as method calls with an event-id
//! argument, validated against the record's current event id before any
//! state is mutated.
//!
//! # Examples
//!
//! ```rust
//! use uamon::{
//!     AlarmMonitor, AddressSpace, OperationContext, Value,
//!     sink::ChannelSink,
//!     variants::limit::Thresholds,
//! };
//!
//! let space = AddressSpace::new();
//! let (sink, mut events) = ChannelSink::new(64);
//! let monitor = AlarmMonitor::exclusive_limit(
//!     &space,
//!     sink,
//!     2,
//!     "Tank1",
//!     "LevelAlarm",
//!     40.0,
//!     Thresholds { low_low: 20.0, low: 30.0, high: 50.0, high_high: 80.0 },
//! )?;
//!
//! monitor.on_value_changed(&OperationContext::anonymous(), Value::Float(85.0));
//! let event = events.try_recv().unwrap();
//! assert_eq!(event.severity, 1000);
//! # Ok::<(), uamon::UaError>(())
//! ```

#![warn(missing_docs)]

// ============================================================================
// CORE MODULES
// ============================================================================

/// Error handling with structured error types
pub mod error;

/// Protocol status vocabulary for condition method results
pub mod status;

/// Value types carried by variables and method arguments
pub mod value;

/// Small OPC UA-shaped shared types
pub mod types;

/// Thread-safe variable storage with late-bound sibling reads
pub mod address_space;

/// Condition state records and event snapshots
pub mod condition;

/// Acknowledge / Confirm / AddComment handlers
pub mod methods;

/// Per-alarm-family evaluation strategies
pub mod variants;

/// Alarm monitors and the update pipeline
pub mod monitor;

/// Monitor registry: write and method dispatch, bulk operations
pub mod registry;

/// YAML monitor declarations
pub mod config;

/// Event reporting sinks
pub mod sink;

/// Client-side bounded enum wrapper
pub mod enum_value;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use address_space::AddressSpace;
pub use condition::{ConditionRecord, ConditionSnapshot};
pub use config::Config;
pub use enum_value::EnumValue;
pub use error::{Result, UaError};
pub use monitor::{AlarmMonitor, Condition, ConditionMethod};
pub use registry::MonitorRegistry;
pub use status::StatusCode;
pub use types::{LocalizedText, NodeId, OperationContext};
pub use value::Value;
pub use variants::ConditionVariant;

/// Crate version from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for binaries and examples that have not configured
/// their own. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("uamon=info"))
        .try_init();
}
