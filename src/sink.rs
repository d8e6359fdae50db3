//! Event reporting sinks.
//!
//! The core hands immutable [`ConditionSnapshot`]s to an [`EventSink`] and
//! never waits on the result; delivery is fire-and-forget. The
//! `are_events_monitored` gate lets the update pipeline skip snapshot
//! construction entirely when nobody subscribes.

use crate::condition::ConditionSnapshot;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Accepts condition snapshots and forwards them to subscribers.
pub trait EventSink: Send + Sync {
    /// Whether any subscriber currently monitors events from this source.
    fn are_events_monitored(&self) -> bool;

    /// Forward a snapshot. Must not block.
    fn report_event(&self, snapshot: ConditionSnapshot);
}

/// Sink with no subscribers; snapshots are never built for it.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn are_events_monitored(&self) -> bool {
        false
    }

    fn report_event(&self, _snapshot: ConditionSnapshot) {}
}

/// Bounded-channel sink delivering snapshots to an async consumer.
///
/// # Examples
///
/// ```rust
/// use uamon::sink::{ChannelSink, EventSink};
///
/// let (sink, mut rx) = ChannelSink::new(64);
/// assert!(sink.are_events_monitored());
/// ```
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<ConditionSnapshot>,
}

impl ChannelSink {
    /// Create a sink and the receiving end for its subscriber.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<ConditionSnapshot>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(Self { tx }), rx)
    }
}

impl EventSink for ChannelSink {
    fn are_events_monitored(&self) -> bool {
        !self.tx.is_closed()
    }

    fn report_event(&self, snapshot: ConditionSnapshot) {
        debug!(
            "Reporting event from '{}' severity {}",
            snapshot.source_name, snapshot.severity
        );
        // Fire-and-forget: a full or closed channel drops the event rather
        // than stalling the notification dispatch path.
        if let Err(e) = self.tx.try_send(snapshot) {
            warn!("Event snapshot dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionRecord;
    use crate::types::NodeId;

    fn snapshot() -> ConditionSnapshot {
        let record = ConditionRecord::new(
            NodeId::new(2, "Alarms.T1.Limit"),
            NodeId::new(2, "Alarms.T1"),
            "T1",
            true,
        );
        ConditionSnapshot::of(&record)
    }

    #[test]
    fn null_sink_is_not_monitored() {
        assert!(!NullSink.are_events_monitored());
    }

    #[test]
    fn channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::new(4);
        assert!(sink.are_events_monitored());
        sink.report_event(snapshot());
        let got = rx.try_recv().unwrap();
        assert_eq!(got.source_name, "T1");
    }

    #[test]
    fn dropped_receiver_stops_monitoring() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);
        assert!(!sink.are_events_monitored());
        // Reporting anyway must not panic.
        sink.report_event(snapshot());
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (sink, _rx) = ChannelSink::new(1);
        sink.report_event(snapshot());
        sink.report_event(snapshot());
    }
}
