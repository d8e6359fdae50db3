//! Condition method handlers: Acknowledge, Confirm, AddComment.
//!
//! These are free functions over a [`ConditionRecord`] plus an explicit
//! event id, so any monitor (or test) can invoke them without coupling to
//! a concrete monitor type. Every handler validates the supplied event id
//! byte-for-byte against the record's current token before touching any
//! state; a stale or unknown id is rejected regardless of the other
//! arguments.
//!
//! Protocol-contract violations surface as [`StatusCode`] values, never as
//! errors or panics.

use crate::condition::ConditionRecord;
use crate::status::StatusCode;
use crate::types::LocalizedText;
use log::info;

/// Acknowledge the condition identified by `event_id`.
///
/// Rejected with [`StatusCode::BadEventIdUnknown`] on an id mismatch and
/// [`StatusCode::BadConditionBranchAlreadyAcked`] when already
/// acknowledged. On success the record is acknowledged, `retain` drops to
/// false, the confirm cycle re-arms and the message records the acting
/// user.
pub fn acknowledge(
    record: &mut ConditionRecord,
    event_id: &[u8],
    comment: &LocalizedText,
    user_id: &str,
) -> StatusCode {
    if event_id != record.event_id.as_slice() {
        return StatusCode::BadEventIdUnknown;
    }
    if record.acked {
        return StatusCode::BadConditionBranchAlreadyAcked;
    }

    record.acked = true;
    record.confirmed = false;
    record.retain = false;
    record.message = ack_message("acknowledged", user_id);
    apply_comment(record, comment);
    info!("Condition {} acknowledged by '{}'", record.node_id, user_id);
    StatusCode::Good
}

/// Confirm the condition identified by `event_id`.
///
/// Symmetric to [`acknowledge`], gated on the confirmed flag and rejected
/// with [`StatusCode::BadConditionBranchAlreadyConfirmed`] when already
/// confirmed.
pub fn confirm(
    record: &mut ConditionRecord,
    event_id: &[u8],
    comment: &LocalizedText,
    user_id: &str,
) -> StatusCode {
    if event_id != record.event_id.as_slice() {
        return StatusCode::BadEventIdUnknown;
    }
    if record.confirmed {
        return StatusCode::BadConditionBranchAlreadyConfirmed;
    }

    record.confirmed = true;
    record.retain = false;
    record.message = ack_message("confirmed", user_id);
    apply_comment(record, comment);
    info!("Condition {} confirmed by '{}'", record.node_id, user_id);
    StatusCode::Good
}

/// Attach a comment to the condition identified by `event_id`.
///
/// The comment is updated only when the text differs; repeating the same
/// comment is an idempotent no-op that still returns
/// [`StatusCode::Good`].
pub fn add_comment(
    record: &mut ConditionRecord,
    event_id: &[u8],
    comment: &LocalizedText,
) -> StatusCode {
    if event_id != record.event_id.as_slice() {
        return StatusCode::BadEventIdUnknown;
    }
    apply_comment(record, comment);
    StatusCode::Good
}

fn apply_comment(record: &mut ConditionRecord, comment: &LocalizedText) {
    if record.comment.text != comment.text {
        record.comment = comment.clone();
    }
}

fn ack_message(verb: &str, user_id: &str) -> LocalizedText {
    if user_id.is_empty() {
        LocalizedText::en(format!("Condition {}", verb))
    } else {
        LocalizedText::en(format!("Condition {} by {}", verb, user_id))
    }
}
