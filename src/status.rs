//! Protocol status vocabulary returned from condition method handlers.
//!
//! These mirror the fixed OPC UA status codes the Acknowledge / Confirm /
//! AddComment handlers are allowed to surface. They are deliberately a
//! closed enum rather than raw `u32` codes: the monitor layer never invents
//! new statuses at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a condition method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// Operation succeeded
    Good,

    /// Wrong argument count or argument type
    BadInvalidArgument,

    /// Supplied event id does not match the record's current event id
    BadEventIdUnknown,

    /// The condition branch is already acknowledged
    BadConditionBranchAlreadyAcked,

    /// The condition branch is already confirmed
    BadConditionBranchAlreadyConfirmed,

    /// The node id does not refer to a condition instance
    BadNodeIdInvalid,
}

impl StatusCode {
    /// Whether the call succeeded.
    pub fn is_good(self) -> bool {
        self == StatusCode::Good
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Good => "Good",
            StatusCode::BadInvalidArgument => "BadInvalidArgument",
            StatusCode::BadEventIdUnknown => "BadEventIdUnknown",
            StatusCode::BadConditionBranchAlreadyAcked => "BadConditionBranchAlreadyAcked",
            StatusCode::BadConditionBranchAlreadyConfirmed => "BadConditionBranchAlreadyConfirmed",
            StatusCode::BadNodeIdInvalid => "BadNodeIdInvalid",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_is_good() {
        assert!(StatusCode::Good.is_good());
        assert!(!StatusCode::BadEventIdUnknown.is_good());
    }

    #[test]
    fn display_matches_protocol_names() {
        assert_eq!(
            StatusCode::BadConditionBranchAlreadyAcked.to_string(),
            "BadConditionBranchAlreadyAcked"
        );
    }
}
