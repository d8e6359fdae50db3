//! Small OPC UA-shaped types shared across the monitor layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned when no alarm band is active.
pub const SEVERITY_MIN: u16 = 1;
/// Severity of the Low / High bands and of plain active alarms.
pub const SEVERITY_MEDIUM: u16 = 500;
/// Severity of the LowLow / HighHigh bands.
pub const SEVERITY_MAX: u16 = 1000;

/// Node identifier: namespace index plus a string identifier.
///
/// The monitor layer never parses numeric or GUID identifiers; string ids
/// are enough to address monitored variables, their auxiliary siblings and
/// condition instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index
    pub namespace: u16,
    /// String identifier within the namespace
    pub identifier: String,
}

impl NodeId {
    /// Build a node id from a namespace index and string identifier.
    pub fn new(namespace: u16, identifier: impl Into<String>) -> Self {
        Self {
            namespace,
            identifier: identifier.into(),
        }
    }

    /// Child id derived by appending a browse-path segment.
    pub fn child(&self, segment: &str) -> NodeId {
        NodeId::new(self.namespace, format!("{}.{}", self.identifier, segment))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};s={}", self.namespace, self.identifier)
    }
}

/// Localized text: a locale tag plus the text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Locale tag, e.g. `en`
    pub locale: String,
    /// The text
    pub text: String,
}

impl LocalizedText {
    /// English text.
    pub fn en(text: impl Into<String>) -> Self {
        Self {
            locale: "en".to_string(),
            text: text.into(),
        }
    }

    /// Empty text (no locale).
    pub fn empty() -> Self {
        Self::default()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Per-call context delivered with value-change notifications and method
/// calls. Carries the acting identity; the update pipeline resolves it to
/// an empty user when the host supplies none.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    user_id: Option<String>,
}

impl OperationContext {
    /// Context acting as a named user.
    pub fn with_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Anonymous context.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The acting user id, empty when the host supplied none.
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or("")
    }
}
