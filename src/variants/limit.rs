//! Limit alarm evaluation: the shared threshold ladder in exclusive and
//! non-exclusive flavors, with level, deviation and rate-of-change input
//! selection.
//!
//! The ladder is evaluated high-to-low priority with non-overlapping
//! bands:
//!
//! ```text
//! value <= low_low                 -> LowLow   (highest severity)
//! low_low < value <= low           -> Low
//! value >= high_high               -> HighHigh
//! high <= value < high_high        -> High
//! low < value < high               -> Inactive (lowest severity)
//! ```

use crate::address_space::AddressSpace;
use crate::condition::ConditionRecord;
use crate::error::{Result, UaError};
use crate::types::{NodeId, SEVERITY_MAX, SEVERITY_MEDIUM, SEVERITY_MIN};
use serde::{Deserialize, Serialize};

/// Exclusive limit band. Exactly one band is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitBand {
    /// Value inside the normal band
    Inactive,
    /// Value at or below the low limit
    Low,
    /// Value at or below the low-low limit
    LowLow,
    /// Value at or above the high limit
    High,
    /// Value at or above the high-high limit
    HighHigh,
}

impl LimitBand {
    /// Severity assigned to this band: extremes for LowLow/HighHigh,
    /// medium for Low/High, minimum when inactive.
    pub fn severity(self) -> u16 {
        match self {
            LimitBand::Inactive => SEVERITY_MIN,
            LimitBand::Low | LimitBand::High => SEVERITY_MEDIUM,
            LimitBand::LowLow | LimitBand::HighHigh => SEVERITY_MAX,
        }
    }
}

/// Non-exclusive limit flags: independently toggleable band booleans that
/// must be reconciled after every transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitFlags {
    /// LowLow band asserted
    pub low_low: bool,
    /// Low band asserted
    pub low: bool,
    /// High band asserted
    pub high: bool,
    /// HighHigh band asserted
    pub high_high: bool,
}

impl LimitFlags {
    fn from_band(band: LimitBand) -> Self {
        let mut flags = LimitFlags::default();
        match band {
            LimitBand::Inactive => {}
            LimitBand::Low => flags.low = true,
            LimitBand::LowLow => flags.low_low = true,
            LimitBand::High => flags.high = true,
            LimitBand::HighHigh => flags.high_high = true,
        }
        flags
    }
}

/// Reconcile non-exclusive flags after a transition. This pass is part of
/// the transition itself, never skipped:
/// - LowLow asserted clears Low, High and HighHigh;
/// - any of High/HighHigh asserted forces both true and clears the lows.
pub fn reconcile(flags: &mut LimitFlags) {
    if flags.low_low {
        flags.low = false;
        flags.high = false;
        flags.high_high = false;
    } else if flags.high || flags.high_high {
        flags.high = true;
        flags.high_high = true;
        flags.low = false;
        flags.low_low = false;
    }
}

/// The four limit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// LowLow limit
    pub low_low: f64,
    /// Low limit
    pub low: f64,
    /// High limit
    pub high: f64,
    /// HighHigh limit
    pub high_high: f64,
}

impl Thresholds {
    /// Check the limits are ordered so the ladder bands cannot overlap.
    pub fn validate(&self) -> Result<()> {
        if self.low_low <= self.low && self.low < self.high && self.high <= self.high_high {
            Ok(())
        } else {
            Err(UaError::Config(format!(
                "limit thresholds out of order: lowLow={} low={} high={} highHigh={}",
                self.low_low, self.low, self.high, self.high_high
            )))
        }
    }

    /// Classify a value into its ladder band.
    pub fn classify(&self, value: f64) -> LimitBand {
        if value <= self.low_low {
            LimitBand::LowLow
        } else if value <= self.low {
            LimitBand::Low
        } else if value >= self.high_high {
            LimitBand::HighHigh
        } else if value >= self.high {
            LimitBand::High
        } else {
            LimitBand::Inactive
        }
    }
}

/// How the ladder input is derived from the monitored value.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitKind {
    /// Ladder applied to the raw value
    Level,
    /// Ladder applied to the deviation from a setpoint node's live value
    Deviation {
        /// Setpoint variable read at comparison time, never cached
        setpoint_node: NodeId,
    },
    /// Ladder applied to the change between successive notifications
    RateOfChange,
}

/// Whether one band or independent band flags are tracked.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitStyle {
    /// Single current band; transitioning to any band implicitly clears
    /// the others
    Exclusive {
        /// Current band
        band: LimitBand,
    },
    /// Independent band flags, reconciled after every transition
    NonExclusive {
        /// Current flags
        flags: LimitFlags,
    },
}

/// Limit alarm evaluation state.
#[derive(Debug, Clone)]
pub struct LimitAlarm {
    /// Input selection
    pub kind: LimitKind,
    /// Ladder thresholds
    pub thresholds: Thresholds,
    /// Exclusive or non-exclusive tracking
    pub style: LimitStyle,
    last_value: f64,
}

impl LimitAlarm {
    /// Create limit evaluation state seeded with the monitor's initial
    /// value (the rate-of-change baseline).
    pub fn new(kind: LimitKind, thresholds: Thresholds, style: LimitStyle, initial: f64) -> Self {
        Self {
            kind,
            thresholds,
            style,
            last_value: initial,
        }
    }

    /// Exclusive band, if tracked.
    pub fn band(&self) -> Option<LimitBand> {
        match &self.style {
            LimitStyle::Exclusive { band } => Some(*band),
            LimitStyle::NonExclusive { .. } => None,
        }
    }

    /// Non-exclusive flags, if tracked.
    pub fn flags(&self) -> Option<LimitFlags> {
        match &self.style {
            LimitStyle::Exclusive { .. } => None,
            LimitStyle::NonExclusive { flags } => Some(*flags),
        }
    }

    /// Evaluate the ladder for a new monitored value.
    ///
    /// On every limit change: `active = !(low < input < high)`, the
    /// acknowledgement is force-reset (re-arm on re-trigger) and severity
    /// is assigned per band.
    pub fn evaluate(
        &mut self,
        space: &AddressSpace,
        record: &mut ConditionRecord,
        value: f64,
    ) -> Result<()> {
        let input = match &self.kind {
            LimitKind::Level => value,
            LimitKind::Deviation { setpoint_node } => value - space.get_float(setpoint_node)?,
            LimitKind::RateOfChange => value - self.last_value,
        };
        self.last_value = value;

        let band = self.thresholds.classify(input);
        let changed = match &mut self.style {
            LimitStyle::Exclusive { band: current } => {
                let changed = *current != band;
                *current = band;
                changed
            }
            LimitStyle::NonExclusive { flags } => {
                let mut next = LimitFlags::from_band(band);
                reconcile(&mut next);
                let changed = *flags != next;
                *flags = next;
                changed
            }
        };

        if changed {
            record.active = band != LimitBand::Inactive;
            record.acked = false;
            record.severity = band.severity();
        }
        Ok(())
    }
}
