//! Dialog condition: an operator prompt with a fixed pair of response
//! options.
//!
//! The sample semantics are parity-driven: an even-valued input opens the
//! dialog and immediately issues a synthetic response selecting option 0,
//! which per protocol resets the dialog back to inactive — each value
//! change produces one open/close cycle rather than a persisted open
//! dialog. An odd-valued input leaves the dialog inactive with the
//! alternate response index.

use crate::condition::ConditionRecord;
use crate::error::Result;
use crate::status::StatusCode;
use crate::types::{LocalizedText, SEVERITY_MIN};

/// Response index issued when the dialog opens.
const RESPONSE_PRIMARY: i32 = 0;
/// Response index recorded for odd-valued inputs.
const RESPONSE_ALTERNATE: i32 = 1;

/// Dialog condition evaluation state.
#[derive(Debug, Clone)]
pub struct DialogCondition {
    /// Prompt shown to the operator
    pub prompt: LocalizedText,
    /// The two fixed response options
    pub response_options: [LocalizedText; 2],
    /// Whether the dialog is currently open
    pub dialog_active: bool,
    /// Index of the last selected response
    pub last_response: i32,
}

impl DialogCondition {
    /// Dialog with the given prompt and the fixed OK/Cancel option pair.
    pub fn new(prompt: LocalizedText) -> Self {
        Self {
            prompt,
            response_options: [LocalizedText::en("OK"), LocalizedText::en("Cancel")],
            dialog_active: false,
            last_response: RESPONSE_ALTERNATE,
        }
    }

    /// One parity-driven open/close cycle per value change.
    pub fn evaluate(&mut self, record: &mut ConditionRecord, value: f64) -> Result<()> {
        record.severity = SEVERITY_MIN;
        if (value as i64).rem_euclid(2) == 0 {
            self.dialog_active = true;
            // The synthetic response closes the dialog in the same pass.
            self.set_response(RESPONSE_PRIMARY);
        } else {
            self.dialog_active = false;
            self.last_response = RESPONSE_ALTERNATE;
        }
        Ok(())
    }

    /// Select a response option, closing the dialog.
    pub fn set_response(&mut self, selected: i32) -> StatusCode {
        if selected < 0 || selected as usize >= self.response_options.len() {
            return StatusCode::BadInvalidArgument;
        }
        self.last_response = selected;
        self.dialog_active = false;
        StatusCode::Good
    }
}
