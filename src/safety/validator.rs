//! Request message validation.

use crate::error::InputError;

/// Default maximum message size in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 32 * 1024;

/// Input validator applied before any pipeline stage runs.
#[derive(Debug, Clone)]
pub struct Validator {
    max_length: usize,
}

impl Validator {
    /// Create a new validator with default settings.
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Validate a request message.
    pub fn validate(&self, input: &str) -> Result<(), InputError> {
        if input.trim().is_empty() {
            return Err(InputError::EmptyMessage);
        }
        if input.len() > self.max_length {
            return Err(InputError::TooLong {
                length: input.len(),
                max: self.max_length,
            });
        }
        if input.contains('\0') {
            return Err(InputError::NullBytes);
        }

        if has_excessive_repetition(input) {
            tracing::warn!(length = input.len(), "Message has excessive character repetition");
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// More than 20 identical characters in a row.
fn has_excessive_repetition(s: &str) -> bool {
    if s.len() < 50 {
        return false;
    }

    let mut run = 0usize;
    let mut prev = None;
    for c in s.chars() {
        if Some(c) == prev {
            run += 1;
            if run > 20 {
                return true;
            }
        } else {
            run = 1;
            prev = Some(c);
        }
    }
    false
}
