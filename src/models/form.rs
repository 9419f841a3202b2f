//! Form field errors
//!
//! Validation failures are reported per field so a rejected form can be
//! rendered again with each message next to its input.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Message for a required field left empty
pub const REQUIRED_FIELD: &str = "Обязательное поле.";

/// Field name to messages, in field-name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-error shorthand
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Take over every message recorded in `other`
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Record `REQUIRED_FIELD` when `value` is blank; returns whether it was
    pub fn require(&mut self, field: &str, value: &str) -> bool {
        let blank = value.trim().is_empty();
        if blank {
            self.add(field, REQUIRED_FIELD);
        }
        blank
    }

    /// Record a length error when `value` has more than `limit` characters
    pub fn max_length(&mut self, field: &str, value: &str, limit: usize) -> bool {
        let length = value.chars().count();
        let too_long = length > limit;
        if too_long {
            self.add(
                field,
                format!(
                    "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
                    limit, length
                ),
            );
        }
        too_long
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
