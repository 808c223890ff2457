//! Per-field validation failures, surfaced inline at the form boundary.

use std::fmt;

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid,
    OutOfRange,
}

impl FieldErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldErrorKind::Required => "required",
            FieldErrorKind::Invalid => "invalid",
            FieldErrorKind::OutOfRange => "out_of_range",
        }
    }
}

/// One rejected field with an operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

/// Accumulated validation failures for one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// The kind recorded for a field, if it was rejected.
    pub fn kind_of(&self, field: &str) -> Option<FieldErrorKind> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.kind)
    }

    /// Ok when no field was rejected, otherwise the accumulated errors.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, error) in self.errors.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} ({}): {}", error.field, error.kind.as_str(), error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}
