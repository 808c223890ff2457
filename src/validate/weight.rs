//! Weight schedule validation.

use crate::domain::{TimeWindow, WeightConfig, weight::parse_wall_time};

use super::error::{FieldErrorKind, FieldErrors};

pub const WEIGHT_MIN: i32 = 0;
pub const WEIGHT_MAX: i32 = 100;

/// One operator-supplied time window, times as `HH:MM[:SS]` strings.
#[derive(Debug, Clone)]
pub struct WindowDraft {
    pub start: String,
    pub end: String,
    pub weight: i32,
}

/// Operator-supplied weight schedule draft.
#[derive(Debug, Clone)]
pub struct WeightDraft {
    pub default_weight: i32,
    pub windows: Vec<WindowDraft>,
}

/// Validate a weight draft: weights within range, each window strictly
/// `start < end`.
///
/// Windows are allowed to overlap: evaluation is last-window-wins, so
/// their order is preserved as supplied.
pub fn validate_weight_draft(draft: &WeightDraft) -> Result<WeightConfig, FieldErrors> {
    let mut errors = FieldErrors::new();

    if !(WEIGHT_MIN..=WEIGHT_MAX).contains(&draft.default_weight) {
        errors.push(
            "default",
            FieldErrorKind::OutOfRange,
            format!(
                "default weight {} outside {WEIGHT_MIN}..={WEIGHT_MAX}",
                draft.default_weight
            ),
        );
    }

    let mut time_windows = Vec::with_capacity(draft.windows.len());
    for (position, window) in draft.windows.iter().enumerate() {
        if !(WEIGHT_MIN..=WEIGHT_MAX).contains(&window.weight) {
            errors.push(
                "time_windows",
                FieldErrorKind::OutOfRange,
                format!(
                    "window {position}: weight {} outside {WEIGHT_MIN}..={WEIGHT_MAX}",
                    window.weight
                ),
            );
        }
        let start = match parse_wall_time(&window.start) {
            Ok(start) => Some(start),
            Err(err) => {
                errors.push(
                    "time_windows",
                    FieldErrorKind::Invalid,
                    format!("window {position}: {err}"),
                );
                None
            }
        };
        let end = match parse_wall_time(&window.end) {
            Ok(end) => Some(end),
            Err(err) => {
                errors.push(
                    "time_windows",
                    FieldErrorKind::Invalid,
                    format!("window {position}: {err}"),
                );
                None
            }
        };
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.push(
                    "time_windows",
                    FieldErrorKind::Invalid,
                    format!("window {position}: start must come before end"),
                );
            } else {
                time_windows.push(TimeWindow {
                    start,
                    end,
                    weight: window.weight,
                });
            }
        }
    }

    errors.into_result()?;
    Ok(WeightConfig {
        default_weight: draft.default_weight,
        time_windows,
    })
}
