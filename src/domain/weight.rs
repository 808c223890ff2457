//! Scheduling weights, optionally windowed by time of day.

use serde::Serialize;
use subdesk_api_types::{PlatformWeightResp, TimeWeightEntry, WeightConfigPayload};
use time::Time;
use time::macros::format_description;

use super::error::DomainError;

const WALL_TIME_LONG: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
const WALL_TIME_SHORT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]");

/// Parse a `HH:MM:SS` (or `HH:MM`) wall-clock time from the wire.
pub fn parse_wall_time(value: &str) -> Result<Time, DomainError> {
    Time::parse(value, WALL_TIME_LONG)
        .or_else(|_| Time::parse(value, WALL_TIME_SHORT))
        .map_err(|_| DomainError::validation(format!("`{value}` is not a HH:MM[:SS] time")))
}

/// Render a wall-clock time as the wire's `HH:MM:SS` form.
pub fn format_wall_time(value: Time) -> String {
    value
        .format(WALL_TIME_LONG)
        .unwrap_or_else(|_| value.to_string())
}

/// One operator-supplied scheduling window.
///
/// Windows may overlap; when they do, the last matching window wins at
/// evaluation time, so ordering is significant and preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: Time,
    pub end: Time,
    pub weight: i32,
}

/// Weight schedule for one target: a default plus ordered time windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightConfig {
    pub default_weight: i32,
    pub time_windows: Vec<TimeWindow>,
}

impl WeightConfig {
    /// Wire body for the weight update call.
    pub fn to_wire(&self) -> WeightConfigPayload {
        WeightConfigPayload {
            default_weight: self.default_weight,
            time_config: self
                .time_windows
                .iter()
                .map(|window| TimeWeightEntry {
                    start_time: format_wall_time(window.start),
                    end_time: format_wall_time(window.end),
                    weight: window.weight,
                })
                .collect(),
        }
    }

    pub fn from_wire(payload: &WeightConfigPayload) -> Result<Self, DomainError> {
        let mut time_windows = Vec::with_capacity(payload.time_config.len());
        for entry in &payload.time_config {
            time_windows.push(TimeWindow {
                start: parse_wall_time(&entry.start_time)?,
                end: parse_wall_time(&entry.end_time)?,
                weight: entry.weight,
            });
        }
        Ok(Self {
            default_weight: payload.default_weight,
            time_windows,
        })
    }
}

/// One target's weight entry in the server's listing, with the resolved
/// target name carried alongside the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetWeight {
    pub platform_name: String,
    pub target: String,
    pub target_name: String,
    pub weight: WeightConfig,
}

impl TargetWeight {
    pub fn from_wire(resp: &PlatformWeightResp) -> Result<Self, DomainError> {
        Ok(Self {
            platform_name: resp.platform_name.clone(),
            target: resp.target.clone(),
            target_name: resp.target_name.clone(),
            weight: WeightConfig::from_wire(&resp.weight)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn parses_both_wall_time_forms() {
        assert_eq!(parse_wall_time("08:30:00").expect("long form"), time!(8:30));
        assert_eq!(parse_wall_time("08:30").expect("short form"), time!(8:30));
        assert!(parse_wall_time("25:00").is_err());
        assert!(parse_wall_time("soon").is_err());
    }

    #[test]
    fn wire_roundtrip_preserves_window_order() {
        let payload = WeightConfigPayload {
            default_weight: 10,
            time_config: vec![
                TimeWeightEntry {
                    start_time: "20:00:00".to_string(),
                    end_time: "23:00:00".to_string(),
                    weight: 50,
                },
                TimeWeightEntry {
                    start_time: "08:00:00".to_string(),
                    end_time: "12:00:00".to_string(),
                    weight: 30,
                },
            ],
        };

        let config = WeightConfig::from_wire(&payload).expect("valid payload");
        assert_eq!(config.time_windows[0].start, time!(20:00));
        assert_eq!(config.to_wire(), payload);
    }
}
