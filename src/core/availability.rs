use crate::domain::model::{AvailabilitySnapshot, AvailabilityStatus, ScheduleSlot};
use crate::utils::error::{DiscoveryError, Result};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use serde_json::Value;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Decodes a persisted weekly schedule. Storage may hold it as a native JSON
/// array, as JSON-array text inside a string, or not at all; absent means
/// "no schedule", anything else unparseable is an error.
///
/// Slot objects carry `weekday` (0 = Monday .. 6 = Sunday, or an English day
/// name), `start` and `end` (minute-of-day numbers or `"HH:MM"` text).
/// Individual slots that fail validation are dropped; slots with end <= start
/// are dropped too, an overnight opening is stored as two slots.
pub fn parse_schedule(raw: Option<&Value>) -> Result<Vec<ScheduleSlot>> {
    let value = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(v) => v,
    };

    match value {
        Value::Array(items) => Ok(slots_from_items(items)),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => Ok(slots_from_items(&items)),
                Ok(other) => Err(DiscoveryError::ScheduleDecodeError {
                    reason: format!("expected a list of slots, got {}", json_kind(&other)),
                }),
                Err(e) => Err(DiscoveryError::ScheduleDecodeError {
                    reason: format!("schedule text is not valid JSON: {}", e),
                }),
            }
        }
        other => Err(DiscoveryError::ScheduleDecodeError {
            reason: format!("expected a list of slots, got {}", json_kind(other)),
        }),
    }
}

fn slots_from_items(items: &[Value]) -> Vec<ScheduleSlot> {
    items.iter().filter_map(slot_from_value).collect()
}

fn slot_from_value(value: &Value) -> Option<ScheduleSlot> {
    let obj = value.as_object()?;

    let weekday = weekday_from_value(obj.get("weekday").or_else(|| obj.get("day"))?)?;
    let start_minute = minute_from_value(obj.get("start")?)?;
    let end_minute = minute_from_value(obj.get("end")?)?;

    if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
        return None;
    }

    Some(ScheduleSlot {
        weekday,
        start_minute,
        end_minute,
    })
}

fn weekday_from_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => {
            let day = n.as_u64()?;
            (day <= 6).then_some(day as u8)
        }
        Value::String(name) => match name.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(0),
            "tuesday" | "tue" => Some(1),
            "wednesday" | "wed" => Some(2),
            "thursday" | "thu" => Some(3),
            "friday" | "fri" => Some(4),
            "saturday" | "sat" => Some(5),
            "sunday" | "sun" => Some(6),
            _ => None,
        },
        _ => None,
    }
}

/// Accepts a minute-of-day number or `"HH:MM"` text.
fn minute_from_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => {
            let minute = n.as_u64()?;
            (minute <= MINUTES_PER_DAY as u64).then_some(minute as u16)
        }
        Value::String(text) => {
            let (h, m) = text.trim().split_once(':')?;
            let hours: u16 = h.trim().parse().ok()?;
            let minutes: u16 = m.trim().parse().ok()?;
            // 小時先設上限，乘法才不會溢位
            if hours > 24 || minutes >= 60 {
                return None;
            }
            let total = hours * 60 + minutes;
            (total <= MINUTES_PER_DAY).then_some(total)
        }
        _ => None,
    }
}

/// Core availability verdict, a pure function of the injected clock.
///
/// 1. A manual override always wins over the schedule.
/// 2. A slot covering the current minute means available now, open until the
///    latest end among the covering slots.
/// 3. Otherwise look forward (rest of today, then the six following days)
///    for the next opening; an empty schedule means the state is unknown.
pub fn evaluate(
    now: NaiveDateTime,
    slots: &[ScheduleSlot],
    available_now_override: bool,
) -> AvailabilitySnapshot {
    if available_now_override {
        return available_now(None);
    }

    let weekday = now.weekday().num_days_from_monday() as u8;
    let minute = (now.time().hour() * 60 + now.time().minute()) as u16;

    let covered_until = slots
        .iter()
        .filter(|s| s.weekday == weekday && s.start_minute <= minute && minute < s.end_minute)
        .map(|s| s.end_minute)
        .max();
    if let Some(end) = covered_until {
        return available_now(Some(minute_on(now.date(), end)));
    }

    if slots.is_empty() {
        return AvailabilitySnapshot {
            is_available: false,
            status: AvailabilityStatus::Unknown,
            message: "No schedule set".to_string(),
            next_change_at: None,
        };
    }

    match next_opening(weekday, minute, slots) {
        Some((day_offset, start)) => {
            let message = if day_offset == 0 {
                format!("Back at {:02}:{:02}", start / 60, start % 60)
            } else {
                format!(
                    "Back {} at {:02}:{:02}",
                    weekday_name((weekday + day_offset) % 7),
                    start / 60,
                    start % 60
                )
            };
            let date = now.date() + Duration::days(i64::from(day_offset));
            AvailabilitySnapshot {
                is_available: false,
                status: AvailabilityStatus::ScheduledLater,
                message,
                next_change_at: Some(minute_on(date, start)),
            }
        }
        None => AvailabilitySnapshot {
            is_available: false,
            status: AvailabilityStatus::Unavailable,
            message: "Currently unavailable".to_string(),
            next_change_at: None,
        },
    }
}

/// Convenience wrapper over the raw stored blob: decode failures degrade to
/// an UNKNOWN verdict instead of propagating.
pub fn evaluate_record(
    now: NaiveDateTime,
    schedule: Option<&Value>,
    available_now_override: bool,
) -> AvailabilitySnapshot {
    if available_now_override {
        return available_now(None);
    }

    match parse_schedule(schedule) {
        Ok(slots) => evaluate(now, &slots, false),
        Err(e) => {
            tracing::warn!("Schedule decode failed, reporting unknown: {}", e);
            AvailabilitySnapshot {
                is_available: false,
                status: AvailabilityStatus::Unknown,
                message: "Schedule unavailable".to_string(),
                next_change_at: None,
            }
        }
    }
}

fn available_now(until: Option<NaiveDateTime>) -> AvailabilitySnapshot {
    AvailabilitySnapshot {
        is_available: true,
        status: AvailabilityStatus::AvailableNow,
        message: "Available now".to_string(),
        next_change_at: until,
    }
}

/// 分鐘數換算成當天時刻；1440（24:00）落到隔天零點。
fn minute_on(date: chrono::NaiveDate, minute: u16) -> NaiveDateTime {
    let days = i64::from(minute / MINUTES_PER_DAY);
    let rem = u32::from(minute % MINUTES_PER_DAY);
    let time = NaiveTime::from_hms_opt(rem / 60, rem % 60, 0).unwrap_or(NaiveTime::MIN);
    (date + Duration::days(days)).and_time(time)
}

fn weekday_name(day: u8) -> &'static str {
    match day {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 先找今天剩下的開始時間，再往後掃六天；不回繞到今天已開始的時段，
/// 所以排程非空仍可能回報 UNAVAILABLE。
fn next_opening(weekday: u8, minute: u16, slots: &[ScheduleSlot]) -> Option<(u8, u16)> {
    let mut best: Option<(u8, u16)> = None;
    for slot in slots {
        let day_offset = ((7 + i16::from(slot.weekday) - i16::from(weekday)) % 7) as u8;
        if day_offset == 0 && slot.start_minute <= minute {
            continue;
        }
        let candidate = (day_offset, slot.start_minute);
        if best.map_or(true, |b| candidate < b) {
            best = Some(candidate);
        }
    }
    best
}
