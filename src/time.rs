use crate::error::{Error, Result};

/// Seconds since midnight of a vehicle journey's service day. Can exceed 24h
/// for service running past midnight.
pub type Timestamp = u32;

/// Seconds since midnight of the timetable's first day.
pub type DateTime = u32;

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Unreachable in a forward (depart after) search.
pub const INF: DateTime = DateTime::MAX;

/// Unreachable in a backward (arrive before) search.
pub const MIN: DateTime = 0;

/// Time of day of `dt`.
#[inline]
pub const fn hour(dt: DateTime) -> Timestamp {
    dt % SECONDS_PER_DAY
}

/// Day offset of `dt` since the timetable's first day.
#[inline]
pub const fn date(dt: DateTime) -> u32 {
    dt / SECONDS_PER_DAY
}

#[inline]
pub const fn set(date: u32, hour: Timestamp) -> DateTime {
    date * SECONDS_PER_DAY + hour
}

fn parse_field(field: &str) -> Option<u32> {
    // `u32::from_str` would also take a leading `+`.
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_time_impl(h: &str, m: &str, s: &str) -> Option<Timestamp> {
    let hours = parse_field(h)?;
    let minutes = parse_field(m)?;
    let seconds = parse_field(s)?;
    if minutes > 59 || seconds > 59 {
        return None;
    }
    hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)
}

/// Parses `H:MM:SS` or `HH:MM:SS`. Hours past 23 are accepted.
pub fn parse_time(s: &str) -> Result<Timestamp> {
    let invalid = || Error::InvalidTime(s.to_owned());
    if s.len() < 7 {
        return Err(invalid());
    }

    let parts: Vec<&str> = s.split(':').collect();
    let [hour, min, sec] = parts[..] else {
        return Err(invalid());
    };
    if min.len() != 2 || sec.len() != 2 {
        return Err(invalid());
    }
    parse_time_impl(hour, min, sec).ok_or_else(invalid)
}

pub fn get_time_str(time: Timestamp) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
