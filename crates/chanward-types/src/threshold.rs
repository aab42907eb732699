//! Warn/archive thresholds and human-readable durations.
//!
//! Durations are written as a sequence of `<number><unit>` pairs with units
//! `w`, `d`, `h`, `m` and `s` (`"30d"`, `"1d12h"`, `"45s"`).

use std::time::Duration;

use chrono::TimeDelta;

use crate::error::ChanwardError;

/// Inactivity thresholds for the warn/archive state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Inactivity required before a warning is posted.
    pub warn_after: TimeDelta,
    /// Grace period after a warning before the channel is archived.
    pub archive_after: TimeDelta,
}

impl Thresholds {
    /// Build validated thresholds. Both durations must be strictly positive.
    pub fn new(warn_after: Duration, archive_after: Duration) -> Result<Self, ChanwardError> {
        Ok(Self {
            warn_after: bounded_delta("warn threshold", warn_after)?,
            archive_after: bounded_delta("archive threshold", archive_after)?,
        })
    }

    /// Parse both thresholds from duration strings.
    pub fn parse(warn_after: &str, archive_after: &str) -> Result<Self, ChanwardError> {
        let warn = parse_duration(warn_after)
            .map_err(|e| ChanwardError::config(format!("warn threshold: {e}")))?;
        let archive = parse_duration(archive_after)
            .map_err(|e| ChanwardError::config(format!("archive threshold: {e}")))?;
        Self::new(warn, archive)
    }
}

/// Longest accepted threshold or window: 100 years of 365 days.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Convert a configured duration, rejecting zero and anything longer than
/// [`MAX_DURATION`]. Date arithmetic with the result cannot overflow for any
/// timestamp Slack reports.
pub fn bounded_delta(what: &str, d: Duration) -> Result<TimeDelta, ChanwardError> {
    if d.is_zero() {
        return Err(ChanwardError::config(format!("{what} must be positive")));
    }
    if d > MAX_DURATION {
        return Err(ChanwardError::config(format!(
            "{what} is too large (at most {} days)",
            MAX_DURATION.as_secs() / 86_400
        )));
    }
    TimeDelta::from_std(d).map_err(|_| ChanwardError::config(format!("{what} is too large")))
}

/// Parse a duration such as `"30d"` or `"1h30m"`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".into());
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit = match ch {
            'w' => 7 * 86_400,
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            other => return Err(format!("unknown unit '{other}' in \"{s}\"")),
        };
        if digits.is_empty() {
            return Err(format!("unit '{ch}' without a number in \"{s}\""));
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| format!("number too large in \"{s}\""))?;
        total = n
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration too large: \"{s}\""))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("missing unit after {digits} in \"{s}\" (use s, m, h, d or w)"));
    }
    Ok(Duration::from_secs(total))
}

/// Render a duration compactly for messages, e.g. `30 days`, `1d 12h`, `7s`.
pub fn format_duration(d: TimeDelta) -> String {
    let secs = d.num_seconds().max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (mins, s) = (rem / 60, rem % 60);

    if rem == 0 && hours == 0 && days > 0 {
        return if days == 1 { "1 day".into() } else { format!("{days} days") };
    }

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (mins, "m"), (s, "s")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, u)| format!("{n}{u}"))
        .collect();
    if parts.is_empty() {
        "0s".into()
    } else {
        parts.join(" ")
    }
}
