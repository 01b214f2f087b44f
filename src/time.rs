// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Format a duration in seconds as `HH:MM:SS`
///
/// Every field is zero-padded to two digits. Hours are not wrapped, so
/// durations of 100 hours or more simply get a wider hour field.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Format a media position reported in fractional seconds
///
/// Negative and NaN positions are clamped to zero.
pub fn format_position(seconds: f64) -> String {
    format_duration(whole_seconds(seconds))
}

/// Floor a media position to whole seconds, clamping invalid values to zero
pub fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_nan() || seconds <= 0.0 {
        0
    } else {
        seconds.floor() as u64
    }
}

/// Parse a user-supplied position such as `90`, `1:30` or `01:01:30`
pub fn parse_position(input: &str) -> Option<u64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    parts.iter().try_fold(0u64, |total, part| {
        let value: u64 = part.parse().ok()?;
        total.checked_mul(60)?.checked_add(value)
    })
}
