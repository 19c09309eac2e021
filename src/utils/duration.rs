//! Parsing of duration strings such as `90s`, `1h30m` or `1.5h`.
//!
//! The accepted grammar is an optional sign followed by one or more
//! `<number><unit>` groups, where numbers may carry a decimal fraction and
//! units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is zero.
//! Values are bounded by `i64` nanoseconds (about 292 years).

use chrono::TimeDelta;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration '{0}'")]
    Invalid(String),

    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),

    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },

    #[error("duration '{0}' is out of range")]
    OutOfRange(String),
}

/// Nanoseconds per unit.
fn unit_nanos(unit: &str) -> Option<i128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

/// Parses a duration string into a [`TimeDelta`].
///
/// # Errors
///
/// See [`DurationParseError`].
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use ephemeral_shortener::utils::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
/// assert_eq!(parse_duration("1.5s").unwrap(), TimeDelta::milliseconds(1500));
/// ```
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let invalid = || DurationParseError::Invalid(trimmed.to_string());
    let out_of_range = || DurationParseError::OutOfRange(trimmed.to_string());

    let (negative, mut rest) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: i128 = 0;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_part = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map_or(rest.len(), |(idx, _)| idx);
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(trimmed.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: trimmed.to_string(),
        })?;

        let whole: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| out_of_range())?
        };

        let mut value = whole.checked_mul(scale).ok_or_else(out_of_range)?;

        // Digits beyond nanosecond precision carry no weight.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let numerator: i128 = frac_digits.parse().map_err(|_| invalid())?;
            let denominator = 10i128.pow(frac_digits.len() as u32);
            value = value
                .checked_add(numerator * scale / denominator)
                .ok_or_else(out_of_range)?;
        }

        total = total.checked_add(value).ok_or_else(out_of_range)?;
        if total > i128::from(i64::MAX) {
            return Err(out_of_range());
        }
    }

    let nanos = i64::try_from(total).map_err(|_| out_of_range())?;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

/// Renders a duration in a form [`parse_duration`] accepts.
///
/// Whole seconds are written as `"<n>s"`, anything finer as milliseconds.
pub fn format_duration(duration: TimeDelta) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.num_seconds())
    } else {
        format!("{}ms", duration.num_milliseconds())
    }
}
