//! ISO-8601 parsing helpers shared by the filter grammar (`dt'...'` literals)
//! and the value coercer.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseError, TimeDelta,
};

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
}

pub(crate) fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(input, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
}

pub(crate) fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
}

/// Date-time with a mandatory offset (`Z` or `±HH:MM`); seconds are optional.
/// Date and time must be joined by `T`.
pub(crate) fn parse_offset_datetime(input: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    // RFC 3339 also allows a space between date and time, ISO-8601 does not.
    if !input.contains(' ') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt);
        }
    }
    let normalized = match input.strip_suffix(['Z', 'z']) {
        Some(body) => format!("{}+00:00", body),
        None => input.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%:z")
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z"))
}

/// Offset date-time optionally followed by a bracketed region id
/// (`2014-11-26T11:15:08+01:00[Europe/Ljubljana]`). The region is not resolved;
/// the explicit offset is authoritative.
pub(crate) fn parse_zoned_datetime(input: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let body = match input.strip_suffix(']').and_then(|s| s.rfind('[').map(|i| &s[..i])) {
        Some(body) => body,
        None => input,
    };
    parse_offset_datetime(body)
}

/// Time of day with an offset, e.g. `10:15:30+01:00` or `10:15Z`.
pub(crate) fn parse_offset_time(input: &str) -> Result<(NaiveTime, FixedOffset), ParseError> {
    let anchored = format!("1970-01-01T{}", input);
    let dt = parse_offset_datetime(&anchored)?;
    Ok((dt.time(), *dt.offset()))
}

/// ISO-8601 duration in the `PnDTnHnMn.nS` form (days and below), signs allowed
/// on the whole value and on each component.
pub(crate) fn parse_duration(input: &str) -> Option<TimeDelta> {
    let (negate, rest) = split_sign(input);
    let rest = rest.strip_prefix(['P', 'p'])?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.find(['T', 't']) {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };

    let mut total = TimeDelta::zero();
    let mut seen = false;

    if !date_part.is_empty() {
        let days = date_part.strip_suffix(['D', 'd'])?;
        total = total.checked_add(&TimeDelta::try_days(parse_signed(days)?)?)?;
        seen = true;
    }

    if let Some(mut time) = time_part {
        if time.is_empty() {
            return None;
        }
        for (unit, seconds_per_unit) in [(['H', 'h'], 3600i64), (['M', 'm'], 60i64)] {
            if let Some(idx) = time.find(unit) {
                let amount = parse_signed(&time[..idx])?;
                let secs = amount.checked_mul(seconds_per_unit)?;
                total = total.checked_add(&TimeDelta::try_seconds(secs)?)?;
                time = &time[idx + 1..];
                seen = true;
            }
        }
        if !time.is_empty() {
            let secs = time.strip_suffix(['S', 's'])?;
            total = total.checked_add(&parse_seconds(secs)?)?;
            seen = true;
        }
    }

    if !seen {
        return None;
    }

    Some(if negate { -total } else { total })
}

fn split_sign(input: &str) -> (bool, &str) {
    if let Some(rest) = input.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = input.strip_prefix('+') {
        (false, rest)
    } else {
        (false, input)
    }
}

fn parse_signed(input: &str) -> Option<i64> {
    let (negate, digits) = split_sign(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negate { -value } else { value })
}

/// Seconds with an optional fraction of up to nine digits (`.` or `,` separator).
fn parse_seconds(input: &str) -> Option<TimeDelta> {
    let (negate, body) = split_sign(input);
    let (whole, fraction) = match body.find(['.', ',']) {
        Some(idx) => (&body[..idx], &body[idx + 1..]),
        None => (body, ""),
    };
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs = parse_signed(whole)?;
    let nanos: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse().ok()?
    };

    let value = TimeDelta::try_seconds(secs)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    Some(if negate { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    #[test]
    fn offset_datetime_accepts_rfc3339_and_minute_precision() {
        let dt = parse_offset_datetime("2014-11-26T11:15:08Z").unwrap();
        assert_eq!(dt.with_timezone(&Utc).to_rfc3339(), "2014-11-26T11:15:08+00:00");

        let dt = parse_offset_datetime("2014-11-26T11:15+01:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);

        let dt = parse_offset_datetime("2014-11-26T11:15Z").unwrap();
        assert_eq!(dt.minute(), 15);

        assert!(parse_offset_datetime("2014-11-26T11:15:08").is_err());
        assert!(parse_offset_datetime("2014-11-26 11:15:08Z").is_err());
        assert!(parse_offset_datetime("2014-11-26 11:15Z").is_err());
        assert!(parse_offset_datetime("2014-11-26T1sdf1:15:08Z").is_err());
    }

    #[test]
    fn zoned_datetime_ignores_region_suffix() {
        let dt = parse_zoned_datetime("2014-11-26T11:15:08+01:00[Europe/Ljubljana]").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn offset_time_keeps_offset() {
        let (time, offset) = parse_offset_time("10:15:30-02:00").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(10, 15, 30).unwrap());
        assert_eq!(offset.local_minus_utc(), -7200);
        assert!(parse_offset_time("10:15:30").is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT20.345S"), Some(TimeDelta::milliseconds(20_345)));
        assert_eq!(parse_duration("PT15M"), Some(TimeDelta::minutes(15)));
        assert_eq!(parse_duration("P2D"), Some(TimeDelta::days(2)));
        assert_eq!(
            parse_duration("P2DT3H4M"),
            Some(TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4))
        );
        assert_eq!(parse_duration("-PT6H3M"), Some(-(TimeDelta::hours(6) + TimeDelta::minutes(3))));
        assert_eq!(parse_duration("PT-6H+3M"), Some(TimeDelta::minutes(-357)));
        assert_eq!(parse_duration("P"), None);
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("15 minutes"), None);
        assert_eq!(parse_duration("P1Y"), None);
    }
}
