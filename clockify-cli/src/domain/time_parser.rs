//! Parses the time strings accepted by `--when`, `--when-to-close`, prompts
//! and `split`.
//!
//! Accepted shapes:
//!
//! - `now`
//! - relative offsets: `+1h30m`, `-15m`, `-1:30` (colon form is right aligned,
//!   so `-1:30` is one minute thirty seconds and `-1:00:00` one hour)
//! - `yesterday ` followed by any absolute form below
//! - `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, `HH:MM:SS`, `HH:MM`
//!
//! Absolute forms are local wall-clock times. Forms without a date take the
//! reference instant's date.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::CliError;

const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_time(input: &str) -> Result<DateTime<Utc>, CliError> {
    parse_time_at(input, Local::now())
}

/// Parses `input` relative to `reference` instead of the current time.
pub fn parse_time_at(input: &str, reference: DateTime<Local>) -> Result<DateTime<Utc>, CliError> {
    let value = input.trim().to_lowercase();

    if value == "now" {
        return Ok(reference.with_timezone(&Utc));
    }

    if let Some(rest) = value.strip_prefix('+') {
        let offset = parse_offset(input, rest)?;
        return Ok((reference + offset).with_timezone(&Utc));
    }
    if let Some(rest) = value.strip_prefix('-') {
        let offset = parse_offset(input, rest)?;
        return Ok((reference - offset).with_timezone(&Utc));
    }

    let (date, rest) = match value.strip_prefix("yesterday ") {
        Some(rest) => {
            let yesterday = reference.date_naive() - Duration::days(1);
            (Some(yesterday), rest.trim())
        }
        None => (None, value.as_str()),
    };

    let naive = parse_absolute(input, rest, date.unwrap_or(reference.date_naive()), date.is_some())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CliError::invalid_time(input, "time does not exist in the local timezone"))
}

fn parse_absolute(
    input: &str,
    value: &str,
    today: NaiveDate,
    date_fixed: bool,
) -> Result<NaiveDateTime, CliError> {
    let (date, time) = match value.split_once(' ') {
        Some(_) if date_fixed => {
            return Err(CliError::invalid_time(input, "\"yesterday\" can't be combined with a date"));
        }
        Some((date, time)) => (date.to_string(), time.trim()),
        None => (today.format("%Y-%m-%d").to_string(), value),
    };

    let mut time = time.to_string();
    if time.find(':') == Some(1) {
        time.insert(0, '0');
    }
    match time.len() {
        5 => time.push_str(":00"),
        8 => {}
        _ => {
            return Err(CliError::invalid_time(
                input,
                "expected \"now\", a relative offset, [yyyy-mm-dd] hh:mm[:ss]",
            ))
        }
    }

    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), FULL_FORMAT)
        .map_err(|e| CliError::invalid_time(input, e.to_string()))
}

/// Parses the part after the sign of a relative offset.
fn parse_offset(input: &str, value: &str) -> Result<Duration, CliError> {
    if value.is_empty() {
        return Err(CliError::invalid_time(input, "missing offset after the sign"));
    }
    if value.contains(':') {
        parse_clock_offset(input, value)
    } else {
        parse_unit_offset(input, value)
    }
}

/// `HH:MM:SS` or `MM:SS`.
fn parse_clock_offset(input: &str, value: &str) -> Result<Duration, CliError> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return Err(CliError::invalid_time(input, "too many \":\" in offset"));
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CliError::invalid_time(input, "offset parts must be numbers"));
        }
        let n: i64 = part
            .parse()
            .map_err(|_| CliError::invalid_time(input, "offset is too large"))?;
        numbers.push(n);
    }

    // right aligned: the last part is always seconds
    let mut seconds = 0i64;
    for (i, n) in numbers.iter().rev().enumerate() {
        let leading = i == numbers.len() - 1;
        if !leading && *n >= 60 {
            return Err(CliError::invalid_time(input, "minutes and seconds must be below 60"));
        }
        seconds = n
            .checked_mul(60i64.pow(i as u32))
            .and_then(|part| seconds.checked_add(part))
            .ok_or_else(|| CliError::invalid_time(input, "offset is too large"))?;
    }
    Duration::try_seconds(seconds).ok_or_else(|| CliError::invalid_time(input, "offset is too large"))
}

/// Sequence of `<int><unit>` tokens with units `d`, `h`, `m` and `s`.
fn parse_unit_offset(input: &str, value: &str) -> Result<Duration, CliError> {
    let mut total = Duration::zero();
    let mut digits = String::new();

    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return Err(CliError::invalid_time(input, format!("unit \"{}\" without a number", c)));
        }
        let n: i64 = digits
            .parse()
            .map_err(|_| CliError::invalid_time(input, "offset is too large"))?;
        let part = match c {
            'd' => Duration::try_days(n),
            'h' => Duration::try_hours(n),
            'm' => Duration::try_minutes(n),
            's' => Duration::try_seconds(n),
            other => {
                return Err(CliError::invalid_time(input, format!("unknown unit \"{}\"", other)))
            }
        };
        total = part
            .and_then(|part| total.checked_add(&part))
            .ok_or_else(|| CliError::invalid_time(input, "offset is too large"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(CliError::invalid_time(input, "number without a unit (d, h, m or s)"));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn reference() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 12, 10, 20, 30).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn parse(input: &str) -> Result<DateTime<Utc>, CliError> {
        parse_time_at(input, reference())
    }

    #[test]
    fn now_is_the_reference() {
        assert_eq!(parse("now").unwrap(), reference().with_timezone(&Utc));
        assert_eq!(parse("  NOW ").unwrap(), reference().with_timezone(&Utc));
    }

    #[test]
    fn now_twice_is_within_a_second() {
        let a = parse_time("now").unwrap();
        let b = parse_time("now").unwrap();
        assert!((b - a).num_milliseconds().abs() <= 1000);
    }

    #[test]
    fn zero_offset_is_now() {
        let now = parse_time("now").unwrap();
        let zero = parse_time("+0s").unwrap();
        assert!((zero - now).num_milliseconds().abs() <= 1000);
    }

    #[test]
    fn absolute_forms() {
        assert_eq!(parse("08:00").unwrap(), local(2024, 6, 12, 8, 0, 0));
        assert_eq!(parse("08:00:15").unwrap(), local(2024, 6, 12, 8, 0, 15));
        assert_eq!(parse("2024-05-01 17:45").unwrap(), local(2024, 5, 1, 17, 45, 0));
        assert_eq!(
            parse("2024-05-01 17:45:10").unwrap(),
            local(2024, 5, 1, 17, 45, 10)
        );
    }

    #[test]
    fn single_digit_hour_is_padded() {
        assert_eq!(parse("8:30").unwrap(), local(2024, 6, 12, 8, 30, 0));
        assert_eq!(parse("8:30:05").unwrap(), local(2024, 6, 12, 8, 30, 5));
        assert_eq!(parse("2024-05-01 8:30").unwrap(), local(2024, 5, 1, 8, 30, 0));
    }

    #[test]
    fn yesterday_prefix() {
        assert_eq!(parse("yesterday 09:15").unwrap(), local(2024, 6, 11, 9, 15, 0));
        assert!(parse("yesterday 2024-01-01 09:15").is_err());
    }

    #[test]
    fn unit_offsets() {
        let base = reference().with_timezone(&Utc);
        assert_eq!(parse("+1h30m").unwrap(), base + Duration::minutes(90));
        assert_eq!(parse("-30m1h").unwrap(), base - Duration::minutes(90));
        assert_eq!(parse("-1d").unwrap(), base - Duration::days(1));
        assert_eq!(parse("+10m5m").unwrap(), base + Duration::minutes(15));
        assert_eq!(parse("+45s").unwrap(), base + Duration::seconds(45));
    }

    #[test]
    fn clock_offsets_are_right_aligned() {
        let base = reference().with_timezone(&Utc);
        assert_eq!(parse("-1:30").unwrap(), base - Duration::seconds(90));
        assert_eq!(parse("-01:00:00").unwrap(), base - Duration::hours(1));
        assert_eq!(parse("+0:05:00").unwrap(), base + Duration::minutes(5));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "", "tomorrow", "8", "25:00", "12:61", "+", "+1", "+1x", "+h", "-1:60",
            "+1:2:3:4", "2024-13-01 10:00", "10:00:00:00",
        ] {
            assert!(
                matches!(parse(input), Err(CliError::InvalidTime { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn parsed_times_have_whole_seconds() {
        assert_eq!(parse("08:00").unwrap().nanosecond(), 0);
    }
}
