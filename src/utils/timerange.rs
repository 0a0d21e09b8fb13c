use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sumo_search::SEARCH_TIME_FORMAT;

/// Turns a CLI time argument into a `from`/`to` value the Search Job API takes.
///
/// - `now` and relative offsets (`-30s`, `-15m`, `-2h`, `-1d`, `-1w`) become
///   epoch milliseconds, which the server reads independently of `timeZone`.
/// - RFC 3339 timestamps carry their own offset, so they become epoch
///   milliseconds too.
/// - Zone-less `YYYY-MM-DDTHH:MM:SS` is passed through for the server to read
///   in the request's `timeZone`.
pub fn resolve(input: &str, now: DateTime<Utc>) -> Result<String> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("now") {
        return Ok(now.timestamp_millis().to_string());
    }

    if let Some(offset) = input.strip_prefix('-') {
        let ago = parse_offset(offset)?;
        let at = now
            .checked_sub_signed(ago)
            .context(format!("Offset '{}' is before the earliest supported date", input))?;
        return Ok(at.timestamp_millis().to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp_millis().to_string());
    }

    if NaiveDateTime::parse_from_str(input, SEARCH_TIME_FORMAT).is_ok() {
        return Ok(input.to_string());
    }

    bail!(
        "Unrecognised time '{}': use 'now', an offset like -15m, RFC 3339, or YYYY-MM-DDTHH:MM:SS",
        input
    )
}

fn parse_offset(offset: &str) -> Result<Duration> {
    let split = offset
        .find(|c: char| !c.is_ascii_digit())
        .context(format!("Missing unit in offset '-{}'", offset))?;
    let (amount, unit) = offset.split_at(split);
    let amount: i64 = amount
        .parse()
        .context(format!("Invalid amount in offset '-{}'", offset))?;

    let duration = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        other => bail!("Unknown time unit '{}' (expected s, m, h, d or w)", other),
    };
    duration.context(format!("Offset '-{}' is out of range", offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 28, 13, 0, 0).unwrap()
    }

    #[test]
    fn test_now() {
        let now = fixed_now();
        assert_eq!(resolve("now", now).unwrap(), now.timestamp_millis().to_string());
        assert_eq!(resolve("NOW", now).unwrap(), now.timestamp_millis().to_string());
    }

    #[test]
    fn test_relative_offsets() {
        let now = fixed_now();
        let ms = now.timestamp_millis();
        assert_eq!(resolve("-15m", now).unwrap(), (ms - 15 * 60_000).to_string());
        assert_eq!(resolve("-2h", now).unwrap(), (ms - 2 * 3_600_000).to_string());
        assert_eq!(resolve("-1d", now).unwrap(), (ms - 86_400_000).to_string());
        assert_eq!(resolve("-30s", now).unwrap(), (ms - 30_000).to_string());
    }

    #[test]
    fn test_rfc3339_becomes_epoch_millis() {
        let resolved = resolve("2024-01-28T13:00:00-08:00", fixed_now()).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 28, 21, 0, 0).unwrap();
        assert_eq!(resolved, expected.timestamp_millis().to_string());
    }

    #[test]
    fn test_naive_passthrough() {
        assert_eq!(
            resolve("2024-01-28T13:09:10", fixed_now()).unwrap(),
            "2024-01-28T13:09:10"
        );
    }

    #[test]
    fn test_huge_offset_is_an_error() {
        let err = resolve("-100000000w", fixed_now()).unwrap_err();
        assert!(err.to_string().contains("-100000000w"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(resolve("yesterday", fixed_now()).is_err());
        assert!(resolve("-15", fixed_now()).is_err());
        assert!(resolve("-15y", fixed_now()).is_err());
        assert!(resolve("-m", fixed_now()).is_err());
    }
}
