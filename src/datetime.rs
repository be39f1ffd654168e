//! Countdown target input: ISO strings with an optional zone override, a
//! forgiving natural-language fallback, quick presets and `datetime-local`
//! formatting.
//!
//! Wall-clock values are interpreted in an explicit [`FixedOffset`] supplied by
//! the caller (the browser's current offset, or the `tz` URL parameter), so
//! everything here is a pure function of its inputs.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::CountdownError;

const MINUTE_MS: f64 = 60_000.0;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const MONTHS: [(&str, u32); 24] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// The instant `ms` as seen on a wall clock at `offset`.
pub fn to_local(ms: f64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms.round() as i64).map(|dt| dt.with_timezone(&offset))
}

fn local_ms(naive: NaiveDateTime, offset: FixedOffset) -> Option<f64> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis() as f64)
}

/// `"+13:00"`, `"-05:30"`, `"+0530"`, `"+5"`, `"Z"` or `"UTC"`. A leading space
/// counts as `+`, since an unescaped `+` in a query string decodes to one.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let s = raw.trim_end();
    let bare = s.trim_start();
    if bare.eq_ignore_ascii_case("z") || bare.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.chars().next()? {
        '+' | ' ' => (1, s[1..].trim_start()),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (h, m) = match rest.split_once(':') {
        Some(parts) => parts,
        None if rest.len() == 4 => (&rest[..2], &rest[2..]),
        None => (rest, "0"),
    };
    // Digits only: `u32::from_str` would still take a second sign.
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
}

/// `+HH:MM`, the form written into share links.
pub fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

/// ISO input. An explicit offset in the string wins; otherwise the wall-clock
/// value is read at `offset`. A bare date means local midnight.
pub fn parse_iso(input: &str, offset: FixedOffset) -> Option<f64> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.timestamp_millis() as f64);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_ms(naive, offset);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    local_ms(date.and_hms_opt(0, 0, 0)?, offset)
}

#[derive(Debug, Default, PartialEq)]
struct NaturalParts {
    month: Option<u32>,
    day: Option<u32>,
    time: Option<(u32, u32)>,
    year: Option<i32>,
}

fn split_digits(token: &str) -> (&str, &str) {
    let end = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());
    token.split_at(end)
}

fn apply_meridiem(hours: u32, meridiem: &str) -> Option<u32> {
    match meridiem {
        "" => Some(hours),
        "am" if hours == 12 => Some(0),
        "am" => Some(hours),
        "pm" if hours < 12 => Some(hours + 12),
        "pm" => Some(hours),
        _ => None,
    }
}

fn scan_natural(input: &str) -> NaturalParts {
    let normalized = input.to_lowercase().replace(',', " ");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut parts = NaturalParts::default();

    for (i, token) in tokens.iter().enumerate() {
        let next_meridiem = tokens
            .get(i + 1)
            .copied()
            .filter(|t| *t == "am" || *t == "pm")
            .unwrap_or("");

        if parts.month.is_none() {
            let word = token.trim_end_matches('.');
            if let Some(&(_, m)) = MONTHS.iter().find(|(name, _)| *name == word) {
                parts.month = Some(m);
                continue;
            }
        }

        if let Some((h, rest)) = token.split_once(':') {
            let (m, suffix) = split_digits(rest);
            let meridiem = if suffix.is_empty() { next_meridiem } else { suffix };
            let parsed = h
                .parse::<u32>()
                .ok()
                .zip(m.parse::<u32>().ok())
                .and_then(|(h, m)| Some((apply_meridiem(h, meridiem)?, m)))
                .filter(|&(h, m)| h < 24 && m < 60);
            if parts.time.is_none() {
                parts.time = parsed;
            }
            continue;
        }

        let (digits, suffix) = split_digits(token);
        if digits.is_empty() {
            continue;
        }
        match suffix {
            "am" | "pm" => {
                // "9am"
                let hour = digits.parse().ok().and_then(|h| apply_meridiem(h, suffix));
                if parts.time.is_none() {
                    parts.time = hour.filter(|h| *h < 24).map(|h| (h, 0));
                }
            }
            "" if digits.len() == 4 && digits.starts_with("20") => {
                parts.year = digits.parse().ok();
            }
            "" if !next_meridiem.is_empty() => {
                // "9 pm"
                let hour = digits.parse().ok().and_then(|h| apply_meridiem(h, next_meridiem));
                if parts.time.is_none() {
                    parts.time = hour.filter(|h| *h < 24).map(|h| (h, 0));
                }
            }
            "" | "st" | "nd" | "rd" | "th" if digits.len() <= 2 => {
                let day = digits.parse().ok().filter(|d| (1..=31).contains(d));
                if parts.day.is_none() {
                    parts.day = day;
                }
            }
            _ => {}
        }
    }
    parts
}

/// Free-text fallback: "6:30am 3rd december", "dec 3 2026 18:00", "9pm".
///
/// Missing fields come from `now`. Without an explicit year a result that is
/// not in the future moves to the next occurrence: the next day when only a
/// time was given, otherwise the next year.
pub fn parse_natural(input: &str, offset: FixedOffset, now_ms: f64) -> Option<f64> {
    let parts = scan_natural(input);
    if parts.month.is_none() && parts.day.is_none() && parts.time.is_none() {
        return None;
    }
    let now = to_local(now_ms, offset)?;
    let year = parts.year.unwrap_or(now.year());
    let date = NaiveDate::from_ymd_opt(
        year,
        parts.month.unwrap_or(now.month()),
        parts.day.unwrap_or(now.day()),
    )?;
    let time = match parts.time {
        Some((h, m)) => NaiveTime::from_hms_opt(h, m, 0)?,
        None => now.time(),
    };
    let ms = local_ms(date.and_time(time), offset)?;
    if ms > now_ms || parts.year.is_some() {
        return Some(ms);
    }

    let next = if parts.month.is_none() && parts.day.is_none() {
        date.checked_add_days(Days::new(1))?
    } else {
        NaiveDate::from_ymd_opt(year + 1, date.month(), date.day())?
    };
    local_ms(next.and_time(time), offset)
}

/// ISO first, then the natural-language fallback.
pub fn parse_target(input: &str, offset: FixedOffset, now_ms: f64) -> Result<f64, CountdownError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CountdownError::InvalidTarget(input.to_string()));
    }
    parse_iso(trimmed, offset)
        .or_else(|| parse_natural(trimmed, offset, now_ms))
        .ok_or_else(|| CountdownError::InvalidTarget(input.to_string()))
}

/// Target from a shared link. `tz`, when present and valid, replaces the
/// viewer's own offset for wall-clock values.
pub fn parse_url_target(
    value: &str,
    tz: Option<&str>,
    local: FixedOffset,
    now_ms: f64,
) -> Result<f64, CountdownError> {
    let offset = match tz {
        Some(raw) => parse_offset(raw).unwrap_or_else(|| {
            log::warn!("ignoring unrecognised tz parameter {raw:?}");
            local
        }),
        None => local,
    };
    parse_target(value, offset, now_ms)
}

/// `YYYY-MM-DDTHH:MM`, the value format of an `<input type="datetime-local">`.
pub fn format_datetime_local(ms: f64, offset: FixedOffset) -> Option<String> {
    to_local(ms, offset).map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
}

/// Pre-filled form value: five minutes from now.
pub fn default_target_ms(now_ms: f64) -> f64 {
    now_ms + 5.0 * MINUTE_MS
}

/// Quick-pick buttons next to the target field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Seconds(i64),
    Minutes(i64),
    /// Tomorrow at the given local hour.
    TomorrowAt(u32),
    Days(i64),
}

impl Preset {
    /// From a button's data attributes, e.g. `("minutes", 30)`.
    pub fn from_name(kind: &str, amount: i64) -> Option<Self> {
        match kind {
            "seconds" => Some(Preset::Seconds(amount)),
            "minutes" => Some(Preset::Minutes(amount)),
            "tomorrow" | "hours" => Some(Preset::TomorrowAt(9)),
            "days" => Some(Preset::Days(amount)),
            _ => None,
        }
    }

    pub fn apply(self, now_ms: f64, offset: FixedOffset) -> Option<f64> {
        match self {
            Preset::Seconds(n) => Some(now_ms + n as f64 * 1000.0),
            Preset::Minutes(n) => Some(now_ms + n as f64 * MINUTE_MS),
            Preset::Days(n) => Some(now_ms + n as f64 * 24.0 * 60.0 * MINUTE_MS),
            Preset::TomorrowAt(hour) => {
                let today = to_local(now_ms, offset)?.date_naive();
                let tomorrow = today.checked_add_days(Days::new(1))?;
                local_ms(tomorrow.and_hms_opt(hour, 0, 0)?, offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz() -> FixedOffset {
        FixedOffset::east_opt(13 * 3600).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(offset: FixedOffset, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> f64 {
        offset.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().timestamp_millis() as f64
    }

    #[test]
    fn offsets_parse_and_format() {
        assert_eq!(parse_offset("+13:00"), FixedOffset::east_opt(13 * 3600));
        assert_eq!(parse_offset("-05:30"), FixedOffset::west_opt(5 * 3600 + 1800));
        assert_eq!(parse_offset("+0530"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(parse_offset(" 13:00"), FixedOffset::east_opt(13 * 3600));
        assert_eq!(parse_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_offset("+25:00"), None);
        assert_eq!(parse_offset("bogus"), None);
        assert_eq!(parse_offset("+-5"), None);
        assert_eq!(parse_offset("-+5:00"), None);
        assert_eq!(parse_offset("++13:00"), None);
        assert_eq!(parse_offset("+5"), FixedOffset::east_opt(5 * 3600));
        assert_eq!(format_offset(nz()), "+13:00");
        assert_eq!(format_offset(FixedOffset::west_opt(3 * 3600 + 1800).unwrap()), "-03:30");
    }

    #[test]
    fn iso_with_and_without_offset() {
        let expected = at(utc(), 2025, 12, 3, 17, 30);
        assert_eq!(parse_iso("2025-12-03T17:30:00Z", nz()), Some(expected));
        assert_eq!(parse_iso("2025-12-04T06:30:00+13:00", utc()), Some(expected));
        assert_eq!(parse_iso("2025-12-04T06:30+13:00", utc()), Some(expected));
        // Wall-clock values are read at the supplied offset.
        assert_eq!(parse_iso("2025-12-04T06:30", nz()), Some(expected));
        assert_eq!(parse_iso("2025-12-04 06:30:00", nz()), Some(expected));
        assert_eq!(parse_iso("2025-12-04", nz()), Some(at(nz(), 2025, 12, 4, 0, 0)));
        assert_eq!(parse_iso("next tuesday", nz()), None);
    }

    #[test]
    fn natural_language_with_month_day_and_time() {
        let now = at(utc(), 2025, 6, 1, 12, 0);
        assert_eq!(
            parse_natural("6:30am 3rd December", utc(), now),
            Some(at(utc(), 2025, 12, 3, 6, 30))
        );
        assert_eq!(
            parse_natural("dec 3, 2027 18:05", utc(), now),
            Some(at(utc(), 2027, 12, 3, 18, 5))
        );
        assert_eq!(
            parse_natural("march 2 9 pm", utc(), now),
            // March has passed this year, so next year.
            Some(at(utc(), 2026, 3, 2, 21, 0))
        );
    }

    #[test]
    fn natural_time_only_rolls_to_tomorrow() {
        let now = at(utc(), 2025, 6, 1, 12, 0);
        assert_eq!(parse_natural("9am", utc(), now), Some(at(utc(), 2025, 6, 2, 9, 0)));
        assert_eq!(parse_natural("12:15pm", utc(), now), Some(at(utc(), 2025, 6, 1, 12, 15)));
        assert_eq!(parse_natural("12:00am", utc(), now), Some(at(utc(), 2025, 6, 2, 0, 0)));
    }

    #[test]
    fn unparseable_input_is_rejected() {
        let now = at(utc(), 2025, 6, 1, 12, 0);
        assert!(matches!(parse_target("", utc(), now), Err(CountdownError::InvalidTarget(_))));
        assert!(matches!(parse_target("whenever", utc(), now), Err(CountdownError::InvalidTarget(_))));
        assert!(parse_target("february 30", utc(), now).is_err());
        assert!(parse_target("25:99", utc(), now).is_err());
    }

    #[test]
    fn url_tz_overrides_local_offset() {
        let now = at(utc(), 2025, 6, 1, 12, 0);
        let got = parse_url_target("2025-12-04T06:30:00", Some("+13:00"), utc(), now).unwrap();
        assert_eq!(got, at(utc(), 2025, 12, 3, 17, 30));
        // Bad tz falls back to the viewer's offset.
        let got = parse_url_target("2025-12-04T06:30:00", Some("mars"), utc(), now).unwrap();
        assert_eq!(got, at(utc(), 2025, 12, 4, 6, 30));
    }

    #[test]
    fn presets_and_form_formatting() {
        let now = at(nz(), 2025, 12, 31, 22, 15);
        assert_eq!(Preset::Minutes(5).apply(now, nz()), Some(default_target_ms(now)));
        assert_eq!(Preset::Seconds(-30).apply(now, nz()), Some(now - 30_000.0));
        assert_eq!(Preset::TomorrowAt(9).apply(now, nz()), Some(at(nz(), 2026, 1, 1, 9, 0)));
        assert_eq!(Preset::Days(2).apply(now, nz()), Some(at(nz(), 2026, 1, 2, 22, 15)));
        assert_eq!(Preset::from_name("tomorrow", 0), Some(Preset::TomorrowAt(9)));
        assert_eq!(Preset::from_name("weeks", 1), None);
        assert_eq!(format_datetime_local(now, nz()).as_deref(), Some("2025-12-31T22:15"));
    }
}
