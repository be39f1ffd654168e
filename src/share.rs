//! Shareable countdown links.
//!
//! A link carries the target as the wall-clock time it was entered in (`time`),
//! the sharer's UTC offset (`tz`) and an optional `title`. Opening it from any
//! zone rebuilds the same instant.

use chrono::FixedOffset;
use url::form_urlencoded;

use crate::datetime::{format_offset, parse_url_target, to_local};
use crate::error::CountdownError;

/// Link to `base` for a countdown ending at `target_ms`, written as the wall
/// clock at `offset`.
pub fn share_url(base: &str, target_ms: f64, offset: FixedOffset, title: Option<&str>) -> Option<String> {
    let local = to_local(target_ms, offset)?;
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("time", &local.format("%Y-%m-%dT%H:%M:%S").to_string())
        .append_pair("tz", &format_offset(offset));
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        query.append_pair("title", title);
    }
    Some(format!("{base}?{}", query.finish()))
}

/// Countdown parameters found in a page's query string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShareParams {
    pub target: Option<String>,
    pub tz: Option<String>,
    pub title: Option<String>,
}

impl ShareParams {
    /// Parse `?date=...&tz=...&title=...`. The target may be named `date`,
    /// `target` or `time`, preferred in that order.
    pub fn from_query(query: &str) -> Self {
        let mut date = None;
        let mut target = None;
        let mut time = None;
        let mut params = ShareParams::default();

        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "date" => &mut date,
                "target" => &mut target,
                "time" => &mut time,
                "tz" => &mut params.tz,
                "title" => &mut params.title,
                _ => continue,
            };
            if slot.is_none() && !value.trim().is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        params.target = date.or(target).or(time);
        params
    }

    /// The absolute target, if the link names one.
    pub fn target_ms(&self, local: FixedOffset, now_ms: f64) -> Result<Option<f64>, CountdownError> {
        self.target
            .as_deref()
            .map(|value| parse_url_target(value, self.tz.as_deref(), local, now_ms))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn link_roundtrips_the_instant_across_zones() {
        let nz = offset(13);
        let target = nz.with_ymd_and_hms(2025, 12, 4, 6, 30, 0).unwrap().timestamp_millis() as f64;
        let url = share_url("https://kiwi.example/", target, nz, Some("  New Year  ")).unwrap();
        assert_eq!(
            url,
            "https://kiwi.example/?time=2025-12-04T06%3A30%3A00&tz=%2B13%3A00&title=New+Year"
        );

        let query = url.split_once('?').unwrap().1;
        let params = ShareParams::from_query(query);
        assert_eq!(params.title.as_deref(), Some("New Year"));
        // Viewer in UTC-5 sees the same instant.
        assert_eq!(params.target_ms(offset(-5), 0.0), Ok(Some(target)));
    }

    #[test]
    fn blank_title_is_left_out() {
        let url = share_url("/", 0.0, offset(0), Some("   ")).unwrap();
        assert_eq!(url, "/?time=1970-01-01T00%3A00%3A00&tz=%2B00%3A00");
    }

    #[test]
    fn titles_with_query_syntax_survive_the_link() {
        let url = share_url("/", 0.0, offset(0), Some("Tom & Jerry's 1+1 party \u{1F95D}")).unwrap();
        let params = ShareParams::from_query(url.split_once('?').unwrap().1);
        assert_eq!(params.title.as_deref(), Some("Tom & Jerry's 1+1 party \u{1F95D}"));
        assert_eq!(params.tz.as_deref(), Some("+00:00"));
    }

    #[test]
    fn hand_typed_links_decode() {
        let params = ShareParams::from_query("?date=2030-01-01T09:00&tz=%2B05:30&title=Launch%20day");
        assert_eq!(params.target.as_deref(), Some("2030-01-01T09:00"));
        assert_eq!(params.tz.as_deref(), Some("+05:30"));
        assert_eq!(params.title.as_deref(), Some("Launch day"));
        // An unescaped `+` arrives as a space; the offset parser still reads it.
        let params = ShareParams::from_query("tz=+13:00");
        assert_eq!(params.tz.as_deref(), Some(" 13:00"));
    }

    #[test]
    fn date_beats_target_beats_time() {
        let params = ShareParams::from_query("?time=b&target=a&date=2030-01-01T00:00:00Z");
        assert_eq!(params.target.as_deref(), Some("2030-01-01T00:00:00Z"));
        let params = ShareParams::from_query("time=b&target=a");
        assert_eq!(params.target.as_deref(), Some("a"));
        assert_eq!(ShareParams::from_query("").target, None);
    }

    #[test]
    fn missing_or_bad_target() {
        assert_eq!(ShareParams::from_query("?title=x").target_ms(offset(0), 0.0), Ok(None));
        assert!(ShareParams::from_query("?date=soonish").target_ms(offset(0), 0.0).is_err());
    }
}
