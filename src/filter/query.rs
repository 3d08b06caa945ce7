//! Shareable query-string form of [`Criteria`].
//!
//! Parameter names are fixed: `url`, `mime`, `status` (comma-joined),
//! `startT`/`endT` or `startS`/`endS`, `timeMode`, `size`/`sizeMode` and
//! `speed`/`speedMode`. Only set fields are written; missing fields fall back
//! to their defaults on parse.

use super::criteria::{Comparison, Criteria, Threshold, TimeMode, TimeWindow};
use super::error::FilterParseError;
use std::collections::HashMap;
use url::form_urlencoded;

/// Default comparison for the size threshold
pub const DEFAULT_SIZE_MODE: Comparison = Comparison::AtLeast;
/// Default comparison for the throughput threshold
pub const DEFAULT_SPEED_MODE: Comparison = Comparison::AtMost;

/// Serialize criteria into query parameters
pub fn to_query_string(criteria: &Criteria) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());

    if !criteria.url().trim().is_empty() {
        params.append_pair("url", criteria.url());
    }
    if !criteria.mime().trim().is_empty() {
        params.append_pair("mime", criteria.mime());
    }
    if !criteria.statuses().is_empty() {
        let codes: Vec<String> = criteria.statuses().iter().map(u16::to_string).collect();
        params.append_pair("status", &codes.join(","));
    }

    match criteria.time_window() {
        TimeWindow::Clock { start, end } => {
            if let Some(start) = start {
                params.append_pair("startT", start);
            }
            if let Some(end) = end {
                params.append_pair("endT", end);
            }
        }
        TimeWindow::RelativeSeconds { start, end } => {
            if let Some(start) = start {
                params.append_pair("startS", &start.to_string());
            }
            if let Some(end) = end {
                params.append_pair("endS", &end.to_string());
            }
        }
    }

    if let Some(size) = criteria.size() {
        params.append_pair("size", &size.value.to_string());
        params.append_pair("sizeMode", size.comparison.as_param());
    }
    if let Some(speed) = criteria.speed() {
        params.append_pair("speed", &speed.value.to_string());
        params.append_pair("speedMode", speed.comparison.as_param());
    }
    if criteria.time_window().mode() == TimeMode::RelativeSeconds {
        params.append_pair("timeMode", "seconds");
    }

    params.finish()
}

/// Parse criteria from query parameters; a leading `?` is ignored.
///
/// Unknown parameters are ignored. Unparseable status codes are skipped;
/// other malformed values are errors.
pub fn from_query_string(query: &str) -> Result<Criteria, FilterParseError> {
    let query = query.trim().trim_start_matches('?');
    let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.trim().is_empty());

    let mut criteria = Criteria::new();

    if let Some(url) = get("url") {
        criteria = criteria.with_url(url);
    }
    if let Some(mime) = get("mime") {
        criteria = criteria.with_mime(mime);
    }
    if let Some(status) = get("status") {
        criteria = criteria.with_statuses(
            status
                .split(',')
                .filter_map(|code| code.trim().parse::<u16>().ok()),
        );
    }

    let mode = get("timeMode")
        .map(str::parse::<TimeMode>)
        .transpose()?
        .unwrap_or_default();
    let window = match mode {
        TimeMode::Clock => TimeWindow::clock(get("startT"), get("endT"))?,
        TimeMode::RelativeSeconds => TimeWindow::relative(
            parse_number("startS", get("startS"))?,
            parse_number("endS", get("endS"))?,
        ),
    };
    criteria = criteria.with_time_window(window);

    let size_mode = parse_mode(get("sizeMode"), DEFAULT_SIZE_MODE)?;
    if let Some(size) = parse_number("size", get("size"))? {
        criteria = criteria.with_size(Threshold::new(size, size_mode));
    }
    let speed_mode = parse_mode(get("speedMode"), DEFAULT_SPEED_MODE)?;
    if let Some(speed) = parse_number("speed", get("speed"))? {
        criteria = criteria.with_speed(Threshold::new(speed, speed_mode));
    }

    Ok(criteria)
}

/// Builds a share link: `base?query`, or just `base` when nothing is set
pub fn share_link(base: &str, criteria: &Criteria) -> String {
    let query = to_query_string(criteria);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// Parses a number field; `None` for absent values
pub fn parse_number(field: &'static str, value: Option<&str>) -> Result<Option<f64>, FilterParseError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| FilterParseError::InvalidNumber {
                    field,
                    value: raw.to_string(),
                })
        })
        .transpose()
}

fn parse_mode(value: Option<&str>, default: Comparison) -> Result<Comparison, FilterParseError> {
    value
        .map(str::parse::<Comparison>)
        .transpose()
        .map(|mode| mode.unwrap_or(default))
}
