use super::error::FilterParseError;
use regex::Regex;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::LazyLock;

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d(?::[0-5]\d)?$").expect("valid clock regex")
});

/// Direction of a numeric threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Reject values below the threshold
    #[default]
    AtLeast,
    /// Reject values above the threshold
    AtMost,
}

impl Comparison {
    /// Short form used in query strings
    pub fn as_param(&self) -> &'static str {
        match self {
            Comparison::AtLeast => "gte",
            Comparison::AtMost => "lte",
        }
    }
}

impl FromStr for Comparison {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gte" | "at-least" | "atleast" | ">=" => Ok(Comparison::AtLeast),
            "lte" | "at-most" | "atmost" | "<=" => Ok(Comparison::AtMost),
            _ => Err(FilterParseError::InvalidComparison(s.to_string())),
        }
    }
}

/// A numeric bound and the side it applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub value: f64,
    pub comparison: Comparison,
}

impl Threshold {
    /// Returns `None` for NaN, which means "no threshold"
    pub fn new(value: f64, comparison: Comparison) -> Option<Self> {
        (!value.is_nan()).then_some(Self { value, comparison })
    }

    pub fn accepts(&self, actual: f64) -> bool {
        match self.comparison {
            Comparison::AtLeast => actual >= self.value,
            Comparison::AtMost => actual <= self.value,
        }
    }
}

/// Which coordinate system the time window uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeMode {
    #[default]
    Clock,
    RelativeSeconds,
}

impl FromStr for TimeMode {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clock" => Ok(TimeMode::Clock),
            "seconds" | "relative" | "relativeseconds" | "offset" => Ok(TimeMode::RelativeSeconds),
            _ => Err(FilterParseError::InvalidTimeMode(s.to_string())),
        }
    }
}

/// Time window in one of the two coordinate systems
#[derive(Debug, Clone, PartialEq)]
pub enum TimeWindow {
    /// Local time of day, compared as `HH:MM:SS` strings
    Clock {
        start: Option<String>,
        end: Option<String>,
    },
    /// Seconds since the first entry across all sources
    RelativeSeconds { start: Option<f64>, end: Option<f64> },
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Clock {
            start: None,
            end: None,
        }
    }
}

impl TimeWindow {
    pub fn mode(&self) -> TimeMode {
        match self {
            TimeWindow::Clock { .. } => TimeMode::Clock,
            TimeWindow::RelativeSeconds { .. } => TimeMode::RelativeSeconds,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        match self {
            TimeWindow::Clock { start, end } => start.is_none() && end.is_none(),
            TimeWindow::RelativeSeconds { start, end } => start.is_none() && end.is_none(),
        }
    }

    /// Clock window; blank bounds are unbounded, others must look like a time
    pub fn clock(start: Option<&str>, end: Option<&str>) -> Result<Self, FilterParseError> {
        Ok(TimeWindow::Clock {
            start: clock_bound(start)?,
            end: clock_bound(end)?,
        })
    }

    /// Relative window; NaN bounds are unbounded
    pub fn relative(start: Option<f64>, end: Option<f64>) -> Self {
        TimeWindow::RelativeSeconds {
            start: start.filter(|v| !v.is_nan()),
            end: end.filter(|v| !v.is_nan()),
        }
    }
}

fn clock_bound(value: Option<&str>) -> Result<Option<String>, FilterParseError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if CLOCK_RE.is_match(v) => Ok(Some(v.to_string())),
        Some(v) => Err(FilterParseError::InvalidClock(v.to_string())),
    }
}

/// Compound filter over entries; every set clause must pass.
///
/// Built with consuming `with_*` methods. Blank strings, NaN numbers and an
/// empty status set leave the corresponding clause unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    statuses: BTreeSet<u16>,
    url: String,
    mime: String,
    time: TimeWindow,
    size: Option<Threshold>,
    speed: Option<Threshold>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    pub fn clear_statuses(mut self) -> Self {
        self.statuses.clear();
        self
    }

    pub fn without_status(mut self, status: u16) -> Self {
        self.statuses.remove(&status);
        self
    }

    /// Adds every available code in the class, e.g. `4` for all 4xx codes
    pub fn with_status_class(mut self, class: u8, available: &[u16]) -> Self {
        self.statuses.extend(
            available
                .iter()
                .copied()
                .filter(|code| status_in_class(*code, class)),
        );
        self
    }

    pub fn without_status_class(mut self, class: u8) -> Self {
        self.statuses.retain(|code| !status_in_class(*code, class));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time = window;
        self
    }

    pub fn with_size(mut self, threshold: Option<Threshold>) -> Self {
        self.size = threshold;
        self
    }

    pub fn with_speed(mut self, threshold: Option<Threshold>) -> Self {
        self.speed = threshold;
        self
    }

    pub fn statuses(&self) -> &BTreeSet<u16> {
        &self.statuses
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lower-cased URL keywords; empty when the URL clause is unset
    pub fn url_keywords(&self) -> Vec<String> {
        self.url
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time
    }

    pub fn size(&self) -> Option<Threshold> {
        self.size
    }

    pub fn speed(&self) -> Option<Threshold> {
        self.speed
    }

    /// True when no clause would reject anything
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.url.trim().is_empty()
            && self.mime.trim().is_empty()
            && self.time.is_unbounded()
            && self.size.is_none()
            && self.speed.is_none()
    }
}

fn status_in_class(code: u16, class: u8) -> bool {
    code.to_string().starts_with(&class.to_string())
}

/// Parses a single status class digit
pub fn parse_status_class(s: &str) -> Result<u8, FilterParseError> {
    match s.trim().parse::<u8>() {
        Ok(class @ 1..=9) => Ok(class),
        _ => Err(FilterParseError::InvalidStatusClass(s.to_string())),
    }
}
