use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Session-stable identifier of an entry.
///
/// Built from the source identity plus the entry's position inside that
/// source, never from its content, so two captures holding an entry at the
/// same index still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(source_name: &str, index: usize) -> Self {
        Self(format!("{}_{}", URL_SAFE_NO_PAD.encode(source_name), index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Request side of a captured transaction
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub url: String,
    pub method: String,
}

/// Response side of a captured transaction
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    /// Raw MIME type, possibly with a `;charset=...` suffix
    pub mime_type: String,
    /// Bytes on the wire, when the capture recorded them
    pub transfer_size: Option<i64>,
    /// Uncompressed body size, when the capture recorded it
    pub body_size: Option<i64>,
    #[serde(skip_serializing)]
    pub body_text: String,
    pub is_base64: bool,
}

/// One recorded request/response pair
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: EntryId,
    /// Name of the capture file this entry came from
    pub source_name: String,
    pub started_at: DateTime<Local>,
    /// Total elapsed time of the transaction in milliseconds
    pub elapsed_millis: f64,
    pub request: Request,
    pub response: Response,
}

impl Entry {
    /// Size used by the size and throughput clauses.
    ///
    /// HAR writes `-1` for unknown sizes, so negative values count as absent.
    pub fn size_bytes(&self) -> u64 {
        self.response
            .transfer_size
            .filter(|size| *size >= 0)
            .or(self.response.body_size.filter(|size| *size >= 0))
            .map(|size| size as u64)
            .unwrap_or(0)
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes() as f64 / 1024.0
    }

    /// KB per second, with the elapsed time floored at one second
    pub fn throughput_kbps(&self) -> f64 {
        let seconds = (self.elapsed_millis / 1000.0).max(1.0);
        self.size_kb() / seconds
    }

    /// Seconds since `first`, or 0 when there is no reference point
    pub fn offset_seconds(&self, first: Option<DateTime<Local>>) -> f64 {
        first
            .map(|first| {
                self.started_at
                    .signed_duration_since(first)
                    .num_milliseconds() as f64
                    / 1000.0
            })
            .unwrap_or(0.0)
    }

    /// Local wall-clock time of day as `HH:MM:SS`
    pub fn clock_time(&self) -> String {
        self.started_at.format("%H:%M:%S").to_string()
    }

    /// MIME type without parameters, lower-cased
    pub fn essence_mime(&self) -> String {
        essence_mime(&self.response.mime_type)
    }
}

/// Strips any `;...` parameter suffix and lower-cases the MIME type.
pub fn essence_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
