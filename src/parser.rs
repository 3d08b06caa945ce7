use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::path::Path;
use thiserror::Error;

mod entities;
mod har;

pub use entities::{Entry, EntryId, Request, Response, essence_mime};
use har::{HarDocument, HarEntry};

/// Errors raised while decoding a capture file
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{source_name}' is not a valid HAR document: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{source_name}' entry {index}: invalid startedDateTime '{value}'")]
    InvalidTimestamp {
        source_name: String,
        index: usize,
        value: String,
    },
}

/// Decodes a HAR document into entries tagged with `source_name`.
///
/// Entries keep their positional order; ids are derived from the source name
/// and that position.
pub fn parse_har_bytes(source_name: &str, bytes: &[u8]) -> Result<Vec<Entry>, ParseError> {
    let document: HarDocument =
        serde_json::from_slice(bytes).map_err(|source| ParseError::Json {
            source_name: source_name.to_string(),
            source,
        })?;

    document
        .log
        .entries
        .into_iter()
        .enumerate()
        .map(|(index, raw)| convert_entry(source_name, index, raw))
        .collect()
}

/// Reads and decodes a HAR file; the source name is the file name.
pub fn parse_har_file(path: impl AsRef<Path>) -> Result<(String, Vec<Entry>), ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = source_name_for(path);
    let entries = parse_har_bytes(&name, &bytes)?;
    Ok((name, entries))
}

/// Source name used for a capture on disk
pub fn source_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// RFC 3339 first, then ISO 8601 with a basic `+hhmm` offset, then a local
/// time without any offset.
fn parse_started_at(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).earliest()
}

fn convert_entry(source_name: &str, index: usize, raw: HarEntry) -> Result<Entry, ParseError> {
    let started_at =
        parse_started_at(&raw.started_date_time).ok_or_else(|| ParseError::InvalidTimestamp {
            source_name: source_name.to_string(),
            index,
            value: raw.started_date_time.clone(),
        })?;

    let content = raw.response.content;
    let is_base64 = content
        .encoding
        .as_deref()
        .is_some_and(|encoding| encoding.eq_ignore_ascii_case("base64"));

    Ok(Entry {
        id: EntryId::new(source_name, index),
        source_name: source_name.to_string(),
        started_at,
        elapsed_millis: raw.time.filter(|t| t.is_finite() && *t > 0.0).unwrap_or(0.0),
        request: Request {
            url: raw.request.url,
            method: raw.request.method,
        },
        response: Response {
            status: raw.response.status,
            mime_type: content.mime_type.unwrap_or_default(),
            transfer_size: raw.response.transfer_size,
            body_size: raw.response.body_size,
            body_text: content.text.unwrap_or_default(),
            is_base64,
        },
    })
}
