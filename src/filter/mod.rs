//! Entry filtering
//!
//! A [`Criteria`] value combines up to six clauses with AND logic. Each
//! clause is skipped when its criterion is unset:
//!
//! - status set: the response status must be one of the codes
//! - URL: whitespace-separated keywords, any of which must appear in the URL
//!   (case-insensitive)
//! - MIME: case-insensitive substring of the raw MIME type
//! - size: KB on the wire, at least / at most a threshold
//! - throughput: KB per second of elapsed time (floored at one second)
//! - time window: local time of day, or seconds since the first entry
//!
//! # Query strings
//!
//! ```text
//! url=cdn+.m3u8&status=200%2C206      # either keyword, status 200 or 206
//! mime=image&size=100                 # images of at least 100 KB
//! speed=50&speedMode=lte              # slower than 50 KB/s
//! timeMode=seconds&startS=5&endS=30   # between 5s and 30s into the capture
//! ```

pub mod criteria;
pub mod error;
pub mod matcher;
pub mod query;

pub use criteria::{
    Comparison, Criteria, Threshold, TimeMode, TimeWindow, parse_status_class,
};
pub use error::FilterParseError;
pub use matcher::filter_entries;
pub use query::{from_query_string, share_link, to_query_string};
