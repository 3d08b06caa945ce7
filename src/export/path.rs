//! Destination path derivation from request URL and MIME type.

use super::mime::MimeTable;
use crate::parser::Entry;
use regex::Regex;
use std::sync::LazyLock;

static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[a-z0-9]+$").expect("valid extension regex"));

/// Filename used for a root path serving HTML
pub const INDEX_FILENAME: &str = "index.html";
/// Filename used for a root path serving anything else
pub const FALLBACK_FILENAME: &str = "file";

/// Derives destination paths; same entry and flag always give the same path.
#[derive(Debug, Clone, Default)]
pub struct PathDeriver {
    extensions: MimeTable,
}

impl PathDeriver {
    pub fn new(extensions: MimeTable) -> Self {
        Self { extensions }
    }

    /// Destination for `entry`.
    ///
    /// With `preserve_hierarchy` the result is `host/dir/.../filename`,
    /// otherwise only the filename.
    pub fn derive(&self, entry: &Entry, preserve_hierarchy: bool) -> String {
        let mime = entry.essence_mime();
        let (directories, candidate) = split_url(&entry.request.url);

        let mut filename = if is_blank_segment(&candidate) {
            if mime.contains("text/html") {
                INDEX_FILENAME.to_string()
            } else {
                FALLBACK_FILENAME.to_string()
            }
        } else {
            candidate
        };

        if !EXTENSION_RE.is_match(&filename)
            && let Some(ext) = self.extensions.extension_for(&mime)
        {
            filename = format!("{filename}.{ext}");
        }

        if preserve_hierarchy {
            let mut parts = directories;
            parts.push(filename);
            parts.join("/")
        } else {
            filename
        }
    }
}

/// Shorthand for [`PathDeriver::derive`] with the built-in extension table
pub fn derive_path(entry: &Entry, preserve_hierarchy: bool) -> String {
    PathDeriver::default().derive(entry, preserve_hierarchy)
}

/// Empty, `.` and `..` segments never name a file or directory
fn is_blank_segment(segment: &str) -> bool {
    matches!(segment.trim(), "" | "." | "..")
}

/// Splits `host + path` on `/`: leading segments become directories, the
/// last segment is the filename candidate (possibly blank). Opaque URLs keep
/// their raw path, so relative segments are dropped here.
fn split_url(raw: &str) -> (Vec<String>, String) {
    let Ok(url) = url::Url::parse(raw) else {
        return (Vec::new(), String::new());
    };
    let joined = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
    let mut segments: Vec<&str> = joined.split('/').collect();
    let candidate = segments.pop().unwrap_or_default().to_string();
    let directories = segments
        .into_iter()
        .filter(|segment| !is_blank_segment(segment))
        .map(str::to_string)
        .collect();
    (directories, candidate)
}

/// Index of the extension dot within the last path segment, if any
pub(crate) fn extension_start(path: &str) -> Option<usize> {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    path[segment_start..]
        .rfind('.')
        .filter(|dot| *dot > 0)
        .map(|dot| segment_start + dot)
}
