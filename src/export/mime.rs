//! MIME type to file extension lookup, used when a URL carries no extension.

use std::collections::BTreeMap;

const BUILTIN_EXTENSIONS: &[(&str, &str)] = &[
    // Video, streaming
    ("video/mp4", "mp4"),
    ("video/iso.segment", "m4s"),
    ("video/mp2t", "ts"),
    ("video/webm", "webm"),
    ("video/quicktime", "mov"),
    ("video/x-msvideo", "avi"),
    ("video/x-flv", "flv"),
    ("application/vnd.apple.mpegurl", "m3u8"),
    ("application/x-mpegurl", "m3u8"),
    ("application/dash+xml", "mpd"),
    // Audio
    ("audio/mp4", "m4a"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("audio/opus", "opus"),
    ("audio/wav", "wav"),
    ("audio/webm", "webm"),
    // Images
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/svg+xml", "svg"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/apng", "apng"),
    // Text, scripts, styles
    ("text/html", "html"),
    ("text/css", "css"),
    ("text/javascript", "js"),
    ("application/javascript", "js"),
    ("application/x-javascript", "js"),
    ("text/plain", "txt"),
    ("text/markdown", "md"),
    ("text/xml", "xml"),
    ("application/xml", "xml"),
    // Documents, data
    ("application/json", "json"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/x-7z-compressed", "7z"),
    ("application/x-rar-compressed", "rar"),
    ("application/octet-stream", "bin"),
    ("application/wasm", "wasm"),
    // Fonts
    ("font/woff2", "woff2"),
    ("font/woff", "woff"),
    ("font/ttf", "ttf"),
    ("font/otf", "otf"),
    ("application/font-woff", "woff"),
    ("application/vnd.ms-fontobject", "eot"),
];

/// Extension table: built-in entries plus configured overrides
#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    overrides: BTreeMap<String, String>,
}

impl MimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces mappings; keys are matched lower-cased, extensions
    /// are stored without a leading dot
    pub fn with_overrides<'a>(mut self, extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (mime, ext) in extra {
            self.overrides.insert(
                mime.trim().to_lowercase(),
                ext.trim().trim_start_matches('.').to_string(),
            );
        }
        self
    }

    /// Looks up an essence MIME type (no parameters, lower-cased)
    pub fn extension_for(&self, mime: &str) -> Option<&str> {
        if let Some(ext) = self.overrides.get(mime) {
            return Some(ext.as_str()).filter(|ext| !ext.is_empty());
        }
        BUILTIN_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == mime)
            .map(|(_, ext)| *ext)
    }
}
