//! Turning planned files into bytes on disk: a single payload or a ZIP blob.

use super::error::ExportError;
use super::planner::PlannedFile;
use crate::parser::Entry;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Local};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Prefix of generated archive names
pub const DEFAULT_ARCHIVE_PREFIX: &str = "harpic";
/// MIME type handed to the save target for archives
pub const ARCHIVE_MIME: &str = "application/zip";

/// Destination for finished payloads
pub trait SaveTarget {
    /// Stores `content` under `name` and reports where it went
    fn save(&mut self, name: &str, content: &[u8], mime: &str) -> Result<PathBuf, ExportError>;
}

/// Writes payloads into a directory on the local filesystem.
///
/// Archives get a `.zip` suffix; single payloads keep their derived name.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&mut self, name: &str, content: &[u8], mime: &str) -> Result<PathBuf, ExportError> {
        let file_name = if mime == ARCHIVE_MIME && !name.ends_with(".zip") {
            format!("{name}.zip")
        } else {
            name.to_string()
        };
        let path = self.root.join(&file_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        if path.exists() {
            tracing::warn!(path = %path.display(), "overwriting existing file");
        }
        fs::write(&path, content).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), bytes = content.len(), mime, "saved");
        Ok(path)
    }
}

/// One member handed to an archiver; the body is still in HAR form
#[derive(Debug, Clone, Copy)]
pub struct ArchiveMember<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub base64: bool,
}

/// Builds a finished archive blob from members
pub trait Archiver {
    fn build(&self, members: &[ArchiveMember<'_>]) -> Result<Vec<u8>, ExportError>;
}

/// Deflate-compressed ZIP archive built in memory
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn build(&self, members: &[ArchiveMember<'_>]) -> Result<Vec<u8>, ExportError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for member in members {
            let bytes = if member.base64 {
                decode_base64(member.path, member.content)?
            } else {
                member.content.as_bytes().to_vec()
            };
            writer
                .start_file(member.path, options)
                .map_err(|source| ExportError::Archive {
                    path: member.path.to_string(),
                    source,
                })?;
            writer.write_all(&bytes).map_err(|source| ExportError::Io {
                path: member.path.to_string(),
                source,
            })?;
        }

        let cursor = writer.finish().map_err(|source| ExportError::Archive {
            path: "central directory".to_string(),
            source,
        })?;
        Ok(cursor.into_inner())
    }
}

/// Body bytes of an entry: base64-decoded when flagged, UTF-8 text otherwise
pub fn decode_body(entry: &Entry) -> Result<Vec<u8>, ExportError> {
    if entry.response.is_base64 {
        decode_base64(entry.id.as_str(), &entry.response.body_text)
    } else {
        Ok(entry.response.body_text.as_bytes().to_vec())
    }
}

fn decode_base64(id: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|source| ExportError::InvalidBase64 {
            id: id.to_string(),
            source,
        })
}

/// `{prefix}_{HHMMSS}` for the given local time
pub fn archive_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}_{}", now.format("%H%M%S"))
}

/// Packages planned files, either as one payload or through an archiver
pub struct Packager {
    archiver: Option<Box<dyn Archiver>>,
    archive_prefix: String,
}

impl Default for Packager {
    fn default() -> Self {
        Self::new(Some(Box::new(ZipArchiver)))
    }
}

impl Packager {
    pub fn new(archiver: Option<Box<dyn Archiver>>) -> Self {
        Self {
            archiver,
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }

    /// Packager that can only write single entries
    pub fn without_archiver() -> Self {
        Self::new(None)
    }

    pub fn with_archive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.archive_prefix = prefix.into();
        self
    }

    pub fn can_archive(&self) -> bool {
        self.archiver.is_some()
    }

    /// Writes one decoded body under its derived name
    pub fn save_single(
        &self,
        file: &PlannedFile<'_>,
        target: &mut dyn SaveTarget,
    ) -> Result<PathBuf, ExportError> {
        let content = decode_body(file.entry)?;
        target.save(&file.path, &content, &file.entry.response.mime_type)
    }

    /// Builds an archive from every planned file and saves it as one blob.
    /// Nothing is written when any member fails.
    pub fn save_archive(
        &self,
        files: &[PlannedFile<'_>],
        target: &mut dyn SaveTarget,
        now: DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        let archiver = self
            .archiver
            .as_deref()
            .ok_or(ExportError::MissingCapability)?;

        let members: Vec<ArchiveMember<'_>> = files
            .iter()
            .map(|file| ArchiveMember {
                path: &file.path,
                content: &file.entry.response.body_text,
                base64: file.entry.response.is_base64,
            })
            .collect();
        let blob = archiver.build(&members)?;

        let name = archive_name(&self.archive_prefix, now);
        tracing::debug!(name = %name, members = members.len(), bytes = blob.len(), "archive built");
        target.save(&name, &blob, ARCHIVE_MIME)
    }
}
