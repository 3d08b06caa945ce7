//! Export of selected entries.
//!
//! The pipeline is: resolve the selection against the store, derive a path
//! per entry, resolve duplicates and collisions, then either save one file or
//! package everything into an archive.
//!
//! ```text
//! 1 entry   → <derived filename>          (e.g. index.html)
//! N entries → harpic_HHMMSS.zip           (members at their planned paths)
//! ```

pub mod error;
pub mod mime;
pub mod package;
pub mod path;
pub mod planner;

pub use error::ExportError;
pub use mime::MimeTable;
pub use package::{
    ARCHIVE_MIME, ArchiveMember, Archiver, DEFAULT_ARCHIVE_PREFIX, DirectoryTarget, Packager,
    SaveTarget, ZipArchiver, archive_name, decode_body,
};
pub use path::{PathDeriver, derive_path};
pub use planner::{
    DEFAULT_PADDING, DuplicateStrategy, ExportOptions, PlannedFile, numbered_path, plan_export,
};

use crate::selection::Selection;
use crate::store::EntryStore;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Result of one export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing was selected; nothing was written
    Empty,
    /// One entry saved under its bare filename
    Single(PathBuf),
    /// Several entries packaged into one archive
    Archive { path: PathBuf, members: usize },
}

/// Everything an export needs besides the data itself
pub struct Exporter<'a> {
    pub options: ExportOptions,
    pub deriver: &'a PathDeriver,
    pub packager: &'a Packager,
}

impl Exporter<'_> {
    /// Exports the selected entries, reading them back from `store`.
    pub fn export(
        &self,
        store: &EntryStore,
        selection: &Selection,
        target: &mut dyn SaveTarget,
        now: DateTime<Local>,
    ) -> Result<ExportOutcome, ExportError> {
        let entries = selection.resolve(store);
        if entries.is_empty() {
            tracing::info!("nothing selected for export");
            return Ok(ExportOutcome::Empty);
        }
        if entries.len() > 1 && !self.packager.can_archive() {
            return Err(ExportError::MissingCapability);
        }

        let planned = plan_export(&entries, &self.options, self.deriver);
        // Mode follows the selection size, so a deduplicated batch is still an archive
        if let ([_], [file]) = (entries.as_slice(), planned.as_slice()) {
            let path = self.packager.save_single(file, target)?;
            return Ok(ExportOutcome::Single(path));
        }

        let path = self.packager.save_archive(&planned, target, now)?;
        Ok(ExportOutcome::Archive {
            path,
            members: planned.len(),
        })
    }
}

/// Convenience wrapper around [`Exporter::export`]
pub fn export_selection(
    store: &EntryStore,
    selection: &Selection,
    options: &ExportOptions,
    deriver: &PathDeriver,
    packager: &Packager,
    target: &mut dyn SaveTarget,
    now: DateTime<Local>,
) -> Result<ExportOutcome, ExportError> {
    Exporter {
        options: *options,
        deriver,
        packager,
    }
    .export(store, selection, target, now)
}
