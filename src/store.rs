//! In-memory collection of entries merged from every loaded capture.

use crate::parser::{Entry, EntryId, ParseError, parse_har_bytes, source_name_for};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::path::Path;

/// Status codes offered even when no capture contains them
pub const DEFAULT_STATUSES: [u16; 16] = [
    200, 300, 301, 302, 303, 304, 400, 401, 403, 404, 405, 414, 418, 500, 502, 503,
];

/// Result of ingesting one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The source was new; this many entries were added
    Added(usize),
    /// A source with the same name is already loaded
    AlreadyLoaded,
}

/// Owns all entries of all loaded sources, ascending by start time.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
    sources: Vec<String>,
    first_entry_time: Option<DateTime<Local>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `raw` and merges its entries into the store.
    ///
    /// Nothing changes when decoding fails or the source is already loaded.
    pub fn ingest(&mut self, source_name: &str, raw: &[u8]) -> Result<IngestOutcome, ParseError> {
        if self.has_source(source_name) {
            tracing::debug!(source = source_name, "source already loaded, skipping");
            return Ok(IngestOutcome::AlreadyLoaded);
        }
        let entries = parse_har_bytes(source_name, raw)?;
        let added = entries.len();
        self.commit(source_name.to_string(), entries);
        self.finish_ingest();
        Ok(IngestOutcome::Added(added))
    }

    /// Ingests several sources as one unit: every source is decoded before any
    /// is merged, so a single failure leaves the store untouched.
    pub fn ingest_batch<N, B>(&mut self, batch: &[(N, B)]) -> Result<Vec<IngestOutcome>, ParseError>
    where
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut pending: Vec<(String, Vec<Entry>)> = Vec::new();
        let mut outcomes = Vec::with_capacity(batch.len());

        for (name, raw) in batch {
            let name = name.as_ref();
            if self.has_source(name) || pending.iter().any(|(pending_name, _)| pending_name == name) {
                outcomes.push(IngestOutcome::AlreadyLoaded);
                continue;
            }
            let entries = parse_har_bytes(name, raw.as_ref())?;
            outcomes.push(IngestOutcome::Added(entries.len()));
            pending.push((name.to_string(), entries));
        }

        if pending.is_empty() {
            return Ok(outcomes);
        }
        for (name, entries) in pending {
            self.commit(name, entries);
        }
        self.finish_ingest();
        Ok(outcomes)
    }

    /// Reads one capture file from disk; the source name is its file name.
    pub fn ingest_path(&mut self, path: impl AsRef<Path>) -> Result<IngestOutcome, ParseError> {
        let (name, bytes) = read_source(path.as_ref())?;
        self.ingest(&name, &bytes)
    }

    /// Reads capture files from disk and ingests them as one batch.
    pub fn ingest_paths<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
    ) -> Result<Vec<IngestOutcome>, ParseError> {
        let batch = paths
            .iter()
            .map(|path| read_source(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.ingest_batch(&batch)
    }

    /// Drops a source and all of its entries. No-op for unknown sources.
    pub fn remove(&mut self, source_name: &str) {
        let Some(position) = self.sources.iter().position(|s| s == source_name) else {
            return;
        };
        self.sources.remove(position);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.source_name != source_name);
        self.first_entry_time = self.compute_first_entry_time();
        tracing::info!(
            source = source_name,
            removed = before - self.entries.len(),
            "source removed"
        );
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Loaded source names in insertion order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn has_source(&self, source_name: &str) -> bool {
        self.sources.iter().any(|s| s == source_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest start time across all sources, `None` when empty
    pub fn first_entry_time(&self) -> Option<DateTime<Local>> {
        self.first_entry_time
    }

    /// `defaults` merged with every status seen in the store, ascending
    pub fn available_statuses(&self, defaults: &[u16]) -> Vec<u16> {
        let mut codes: BTreeSet<u16> = defaults.iter().copied().collect();
        codes.extend(self.entries.iter().map(|entry| entry.response.status));
        codes.into_iter().collect()
    }

    fn commit(&mut self, source_name: String, mut entries: Vec<Entry>) {
        tracing::info!(source = %source_name, entries = entries.len(), "source loaded");
        self.entries.append(&mut entries);
        self.sources.push(source_name);
    }

    fn finish_ingest(&mut self) {
        // `sort_by_key` is stable: ties keep ingestion order.
        self.entries.sort_by_key(|entry| entry.started_at);
        self.first_entry_time = self.compute_first_entry_time();
    }

    fn compute_first_entry_time(&self) -> Option<DateTime<Local>> {
        self.entries.iter().map(|entry| entry.started_at).min()
    }
}

fn read_source(path: &Path) -> Result<(String, Vec<u8>), ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok((source_name_for(path), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn har(entries: &[(&str, &str)]) -> String {
        let items: Vec<String> = entries
            .iter()
            .map(|(ts, url)| {
                format!(
                    r#"{{"startedDateTime":"{ts}","time":10,"request":{{"url":"{url}"}},"response":{{"status":200,"content":{{"mimeType":"text/plain"}}}}}}"#
                )
            })
            .collect();
        format!(r#"{{"log":{{"entries":[{}]}}}}"#, items.join(","))
    }

    #[test]
    fn test_ingest_sorts_across_sources() {
        let mut store = EntryStore::new();
        let a = har(&[
            ("2026-01-01T10:00:02Z", "https://a.com/2"),
            ("2026-01-01T10:00:00Z", "https://a.com/0"),
        ]);
        let b = har(&[("2026-01-01T10:00:01Z", "https://b.com/1")]);

        assert_eq!(store.ingest("a.har", a.as_bytes()).unwrap(), IngestOutcome::Added(2));
        assert_eq!(store.ingest("b.har", b.as_bytes()).unwrap(), IngestOutcome::Added(1));

        let urls: Vec<&str> = store.entries().iter().map(|e| e.request.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/0", "https://b.com/1", "https://a.com/2"]);
        assert_eq!(store.first_entry_time(), Some(store.entries()[0].started_at));
        assert_eq!(store.sources(), &["a.har".to_string(), "b.har".to_string()]);
    }

    #[test]
    fn test_ingest_same_source_twice_is_noop() {
        let mut store = EntryStore::new();
        let a = har(&[("2026-01-01T10:00:00Z", "https://a.com/")]);
        store.ingest("a.har", a.as_bytes()).unwrap();
        assert_eq!(
            store.ingest("a.har", a.as_bytes()).unwrap(),
            IngestOutcome::AlreadyLoaded
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ties_keep_ingestion_order() {
        let mut store = EntryStore::new();
        let same = "2026-01-01T10:00:00Z";
        store
            .ingest("a.har", har(&[(same, "https://a.com/")]).as_bytes())
            .unwrap();
        store
            .ingest("b.har", har(&[(same, "https://b.com/")]).as_bytes())
            .unwrap();
        assert_eq!(store.entries()[0].source_name, "a.har");
        assert_eq!(store.entries()[1].source_name, "b.har");
    }

    #[test]
    fn test_remove_recomputes_first_entry_time() {
        let mut store = EntryStore::new();
        store
            .ingest("a.har", har(&[("2026-01-01T10:00:00Z", "https://a.com/")]).as_bytes())
            .unwrap();
        store
            .ingest("b.har", har(&[("2026-01-01T10:00:05Z", "https://b.com/")]).as_bytes())
            .unwrap();

        store.remove("a.har");
        assert_eq!(store.len(), 1);
        assert_eq!(store.first_entry_time(), Some(store.entries()[0].started_at));
        assert!(!store.has_source("a.har"));

        store.remove("b.har");
        assert!(store.is_empty());
        assert_eq!(store.first_entry_time(), None);

        store.remove("missing.har");
        assert!(store.sources().is_empty());
    }

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let mut store = EntryStore::new();
        store
            .ingest("a.har", har(&[("2026-01-01T10:00:00Z", "https://a.com/")]).as_bytes())
            .unwrap();

        let good = har(&[("2026-01-01T09:00:00Z", "https://b.com/")]);
        let batch = vec![("b.har", good.into_bytes()), ("c.har", b"garbage".to_vec())];
        assert!(store.ingest_batch(&batch).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.sources(), &["a.har".to_string()]);
        assert_eq!(store.entries()[0].request.url, "https://a.com/");
    }

    #[test]
    fn test_available_statuses_merge_defaults() {
        let mut store = EntryStore::new();
        store
            .ingest("a.har", har(&[("2026-01-01T10:00:00Z", "https://a.com/")]).as_bytes())
            .unwrap();
        assert_eq!(store.available_statuses(&[404, 301]), vec![200, 301, 404]);
    }
}
