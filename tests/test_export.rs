use chrono::{Local, TimeZone};
use harpic::export::{
    ArchiveMember, Archiver, DirectoryTarget, ExportError, ExportOptions, ExportOutcome, Packager,
    PathDeriver, SaveTarget, export_selection,
};
use harpic::{EntryStore, Selection};
use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use tempfile::tempdir;

const CAPTURE: &str = r#"{"log":{"entries":[
    {"startedDateTime":"2026-01-01T10:00:00Z","time":120,
     "request":{"method":"GET","url":"https://a.com/"},
     "response":{"status":200,"content":{"mimeType":"text/html; charset=utf-8","text":"<h1>hi</h1>"}}},
    {"startedDateTime":"2026-01-01T10:00:01Z","time":40,
     "request":{"method":"GET","url":"https://a.com/img/logo"},
     "response":{"status":200,"content":{"mimeType":"image/png","text":"iVBORw0KGgo=","encoding":"base64"}}},
    {"startedDateTime":"2026-01-01T10:00:02Z","time":40,
     "request":{"method":"GET","url":"https://b.com/img/logo"},
     "response":{"status":200,"content":{"mimeType":"image/png","text":"AAEC","encoding":"base64"}}}
]}}"#;

fn store() -> EntryStore {
    let mut store = EntryStore::new();
    store.ingest("cap.har", CAPTURE.as_bytes()).unwrap();
    store
}

fn noon() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 1, 12, 34, 56).unwrap()
}

/// Records saves in memory
#[derive(Default)]
struct MemoryTarget {
    saved: Vec<(String, Vec<u8>, String)>,
}

impl SaveTarget for MemoryTarget {
    fn save(&mut self, name: &str, content: &[u8], mime: &str) -> Result<PathBuf, ExportError> {
        self.saved
            .push((name.to_string(), content.to_vec(), mime.to_string()));
        Ok(PathBuf::from(name))
    }
}

fn read_member(blob: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(blob.to_vec())).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    out
}

#[test]
fn test_empty_selection_is_a_noop() {
    let store = store();
    let mut target = MemoryTarget::default();

    let outcome = export_selection(
        &store,
        &Selection::new(),
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::default(),
        &mut target,
        noon(),
    )
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Empty);
    assert!(target.saved.is_empty());
}

#[test]
fn test_single_entry_saved_with_decoded_body() {
    let store = store();
    let mut selection = Selection::new();
    selection.select(store.entries()[1].id.clone());
    let mut target = MemoryTarget::default();

    let outcome = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::default(),
        &mut target,
        noon(),
    )
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Single(PathBuf::from("logo.png")));
    let (name, content, mime) = &target.saved[0];
    assert_eq!(name, "logo.png");
    assert_eq!(content, &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    assert_eq!(mime, "image/png");
}

#[test]
fn test_multiple_entries_packaged_as_zip() {
    let store = store();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = MemoryTarget::default();

    let outcome = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::default(),
        &mut target,
        noon(),
    )
    .unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Archive {
            path: PathBuf::from("harpic_123456"),
            members: 3
        }
    );
    let (name, blob, mime) = &target.saved[0];
    assert_eq!(name, "harpic_123456");
    assert_eq!(mime, "application/zip");

    assert_eq!(read_member(blob, "index.html"), b"<h1>hi</h1>");
    assert_eq!(read_member(blob, "logo_001.png"), vec![0u8, 1, 2]);
    assert_eq!(read_member(blob, "logo_000.png").len(), 8);
}

#[test]
fn test_archive_with_hierarchy_and_custom_prefix() {
    let store = store();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = MemoryTarget::default();
    let options = ExportOptions {
        preserve_hierarchy: true,
        ..ExportOptions::default()
    };

    export_selection(
        &store,
        &selection,
        &options,
        &PathDeriver::default(),
        &Packager::default().with_archive_prefix("dump"),
        &mut target,
        noon(),
    )
    .unwrap();

    let (name, blob, _) = &target.saved[0];
    assert_eq!(name, "dump_123456");
    assert_eq!(read_member(blob, "b.com/img/logo.png"), vec![0u8, 1, 2]);
    assert_eq!(read_member(blob, "a.com/index.html"), b"<h1>hi</h1>");
}

#[test]
fn test_missing_archiver_fails_without_output() {
    let store = store();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = MemoryTarget::default();

    let err = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::without_archiver(),
        &mut target,
        noon(),
    )
    .unwrap_err();

    assert!(matches!(err, ExportError::MissingCapability));
    assert!(target.saved.is_empty());
}

#[test]
fn test_single_entry_works_without_archiver() {
    let store = store();
    let mut selection = Selection::new();
    selection.select(store.entries()[0].id.clone());
    let mut target = MemoryTarget::default();

    let outcome = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::without_archiver(),
        &mut target,
        noon(),
    )
    .unwrap();
    assert_eq!(outcome, ExportOutcome::Single(PathBuf::from("index.html")));
}

#[test]
fn test_custom_archiver_receives_raw_members() {
    struct Listing;
    impl Archiver for Listing {
        fn build(&self, members: &[ArchiveMember<'_>]) -> Result<Vec<u8>, ExportError> {
            let lines: Vec<String> = members
                .iter()
                .map(|m| format!("{} {} {}", m.path, m.base64, m.content))
                .collect();
            Ok(lines.join("\n").into_bytes())
        }
    }

    let store = store();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = MemoryTarget::default();

    export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::new(Some(Box::new(Listing))),
        &mut target,
        noon(),
    )
    .unwrap();

    let listing = String::from_utf8(target.saved[0].1.clone()).unwrap();
    assert_eq!(
        listing,
        "index.html false <h1>hi</h1>\nlogo_000.png true iVBORw0KGgo=\nlogo_001.png true AAEC"
    );
}

#[test]
fn test_directory_target_writes_zip_file() {
    let dir = tempdir().unwrap();
    let store = store();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = DirectoryTarget::new(dir.path().join("out"));

    let outcome = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::default(),
        &mut target,
        noon(),
    )
    .unwrap();

    let expected = dir.path().join("out").join("harpic_123456.zip");
    assert_eq!(
        outcome,
        ExportOutcome::Archive {
            path: expected.clone(),
            members: 3
        }
    );
    let blob = fs::read(&expected).unwrap();
    assert_eq!(read_member(&blob, "index.html"), b"<h1>hi</h1>");
}

#[test]
fn test_invalid_base64_body_is_reported() {
    let har = r#"{"log":{"entries":[
        {"startedDateTime":"2026-01-01T10:00:00Z","request":{"url":"https://a.com/x.bin"},
         "response":{"status":200,"content":{"mimeType":"application/octet-stream","text":"%%%","encoding":"base64"}}}
    ]}}"#;
    let mut store = EntryStore::new();
    store.ingest("bad.har", har.as_bytes()).unwrap();
    let mut selection = Selection::new();
    selection.select_all(&store);

    let err = export_selection(
        &store,
        &selection,
        &ExportOptions::default(),
        &PathDeriver::default(),
        &Packager::default(),
        &mut MemoryTarget::default(),
        noon(),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::InvalidBase64 { .. }));
}

#[test]
fn test_archive_members_stay_inside_the_archive_root() {
    let capture = r#"{"log":{"entries":[
        {"startedDateTime":"2026-01-01T10:00:00Z","request":{"url":"data:../../../evil"},
         "response":{"status":200,"content":{"mimeType":"text/plain","text":"x"}}},
        {"startedDateTime":"2026-01-01T10:00:01Z","request":{"url":"https://a.com/ok.txt"},
         "response":{"status":200,"content":{"mimeType":"text/plain","text":"ok"}}}
    ]}}"#;
    let mut store = EntryStore::new();
    store.ingest("odd.har", capture.as_bytes()).unwrap();
    let mut selection = Selection::new();
    selection.select_all(&store);
    let mut target = MemoryTarget::default();
    let options = ExportOptions {
        preserve_hierarchy: true,
        ..ExportOptions::default()
    };

    export_selection(
        &store,
        &selection,
        &options,
        &PathDeriver::default(),
        &Packager::default(),
        &mut target,
        noon(),
    )
    .unwrap();

    let (_, blob, _) = &target.saved[0];
    let archive = zip::ZipArchive::new(Cursor::new(blob.clone())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["a.com/ok.txt", "evil.txt"]);
    assert_eq!(read_member(blob, "evil.txt"), b"x");
}
