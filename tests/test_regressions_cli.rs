use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_harpic")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

const CAPTURE: &str = r#"{"log":{"entries":[
    {"startedDateTime":"2026-01-01T10:00:00Z","time":50,
     "request":{"method":"GET","url":"https://a.com/"},
     "response":{"status":200,"_transferSize":900,"content":{"mimeType":"text/html","text":"<p>home</p>"}}},
    {"startedDateTime":"2026-01-01T10:00:01Z","time":80,
     "request":{"method":"GET","url":"https://a.com/static/app.js"},
     "response":{"status":200,"_transferSize":4096,"content":{"mimeType":"application/javascript","text":"let a = 1;"}}},
    {"startedDateTime":"2026-01-01T10:00:02Z","time":80,
     "request":{"method":"GET","url":"https://b.com/static/app.js"},
     "response":{"status":200,"_transferSize":4096,"content":{"mimeType":"application/javascript","text":"let b = 2;"}}},
    {"startedDateTime":"2026-01-01T10:00:03Z","time":30,
     "request":{"method":"GET","url":"https://a.com/missing"},
     "response":{"status":404,"content":{"mimeType":"text/plain","text":"nope"}}}
]}}"#;

fn capture(dir: &Path) -> PathBuf {
    let path = dir.join("session.har");
    write_file(&path, CAPTURE);
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("HARPIC_CONFIG")
        .output()
        .expect("command should run")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn only_file(dir: &Path) -> PathBuf {
    let files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect();
    assert_eq!(files.len(), 1, "expected one output file, got {files:?}");
    files.into_iter().next().expect("one file")
}

#[test]
fn test_list_json_applies_filters() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());

    let output = run(&[
        "-F",
        "json",
        "list",
        har.to_str().expect("utf8 path"),
        "--mime",
        "javascript",
        "--url",
        "b.com",
    ]);
    assert_success(&output);

    let rows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let rows = rows.as_array().expect("array of rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["url"], "https://b.com/static/app.js");
    assert_eq!(rows[0]["status"], 200);
    assert_eq!(rows[0]["source"], "session.har");
}

#[test]
fn test_list_text_shows_counts() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());

    let output = run(&[
        "--color",
        "never",
        "list",
        har.to_str().expect("utf8 path"),
        "-s",
        "404",
    ]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("https://a.com/missing"), "{stdout}");
    assert!(stdout.contains("Showing 1 of 1 matching entries (4 loaded)"), "{stdout}");
    assert!(stdout.contains("Filter: status=404"), "{stdout}");
}

#[test]
fn test_info_json_summary() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());

    let output = run(&["-F", "json", "info", har.to_str().expect("utf8 path")]);
    assert_success(&output);

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(summary["total_entries"], 4);
    assert_eq!(summary["sources"]["session.har"], 4);
    assert_eq!(summary["statuses"]["200"], 3);
    assert_eq!(summary["mime_types"]["application/javascript"], 2);
}

#[test]
fn test_query_prints_share_link() {
    let output = run(&[
        "query",
        "--query",
        "mime=image&status=200",
        "--size",
        "50",
        "--base",
        "https://tool.local/",
    ]);
    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "https://tool.local/?mime=image&status=200&size=50&sizeMode=gte"
    );
}

#[test]
fn test_invalid_filter_fails_with_message() {
    let output = run(&["query", "--start", "noon"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid filter"), "{stderr}");
    assert!(stderr.contains("noon"), "{stderr}");
}

#[test]
fn test_export_single_entry_writes_bare_file() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");

    let output = run(&[
        "export",
        har.to_str().expect("utf8 path"),
        "-s",
        "404",
        "--hierarchy",
        "-o",
        out.to_str().expect("utf8 path"),
    ]);
    assert_success(&output);

    let file = only_file(&out);
    assert_eq!(file.file_name().and_then(|n| n.to_str()), Some("missing.txt"));
    assert_eq!(fs::read_to_string(file).expect("read export"), "nope");
}

#[test]
fn test_export_filtered_view_as_zip() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");

    let output = run(&[
        "export",
        har.to_str().expect("utf8 path"),
        "--mime",
        "javascript",
        "-o",
        out.to_str().expect("utf8 path"),
    ]);
    assert_success(&output);

    let zip_path = only_file(&out);
    let name = zip_path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name")
        .to_string();
    assert!(name.starts_with("harpic_") && name.ends_with(".zip"), "{name}");

    let mut archive =
        zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["app_000.js", "app_001.js"]);

    let mut content = String::new();
    archive
        .by_name("app_001.js")
        .expect("member")
        .read_to_string(&mut content)
        .expect("read member");
    assert_eq!(content, "let b = 2;");
}

#[test]
fn test_export_latest_strategy_from_config() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");
    let config = dir.path().join("harpic.toml");
    write_file(
        &config,
        "[export]\nstrategy = \"latest\"\narchive_prefix = \"cap\"\n",
    );

    let output = run(&[
        "--config",
        config.to_str().expect("utf8 path"),
        "export",
        har.to_str().expect("utf8 path"),
        "--all",
        "-o",
        out.to_str().expect("utf8 path"),
    ]);
    assert_success(&output);

    let zip_path = only_file(&out);
    let name = zip_path.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("cap_"), "{name}");

    let mut archive =
        zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["app.js", "index.html", "missing.txt"]);

    let mut content = String::new();
    archive
        .by_name("app.js")
        .expect("member")
        .read_to_string(&mut content)
        .expect("read member");
    assert_eq!(content, "let b = 2;");
}

#[test]
fn test_export_without_archiver_fails() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");
    let config = dir.path().join("harpic.toml");
    write_file(&config, "[export]\narchive_format = \"none\"\n");

    let output = run(&[
        "--config",
        config.to_str().expect("utf8 path"),
        "export",
        har.to_str().expect("utf8 path"),
        "-o",
        out.to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no archive writer"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn test_export_empty_view_writes_nothing() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");

    let output = run(&[
        "export",
        har.to_str().expect("utf8 path"),
        "-s",
        "500",
        "-o",
        out.to_str().expect("utf8 path"),
    ]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Nothing selected"));
    assert!(!out.exists());
}

#[test]
fn test_unknown_id_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());

    let output = run(&["export", har.to_str().expect("utf8 path"), "--id", "bogus_9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bogus_9"));
}

#[test]
fn test_broken_capture_reports_source() {
    let dir = tempdir().expect("temp dir");
    let bad = dir.path().join("broken.har");
    write_file(&bad, "{\"log\": ");

    let output = run(&["list", bad.to_str().expect("utf8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load HAR files"), "{stderr}");
    assert!(stderr.contains("broken.har"), "{stderr}");
}

#[test]
fn test_ids_before_files_select_entries() {
    let dir = tempdir().expect("temp dir");
    let har = capture(dir.path());
    let out = dir.path().join("out");
    let first = harpic::EntryId::new("session.har", 0);
    let last = harpic::EntryId::new("session.har", 3);

    let output = run(&[
        "export",
        "--id",
        first.as_str(),
        "--id",
        last.as_str(),
        "-o",
        out.to_str().expect("utf8 path"),
        har.to_str().expect("utf8 path"),
    ]);
    assert_success(&output);

    let zip_path = only_file(&out);
    let archive =
        zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["index.html", "missing.txt"]);
}
