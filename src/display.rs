//! Terminal and JSON rendering of entries and store summaries.

use crate::parser::Entry;
use crate::store::EntryStore;
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use std::collections::BTreeMap;

const MAX_URL_WIDTH: usize = 72;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Error statuses in red, redirects in yellow, the rest green
pub fn format_status(status: u16) -> ColoredString {
    let text = status.to_string();
    match status {
        400.. => text.red().bold(),
        300..=399 => text.yellow(),
        _ => text.green(),
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}

/// Flat row used for JSON listings
#[derive(Debug, Serialize)]
pub struct EntryRow<'a> {
    pub id: &'a str,
    pub source: &'a str,
    pub time: String,
    pub offset_seconds: f64,
    pub method: &'a str,
    pub status: u16,
    pub mime: &'a str,
    pub url: &'a str,
    pub size_kb: f64,
    pub speed_kbps: f64,
}

impl<'a> EntryRow<'a> {
    pub fn new(entry: &'a Entry, first: Option<DateTime<Local>>) -> Self {
        Self {
            id: entry.id.as_str(),
            source: &entry.source_name,
            time: entry.clock_time(),
            offset_seconds: entry.offset_seconds(first),
            method: &entry.request.method,
            status: entry.response.status,
            mime: &entry.response.mime_type,
            url: &entry.request.url,
            size_kb: entry.size_kb(),
            speed_kbps: entry.throughput_kbps(),
        }
    }
}

pub fn display_entries(
    view: &[&Entry],
    first: Option<DateTime<Local>>,
    total: usize,
    limit: Option<usize>,
) {
    let mut table = create_styled_table(&[
        "Time", "+s", "Status", "Method", "URL", "MIME", "Size KB", "KB/s", "Source", "Id",
    ]);
    let shown = limit.unwrap_or(view.len()).min(view.len());

    for entry in &view[..shown] {
        table.add_row(vec![
            Cell::new(entry.clock_time()),
            Cell::new(format!("{:.2}", entry.offset_seconds(first)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_status(entry.response.status)),
            Cell::new(&entry.request.method),
            Cell::new(shorten(&entry.request.url, MAX_URL_WIDTH)),
            Cell::new(entry.essence_mime()),
            Cell::new(format!("{:.2}", entry.size_kb())).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", entry.throughput_kbps()))
                .set_alignment(CellAlignment::Right),
            Cell::new(&entry.source_name),
            Cell::new(entry.id.as_str()),
        ]);
    }

    if shown > 0 {
        println!("{table}");
    }
    println!(
        "Showing {} of {} matching entries ({} loaded)",
        shown.to_string().green().bold(),
        view.len(),
        total
    );
}

pub fn entries_json(view: &[&Entry], first: Option<DateTime<Local>>, limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(view.len()).min(view.len());
    let rows: Vec<EntryRow<'_>> = view[..shown]
        .iter()
        .map(|entry| EntryRow::new(entry, first))
        .collect();
    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Counts and ranges over everything in a store
#[derive(Debug, Serialize, Default)]
pub struct StoreSummary {
    pub total_entries: usize,
    pub sources: BTreeMap<String, usize>,
    pub statuses: BTreeMap<u16, usize>,
    pub mime_types: BTreeMap<String, usize>,
    pub earliest: Option<DateTime<Local>>,
    pub latest: Option<DateTime<Local>>,
    pub total_size_kb: f64,
}

impl StoreSummary {
    pub fn from_store(store: &EntryStore) -> Self {
        let mut summary = StoreSummary {
            total_entries: store.len(),
            earliest: store.first_entry_time(),
            ..Default::default()
        };
        for source in store.sources() {
            summary.sources.insert(source.clone(), 0);
        }
        for entry in store.entries() {
            *summary.sources.entry(entry.source_name.clone()).or_insert(0) += 1;
            *summary.statuses.entry(entry.response.status).or_insert(0) += 1;
            let mime = entry.essence_mime();
            let mime = if mime.is_empty() { "(none)".to_string() } else { mime };
            *summary.mime_types.entry(mime).or_insert(0) += 1;
            summary.total_size_kb += entry.size_kb();
            summary.latest = summary.latest.max(Some(entry.started_at));
        }
        summary
    }

    pub fn span_seconds(&self) -> Option<f64> {
        let (earliest, latest) = (self.earliest?, self.latest?);
        Some((latest - earliest).num_milliseconds() as f64 / 1000.0)
    }
}

pub fn display_summary(summary: &StoreSummary) {
    println!("{}", "=".repeat(80).bright_white());
    println!("{}", "HAR SUMMARY".bold().bright_white());
    println!("{}", "=".repeat(80).bright_white());
    println!(
        "Total entries: {}   Total size: {:.2} KB",
        summary.total_entries.to_string().green().bold(),
        summary.total_size_kb
    );

    let print_counts = |title: &str, rows: Vec<(String, usize)>| {
        if rows.is_empty() {
            return;
        }
        println!("\n{}", title.bold());
        println!("{}", "-".repeat(80).bright_black());
        let mut table = create_styled_table(&["Name", "Count", "Percent"]);
        for (name, count) in rows {
            let percentage = if summary.total_entries == 0 {
                0.0
            } else {
                count as f64 / summary.total_entries as f64 * 100.0
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(count),
                Cell::new(format!("{percentage:>6.2}%")),
            ]);
        }
        println!("{table}");
    };

    print_counts(
        "SOURCES",
        summary.sources.iter().map(|(k, v)| (k.clone(), *v)).collect(),
    );
    print_counts(
        "STATUS CODES",
        summary
            .statuses
            .iter()
            .map(|(k, v)| (format_status(*k).to_string(), *v))
            .collect(),
    );
    let mut mimes: Vec<(String, usize)> =
        summary.mime_types.iter().map(|(k, v)| (k.clone(), *v)).collect();
    mimes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    print_counts("MIME TYPES", mimes);

    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        println!("\n{}", "TIME RANGE".bold());
        println!("{}", "-".repeat(80).bright_black());
        println!("  Earliest: {}", earliest.to_string().cyan());
        println!("  Latest:   {}", latest.to_string().cyan());
        if let Some(span) = summary.span_seconds() {
            println!("  Span:     {}", format!("{span:.3}s").green());
        }
    }
}
