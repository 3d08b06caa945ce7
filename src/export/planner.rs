//! Collision-free assignment of destination paths to exported entries.

use super::path::{PathDeriver, extension_start};
use crate::parser::Entry;
use std::collections::{HashMap, HashSet};

/// Digits used for collision suffixes unless configured otherwise
pub const DEFAULT_PADDING: usize = 3;

/// What to do when several entries derive the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateStrategy {
    /// Keep every entry; colliding paths get numeric suffixes
    #[default]
    KeepAll,
    /// Keep the entry that started last
    KeepLatest,
    /// Keep the entry that started first
    KeepOldest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub preserve_hierarchy: bool,
    pub strategy: DuplicateStrategy,
    pub padding: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            preserve_hierarchy: false,
            strategy: DuplicateStrategy::KeepAll,
            padding: DEFAULT_PADDING,
        }
    }
}

/// One resolved output file
#[derive(Debug, Clone)]
pub struct PlannedFile<'a> {
    pub path: String,
    pub entry: &'a Entry,
}

/// Assigns a unique path to every surviving entry.
///
/// Entries are ordered by start time first; entries with equal start times
/// keep the order they were passed in. A single entry always gets its bare
/// derived filename.
pub fn plan_export<'a>(
    entries: &[&'a Entry],
    options: &ExportOptions,
    deriver: &PathDeriver,
) -> Vec<PlannedFile<'a>> {
    if let [entry] = entries {
        return vec![PlannedFile {
            path: deriver.derive(entry, false),
            entry: *entry,
        }];
    }

    let mut ordered: Vec<&'a Entry> = entries.to_vec();
    ordered.sort_by_key(|entry| entry.started_at);

    let derived: Vec<(String, &'a Entry)> = ordered
        .into_iter()
        .map(|entry| (deriver.derive(entry, options.preserve_hierarchy), entry))
        .collect();

    let survivors = match options.strategy {
        DuplicateStrategy::KeepAll => derived,
        strategy => deduplicate(derived, strategy),
    };

    number_collisions(survivors, options.padding)
}

/// Keeps one entry per derived path. Survivors are listed in the order their
/// path first appeared; on equal start times the first entry seen wins.
fn deduplicate<'a>(
    derived: Vec<(String, &'a Entry)>,
    strategy: DuplicateStrategy,
) -> Vec<(String, &'a Entry)> {
    let mut survivors: Vec<(String, &'a Entry)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let total = derived.len();

    for (path, entry) in derived {
        match slots.get(&path) {
            None => {
                slots.insert(path.clone(), survivors.len());
                survivors.push((path, entry));
            }
            Some(&slot) => {
                let current = survivors[slot].1;
                let replace = match strategy {
                    DuplicateStrategy::KeepLatest => entry.started_at > current.started_at,
                    DuplicateStrategy::KeepOldest => entry.started_at < current.started_at,
                    DuplicateStrategy::KeepAll => false,
                };
                if replace {
                    survivors[slot].1 = entry;
                }
            }
        }
    }

    tracing::debug!(
        strategy = ?strategy,
        before = total,
        after = survivors.len(),
        "duplicates resolved"
    );
    survivors
}

/// Appends `_NNN` before the extension of every path used more than once.
///
/// Paths used exactly once are reserved up front so a generated name never
/// shadows a naturally derived one.
fn number_collisions<'a>(
    survivors: Vec<(String, &'a Entry)>,
    padding: usize,
) -> Vec<PlannedFile<'a>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (path, _) in &survivors {
        *counts.entry(path.as_str()).or_insert(0) += 1;
    }

    let mut used: HashSet<String> = counts
        .iter()
        .filter(|(_, count)| **count == 1)
        .map(|(path, _)| path.to_string())
        .collect();
    let repeated: HashSet<String> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(path, _)| path.to_string())
        .collect();

    let mut next_index: HashMap<String, usize> = HashMap::new();
    let mut planned = Vec::with_capacity(survivors.len());

    for (path, entry) in survivors {
        if !repeated.contains(&path) {
            planned.push(PlannedFile { path, entry });
            continue;
        }

        let index = next_index.entry(path.clone()).or_insert(0);
        let numbered = loop {
            let candidate = numbered_path(&path, *index, padding);
            *index += 1;
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        tracing::debug!(derived = %path, numbered = %numbered, "path collision numbered");
        used.insert(numbered.clone());
        planned.push(PlannedFile {
            path: numbered,
            entry,
        });
    }

    planned
}

/// `dir/img.png` + 1 with padding 3 → `dir/img_001.png`
pub fn numbered_path(path: &str, index: usize, padding: usize) -> String {
    let (base, ext) = match extension_start(path) {
        Some(dot) => path.split_at(dot),
        None => (path, ""),
    };
    format!("{base}_{index:0padding$}{ext}")
}
