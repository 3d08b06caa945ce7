use super::criteria::{Criteria, TimeWindow};
use crate::parser::Entry;
use crate::store::EntryStore;
use chrono::{DateTime, Local};

impl Criteria {
    /// Check an entry against every set clause.
    ///
    /// `first_entry_time` is the store-wide reference point for relative
    /// time windows.
    pub fn matches(&self, entry: &Entry, first_entry_time: Option<DateTime<Local>>) -> bool {
        let status_match =
            self.statuses().is_empty() || self.statuses().contains(&entry.response.status);
        if !status_match {
            return false;
        }

        let keywords = self.url_keywords();
        if !keywords.is_empty() {
            let url = entry.request.url.to_lowercase();
            if !keywords.iter().any(|keyword| url.contains(keyword.as_str())) {
                return false;
            }
        }

        let mime = self.mime().trim();
        if !mime.is_empty()
            && !entry
                .response
                .mime_type
                .to_lowercase()
                .contains(&mime.to_lowercase())
        {
            return false;
        }

        let size_match = self
            .size()
            .map(|threshold| threshold.accepts(entry.size_kb()))
            .unwrap_or(true);

        let speed_match = self
            .speed()
            .map(|threshold| threshold.accepts(entry.throughput_kbps()))
            .unwrap_or(true);

        size_match && speed_match && time_window_matches(self.time_window(), entry, first_entry_time)
    }
}

fn time_window_matches(
    window: &TimeWindow,
    entry: &Entry,
    first_entry_time: Option<DateTime<Local>>,
) -> bool {
    match window {
        TimeWindow::Clock { start, end } => {
            let clock = entry.clock_time();
            let after_start = start.as_deref().is_none_or(|start| clock.as_str() >= start);
            let before_end = end.as_deref().is_none_or(|end| clock.as_str() <= end);
            after_start && before_end
        }
        TimeWindow::RelativeSeconds { start, end } => {
            let elapsed = entry.offset_seconds(first_entry_time);
            let after_start = start.is_none_or(|start| elapsed >= start);
            let before_end = end.is_none_or(|end| elapsed <= end);
            after_start && before_end
        }
    }
}

/// Returns the entries of `store` that satisfy `criteria`, in store order.
pub fn filter_entries<'a>(store: &'a EntryStore, criteria: &Criteria) -> Vec<&'a Entry> {
    let first = store.first_entry_time();
    let view: Vec<&Entry> = store
        .entries()
        .iter()
        .filter(|entry| criteria.matches(entry, first))
        .collect();
    tracing::debug!(total = store.len(), matched = view.len(), "filter applied");
    view
}
