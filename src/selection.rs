//! Entries picked for export, tracked by id.
//!
//! A selection is independent of the filtered view: narrowing or widening the
//! view never drops selected ids, and export always reads entries back from
//! the store.

use crate::parser::{Entry, EntryId};
use crate::store::EntryStore;
use std::collections::HashSet;

/// Tri-state of a view's header checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Checked,
    Unchecked,
    Partial,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<EntryId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: EntryId) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: &EntryId) {
        self.ids.remove(id);
    }

    /// Flips the id and returns whether it is now selected
    pub fn toggle(&mut self, id: &EntryId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    /// Selects every entry in the store, including ones outside the view
    pub fn select_all(&mut self, store: &EntryStore) {
        self.ids
            .extend(store.entries().iter().map(|entry| entry.id.clone()));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selects or deselects everything in `view`
    pub fn set_view(&mut self, view: &[&Entry], checked: bool) {
        for entry in view {
            self.set(&entry.id, checked);
        }
    }

    /// Applies `checked` to the inclusive range between `anchor` and `index`
    /// of `view`. Out-of-range positions are clamped.
    pub fn set_range(&mut self, view: &[&Entry], anchor: usize, index: usize, checked: bool) {
        if view.is_empty() {
            return;
        }
        let last = view.len() - 1;
        let start = anchor.min(index).min(last);
        let end = anchor.max(index).min(last);
        for entry in &view[start..=end] {
            self.set(&entry.id, checked);
        }
    }

    pub fn view_state(&self, view: &[&Entry]) -> ViewState {
        let selected = view.iter().filter(|entry| self.contains(&entry.id)).count();
        match selected {
            0 => ViewState::Unchecked,
            n if n == view.len() => ViewState::Checked,
            _ => ViewState::Partial,
        }
    }

    /// Drops ids whose entries are no longer in the store
    pub fn retain_existing(&mut self, store: &EntryStore) {
        let live: HashSet<&EntryId> = store.entries().iter().map(|entry| &entry.id).collect();
        self.ids.retain(|id| live.contains(id));
    }

    /// Selected entries, looked up in the store and returned in store order.
    /// Ids without a matching entry are ignored.
    pub fn resolve<'a>(&self, store: &'a EntryStore) -> Vec<&'a Entry> {
        store
            .entries()
            .iter()
            .filter(|entry| self.ids.contains(&entry.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn set(&mut self, id: &EntryId, checked: bool) {
        if checked {
            self.ids.insert(id.clone());
        } else {
            self.ids.remove(id);
        }
    }
}

impl FromIterator<EntryId> for Selection {
    fn from_iter<T: IntoIterator<Item = EntryId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
