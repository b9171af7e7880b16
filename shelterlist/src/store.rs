use std::sync::Arc;

use crate::AnimalRecord;

/// The ordered records currently known to the UI plus pagination bookkeeping.
///
/// Only [`crate::FetchOrchestrator`] mutates a store. Items are kept behind an `Arc` so that
/// [`PageSnapshot`]s handed to renderers stay valid (and unchanged) while later pages arrive.
#[derive(Clone, Debug)]
pub struct ListStore {
    items: Arc<Vec<AnimalRecord>>,
    page_no: u32,
    has_more: bool,
}

impl Default for ListStore {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            page_no: 1,
            has_more: true,
        }
    }
}

impl ListStore {
    pub fn items(&self) -> &[AnimalRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_no(&self) -> u32 {
        self.page_no
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn get(&self, index: usize) -> Option<&AnimalRecord> {
        self.items.get(index)
    }

    pub fn position_of(&self, desertion_no: &str) -> Option<usize> {
        self.items.iter().position(|r| r.desertion_no == desertion_no)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            items: Arc::clone(&self.items),
            page_no: self.page_no,
            has_more: self.has_more,
        }
    }

    pub(crate) fn clear(&mut self) {
        // Drop our reference instead of truncating so outstanding snapshots keep their view.
        self.items = Arc::new(Vec::new());
        self.page_no = 1;
        self.has_more = true;
    }

    pub(crate) fn set_page_no(&mut self, page_no: u32) {
        self.page_no = page_no.max(1);
    }

    pub(crate) fn replace(&mut self, items: Vec<AnimalRecord>, has_more: bool) {
        self.items = Arc::new(items);
        self.has_more = has_more;
    }

    pub(crate) fn append(&mut self, items: Vec<AnimalRecord>, has_more: bool) {
        Arc::make_mut(&mut self.items).extend(items);
        self.has_more = has_more;
    }

    pub(crate) fn stop_paging(&mut self) {
        self.has_more = false;
    }
}

/// A settled, read-only view of a [`ListStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSnapshot {
    pub items: Arc<Vec<AnimalRecord>>,
    pub page_no: u32,
    pub has_more: bool,
}

impl PageSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
