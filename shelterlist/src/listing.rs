use std::sync::Arc;

use crate::{
    AnimalRecord, Cell, FetchError, FetchOrchestrator, FetchRequest, FetchState, FilterChange,
    FilterCriteria, FilterState, ListingOptions, RowRange, Settlement, Ticket, ViewportGeometry,
    ViewportTracker, VirtualizedWindow,
};

/// A settled snapshot of everything a UI shell renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingView {
    pub items: Arc<Vec<AnimalRecord>>,
    pub page_no: u32,
    pub has_more: bool,
    pub state: FetchState,
    pub generation: u64,
    pub geometry: ViewportGeometry,
    pub scroll_top: u64,
    pub rendered_rows: RowRange,
}

impl Default for ListingView {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            page_no: 1,
            has_more: true,
            state: FetchState::Idle,
            generation: 0,
            geometry: ViewportGeometry::default(),
            scroll_top: 0,
            rendered_rows: RowRange::default(),
        }
    }
}

impl ListingView {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render a skeleton instead of the grid.
    pub fn is_loading_initial(&self) -> bool {
        self.state == FetchState::Resetting
    }

    /// Render a trailing loading indicator below the grid.
    pub fn is_loading_more(&self) -> bool {
        self.state == FetchState::AppendingMore
    }
}

/// The incremental listing engine.
///
/// This type is UI-agnostic and performs no I/O. The host:
/// - forwards filter edits, scroll offsets and viewport sizes;
/// - performs every returned [`FetchRequest`] and reports the outcome via [`Listing::settle`];
/// - calls [`Listing::tick`] with its clock so debounced search edits can fire
///   ([`Listing::next_deadline_ms`] says when).
///
/// For an async driver, see the `shelterlist-adapter` crate.
#[derive(Clone, Debug)]
pub struct Listing {
    options: ListingOptions,
    filters: FilterState,
    fetch: FetchOrchestrator,
    viewport: ViewportTracker,
    window: VirtualizedWindow,
}

impl Listing {
    pub fn new(options: ListingOptions) -> Self {
        ldebug!(
            page_size = options.page_size,
            debounce_ms = options.search_debounce_ms,
            row_height = options.row_height,
            "Listing::new"
        );
        Self {
            filters: FilterState::new(options.initial_filter.clone(), options.search_debounce_ms),
            fetch: FetchOrchestrator::new(options.initial_filter.clone(), options.page_size),
            viewport: ViewportTracker::new(
                options.initial_viewport,
                options.column_breakpoint,
                options.wide_column_count,
                options.row_height,
            ),
            window: VirtualizedWindow::new(
                options.overscan_rows,
                options.gap,
                options.near_end_threshold,
            ),
            options,
        }
    }

    pub fn options(&self) -> &ListingOptions {
        &self.options
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&ListingView) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    /// Issues a reset fetch under the latest filter. Used at mount and as the retry path.
    pub fn refresh(&mut self) -> FetchRequest {
        self.filters.cancel_search();
        let req = self.fetch.reset(self.filters.current().clone());
        self.window.set_scroll_top(0);
        self.notify();
        req
    }

    /// Applies a filter edit.
    ///
    /// Structural edits reset the list immediately and return the page-1 request. Search edits
    /// only (re)arm the debounce; the request comes out of a later [`Listing::tick`].
    pub fn set_filter(&mut self, next: FilterCriteria, now_ms: u64) -> Option<FetchRequest> {
        match self.filters.set_filter(next, now_ms) {
            FilterChange::Unchanged => None,
            FilterChange::Search => {
                ltrace!(now_ms, "search edit debounced");
                None
            }
            FilterChange::Structural => {
                let req = self.fetch.reset(self.filters.current().clone());
                self.window.set_scroll_top(0);
                self.notify();
                Some(req)
            }
        }
    }

    /// Fires a due search edit.
    pub fn tick(&mut self, now_ms: u64) -> Option<FetchRequest> {
        let filter = self.filters.poll_search(now_ms)?;
        if &filter == self.fetch.filter() && self.fetch.generation() > 0 {
            ltrace!("debounced search matches applied filter");
            return None;
        }
        let req = self.fetch.reset(filter);
        self.window.set_scroll_top(0);
        self.notify();
        Some(req)
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.filters.next_deadline_ms()
    }

    /// Records a scroll offset and, when the viewport is near the end, requests the next page.
    ///
    /// Repeated calls while a page is loading (or when nothing more is available) are no-ops on
    /// the fetch side, so scroll events need no separate throttling.
    pub fn on_scroll(&mut self, scroll_top: u64) -> Option<FetchRequest> {
        self.window.set_scroll_top(scroll_top);
        let geometry = self.geometry();
        let req = if self.window.is_near_end(&geometry) {
            self.fetch.request_more()
        } else {
            None
        };
        self.notify();
        req
    }

    /// Returns `true` when the viewport size changed.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if !self.viewport.observe(width, height) {
            return false;
        }
        self.notify();
        true
    }

    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<AnimalRecord>, FetchError>,
    ) -> Settlement {
        let settlement = self.fetch.settle(ticket, result);
        if settlement != Settlement::Discarded {
            self.notify();
        }
        settlement
    }

    pub fn items(&self) -> &[AnimalRecord] {
        self.fetch.store().items()
    }

    pub fn record_at(&self, index: usize) -> Option<&AnimalRecord> {
        self.fetch.store().get(index)
    }

    pub fn has_more(&self) -> bool {
        self.fetch.store().has_more()
    }

    pub fn page_no(&self) -> u32 {
        self.fetch.store().page_no()
    }

    pub fn state(&self) -> FetchState {
        self.fetch.state()
    }

    pub fn is_loading_initial(&self) -> bool {
        self.fetch.is_loading_initial()
    }

    pub fn is_loading_more(&self) -> bool {
        self.fetch.is_loading_more()
    }

    pub fn generation(&self) -> u64 {
        self.fetch.generation()
    }

    /// The latest filter handed to `set_filter` (possibly not applied yet).
    pub fn filter(&self) -> &FilterCriteria {
        self.filters.current()
    }

    /// The filter the current list was fetched under.
    pub fn applied_filter(&self) -> &FilterCriteria {
        self.fetch.filter()
    }

    pub fn has_pending_search(&self) -> bool {
        self.filters.has_pending_search()
    }

    pub fn scroll_top(&self) -> u64 {
        self.window.scroll_top()
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.viewport.geometry(self.fetch.store().len())
    }

    pub fn visible_rows(&self) -> RowRange {
        self.window.visible_rows(&self.geometry())
    }

    pub fn rendered_rows(&self) -> RowRange {
        self.window.rendered_rows(&self.geometry())
    }

    pub fn for_each_cell(&self, f: impl FnMut(Cell)) {
        let geometry = self.geometry();
        self.window
            .for_each_cell(&geometry, self.fetch.store().len(), f);
    }

    pub fn collect_cells(&self, out: &mut Vec<Cell>) {
        let geometry = self.geometry();
        self.window
            .collect_cells(&geometry, self.fetch.store().len(), out);
    }

    /// Offset that scrolls the record with `desertion_no` to the top, if it is loaded.
    pub fn scroll_offset_for_record(&self, desertion_no: &str) -> Option<u64> {
        let index = self.fetch.store().position_of(desertion_no)?;
        Some(self.window.scroll_offset_for_index(&self.geometry(), index))
    }

    pub fn view(&self) -> ListingView {
        let geometry = self.geometry();
        let page = self.fetch.snapshot();
        ListingView {
            items: page.items,
            page_no: page.page_no,
            has_more: page.has_more,
            state: self.fetch.state(),
            generation: self.fetch.generation(),
            geometry,
            scroll_top: self.window.scroll_top(),
            rendered_rows: self.window.rendered_rows(&geometry),
        }
    }

    fn notify(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(&self.view());
        }
    }
}
