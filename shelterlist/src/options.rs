use std::sync::Arc;

use crate::{FilterCriteria, ListingView, ViewportSize};

/// A callback fired after every settled state transition of a [`crate::Listing`].
pub type OnChangeCallback = Arc<dyn Fn(&ListingView) + Send + Sync>;

/// Configuration for [`crate::Listing`].
///
/// Cheap to clone: the only heavy field (`on_change`) is stored in an `Arc`.
#[derive(Clone)]
pub struct ListingOptions {
    /// Records requested per page. A page of exactly this many records implies another page.
    pub page_size: u32,
    /// Quiet period after a free-text edit before the list is reset.
    pub search_debounce_ms: u64,

    /// Widths below this use a single column.
    pub column_breakpoint: u32,
    /// Column count at or above `column_breakpoint`.
    pub wide_column_count: u32,
    pub row_height: u32,
    /// Space between adjacent cells, horizontally and vertically.
    pub gap: u32,
    /// Extra rows rendered beyond each edge of the viewport.
    pub overscan_rows: usize,
    /// Distance from the end of the content at which the next page is requested.
    pub near_end_threshold: u32,

    pub initial_filter: FilterCriteria,
    pub initial_viewport: Option<ViewportSize>,

    pub on_change: Option<OnChangeCallback>,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            page_size: 30,
            search_debounce_ms: 500,
            column_breakpoint: 768,
            wide_column_count: 3,
            row_height: 420,
            gap: 16,
            overscan_rows: 2,
            near_end_threshold: 400,
            initial_filter: FilterCriteria::default(),
            initial_viewport: None,
            on_change: None,
        }
    }
}

impl core::fmt::Debug for ListingOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListingOptions")
            .field("page_size", &self.page_size)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("column_breakpoint", &self.column_breakpoint)
            .field("wide_column_count", &self.wide_column_count)
            .field("row_height", &self.row_height)
            .field("gap", &self.gap)
            .field("overscan_rows", &self.overscan_rows)
            .field("near_end_threshold", &self.near_end_threshold)
            .field("initial_filter", &self.initial_filter)
            .field("initial_viewport", &self.initial_viewport)
            .field("on_change", &self.on_change.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ListingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_search_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.search_debounce_ms = delay_ms;
        self
    }

    pub fn with_columns(mut self, column_breakpoint: u32, wide_column_count: u32) -> Self {
        self.column_breakpoint = column_breakpoint;
        self.wide_column_count = wide_column_count;
        self
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_overscan_rows(mut self, overscan_rows: usize) -> Self {
        self.overscan_rows = overscan_rows;
        self
    }

    pub fn with_near_end_threshold(mut self, threshold: u32) -> Self {
        self.near_end_threshold = threshold;
        self
    }

    pub fn with_initial_filter(mut self, filter: FilterCriteria) -> Self {
        self.initial_filter = filter;
        self
    }

    pub fn with_initial_viewport(mut self, viewport: Option<ViewportSize>) -> Self {
        self.initial_viewport = viewport;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&ListingView) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}
