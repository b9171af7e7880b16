use crate::{Cell, RowRange, ViewportGeometry};

/// Fixed-row-height grid windowing.
///
/// Given a [`ViewportGeometry`] and the current scroll offset it decides which rows to render
/// (visible rows plus `overscan_rows` on each side), where each cell goes, and whether the
/// viewport is close enough to the end of the content to ask for the next page.
#[derive(Clone, Debug)]
pub struct VirtualizedWindow {
    scroll_top: u64,
    overscan_rows: usize,
    gap: u32,
    near_end_threshold: u32,
}

impl VirtualizedWindow {
    pub fn new(overscan_rows: usize, gap: u32, near_end_threshold: u32) -> Self {
        Self {
            scroll_top: 0,
            overscan_rows,
            gap,
            near_end_threshold,
        }
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, scroll_top: u64) {
        self.scroll_top = scroll_top;
    }

    pub fn overscan_rows(&self) -> usize {
        self.overscan_rows
    }

    pub fn max_scroll_top(&self, geometry: &ViewportGeometry) -> u64 {
        geometry.total_height().saturating_sub(geometry.height as u64)
    }

    pub fn clamp_scroll_top(&self, geometry: &ViewportGeometry, scroll_top: u64) -> u64 {
        scroll_top.min(self.max_scroll_top(geometry))
    }

    /// Rows intersecting `[scroll_top, scroll_top + height)`, without overscan.
    pub fn visible_rows(&self, geometry: &ViewportGeometry) -> RowRange {
        self.visible_rows_for(geometry, self.scroll_top)
    }

    pub fn visible_rows_for(&self, geometry: &ViewportGeometry, scroll_top: u64) -> RowRange {
        let rows = geometry.row_count;
        if rows == 0 || geometry.height == 0 {
            return RowRange::default();
        }
        let row_height = geometry.row_height.max(1) as u64;
        let top = self.clamp_scroll_top(geometry, scroll_top);
        let bottom = top.saturating_add(geometry.height as u64);

        let start_row = ((top / row_height) as usize).min(rows);
        let end_row = (bottom.div_ceil(row_height) as usize).min(rows);
        RowRange { start_row, end_row }
    }

    /// The rows to render: visible rows widened by `overscan_rows` on each side.
    pub fn rendered_rows(&self, geometry: &ViewportGeometry) -> RowRange {
        self.rendered_rows_for(geometry, self.scroll_top)
    }

    pub fn rendered_rows_for(&self, geometry: &ViewportGeometry, scroll_top: u64) -> RowRange {
        let visible = self.visible_rows_for(geometry, scroll_top);
        if visible.is_empty() {
            return visible;
        }
        RowRange {
            start_row: visible.start_row.saturating_sub(self.overscan_rows),
            end_row: visible
                .end_row
                .saturating_add(self.overscan_rows)
                .min(geometry.row_count),
        }
    }

    /// `true` once the bottom of the viewport is within `near_end_threshold` of the content end.
    ///
    /// Content that already fits in the viewport never reports near-end.
    pub fn is_near_end(&self, geometry: &ViewportGeometry) -> bool {
        let total = geometry.total_height();
        let view = geometry.height as u64;
        if total <= view {
            return false;
        }
        let bottom = self
            .clamp_scroll_top(geometry, self.scroll_top)
            .saturating_add(view);
        bottom >= total.saturating_sub(self.near_end_threshold as u64)
    }

    /// Content width of one column, with the gaps between columns removed.
    pub fn column_width(&self, geometry: &ViewportGeometry) -> u32 {
        let columns = geometry.column_count.max(1);
        let gaps = self.gap.saturating_mul(columns - 1);
        geometry.width.saturating_sub(gaps) / columns
    }

    /// Position of the record at `index`, or `None` if it lies outside the grid.
    ///
    /// Adjacent cells are exactly `gap` apart on both axes. Horizontally the gaps are taken out
    /// of [`Self::column_width`], so the outer columns sit flush with the viewport edges.
    /// Vertically the row pitch is fixed at `row_height`, so each cell gives up `gap / 2` at the
    /// top and the rest of the gap at the bottom.
    pub fn cell(&self, geometry: &ViewportGeometry, index: usize) -> Option<Cell> {
        let columns = geometry.column_count.max(1) as usize;
        let row = index / columns;
        if row >= geometry.row_count {
            return None;
        }
        let col = (index % columns) as u32;
        let column_width = self.column_width(geometry);
        let half_gap = self.gap / 2;
        let row_top = (row as u64).saturating_mul(geometry.row_height as u64);

        Some(Cell {
            index,
            row,
            col,
            top: row_top.saturating_add(half_gap as u64),
            left: col.saturating_mul(column_width.saturating_add(self.gap)),
            width: column_width,
            height: geometry.row_height.saturating_sub(self.gap),
        })
    }

    /// Emits every cell in the rendered row range, in index order.
    pub fn for_each_cell(
        &self,
        geometry: &ViewportGeometry,
        item_count: usize,
        mut f: impl FnMut(Cell),
    ) {
        let rows = self.rendered_rows(geometry);
        if rows.is_empty() {
            return;
        }
        let columns = geometry.column_count.max(1) as usize;
        let start = rows.start_row.saturating_mul(columns);
        let end = rows.end_row.saturating_mul(columns).min(item_count);
        for index in start..end {
            if let Some(cell) = self.cell(geometry, index) {
                f(cell);
            }
        }
    }

    pub fn collect_cells(&self, geometry: &ViewportGeometry, item_count: usize, out: &mut Vec<Cell>) {
        out.clear();
        self.for_each_cell(geometry, item_count, |cell| out.push(cell));
    }

    /// Scroll offset that brings the row holding `index` to the top of the viewport (clamped).
    pub fn scroll_offset_for_index(&self, geometry: &ViewportGeometry, index: usize) -> u64 {
        let row = geometry.row_of(index) as u64;
        let offset = row.saturating_mul(geometry.row_height as u64);
        self.clamp_scroll_top(geometry, offset)
    }
}
