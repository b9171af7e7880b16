use crate::ViewportSize;

/// Grid geometry derived from the viewport size and the number of loaded records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportGeometry {
    pub width: u32,
    pub height: u32,
    pub column_count: u32,
    pub row_height: u32,
    pub row_count: usize,
}

impl ViewportGeometry {
    pub fn total_height(&self) -> u64 {
        (self.row_count as u64).saturating_mul(self.row_height as u64)
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.column_count.max(1) as usize
    }
}

/// Tracks the rendering surface's content-box size and the responsive column count.
#[derive(Clone, Debug)]
pub struct ViewportTracker {
    size: ViewportSize,
    column_breakpoint: u32,
    wide_column_count: u32,
    row_height: u32,
}

impl ViewportTracker {
    pub fn new(
        initial: Option<ViewportSize>,
        column_breakpoint: u32,
        wide_column_count: u32,
        row_height: u32,
    ) -> Self {
        Self {
            size: initial.unwrap_or_default(),
            column_breakpoint,
            wide_column_count: wide_column_count.max(1),
            row_height: row_height.max(1),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    /// Records a new size. Returns `true` when width or height actually changed.
    pub fn observe(&mut self, width: u32, height: u32) -> bool {
        let next = ViewportSize { width, height };
        if self.size == next {
            return false;
        }
        self.size = next;
        ltrace!(width, height, columns = self.column_count(), "viewport resized");
        true
    }

    /// One column below the breakpoint, `wide_column_count` otherwise.
    pub fn column_count(&self) -> u32 {
        if self.size.width < self.column_breakpoint {
            1
        } else {
            self.wide_column_count
        }
    }

    pub fn geometry(&self, item_count: usize) -> ViewportGeometry {
        let column_count = self.column_count();
        ViewportGeometry {
            width: self.size.width,
            height: self.size.height,
            column_count,
            row_height: self.row_height,
            row_count: item_count.div_ceil(column_count as usize),
        }
    }
}
