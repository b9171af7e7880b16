/// Sex filter / attribute as reported by the shelter registry (`M`, `F`, `Q` = unknown).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sex {
    #[cfg_attr(feature = "serde", serde(rename = "M"))]
    Male,
    #[cfg_attr(feature = "serde", serde(rename = "F"))]
    Female,
    #[cfg_attr(feature = "serde", serde(rename = "Q"))]
    Unknown,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "Q",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            "Q" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Lifecycle status filter: animals still in the public notice period, or under protection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProcessStatus {
    Notice,
    Protect,
}

impl ProcessStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Protect => "protect",
        }
    }
}

/// One remote animal record.
///
/// The engine treats records as opaque: only `desertion_no` (identity) and arrival order matter.
/// Fields are never mutated after a record enters the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimalRecord {
    pub desertion_no: String,
    pub species_code: Option<String>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub sex: Option<Sex>,
    pub rescue_date: Option<String>,
    pub rescue_place: Option<String>,
    /// Up to [`AnimalRecord::MAX_IMAGES`] image URLs, in registry order.
    pub images: Vec<String>,
    pub shelter_name: Option<String>,
    pub shelter_reg_no: Option<String>,
    pub process_state: Option<String>,
}

impl AnimalRecord {
    pub const MAX_IMAGES: usize = 8;

    pub fn new(desertion_no: impl Into<String>) -> Self {
        Self {
            desertion_no: desertion_no.into(),
            ..Self::default()
        }
    }

    /// Stable identifier handed to "liked"/detail collaborators.
    pub fn id(&self) -> &str {
        &self.desertion_no
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A half-open row range `[start_row, end_row)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    pub start_row: usize,
    pub end_row: usize, // exclusive
}

impl RowRange {
    pub fn is_empty(&self) -> bool {
        self.start_row >= self.end_row
    }

    pub fn len(&self) -> usize {
        self.end_row.saturating_sub(self.start_row)
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start_row && row < self.end_row
    }
}

/// A positioned grid cell for one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Index into the list's items.
    pub index: usize,
    pub row: usize,
    pub col: u32,
    /// Offsets are relative to the top-left of the scrollable content (half-gap inset applied).
    pub top: u64,
    pub left: u32,
    pub width: u32,
    pub height: u32,
}

impl Cell {
    pub fn bottom(&self) -> u64 {
        self.top.saturating_add(self.height as u64)
    }

    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }
}

/// Viewport pixel size reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}
