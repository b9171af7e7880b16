//! A headless incremental listing engine for browsing a remote, page-numbered dataset.
//!
//! The engine reconciles user-editable filters against an externally paginated source while
//! rendering only a bounded window of a potentially large grid:
//!
//! - [`FilterState`] classifies edits as search (debounced) or structural (immediate);
//! - [`FetchOrchestrator`] is the reset/append state machine, with a generation check that
//!   drops responses from superseded requests;
//! - [`ViewportTracker`] and [`VirtualizedWindow`] compute the responsive grid, the overscanned
//!   row window, and the near-end signal that requests the next page.
//!
//! [`Listing`] ties these together. It does no I/O: the host performs the returned
//! [`FetchRequest`]s and supplies a clock. See `shelterlist-adapter` for an async driver.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod filter;
mod listing;
mod options;
mod orchestrator;
mod store;
mod types;
mod viewport;
mod window;


pub use error::FetchError;
pub use filter::{Debounce, FilterChange, FilterCriteria, FilterState};
pub use listing::{Listing, ListingView};
pub use options::{ListingOptions, OnChangeCallback};
pub use orchestrator::{FetchKind, FetchOrchestrator, FetchRequest, FetchState, Settlement, Ticket};
pub use store::{ListStore, PageSnapshot};
pub use types::{AnimalRecord, Cell, ProcessStatus, RowRange, Sex, ViewportSize};
pub use viewport::{ViewportGeometry, ViewportTracker};
pub use window::VirtualizedWindow;
