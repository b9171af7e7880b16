//! Adapter utilities for the `shelterlist` engine.
//!
//! `shelterlist` is sans-IO: it decides *what* to fetch and *what* to render. This crate
//! provides the pieces a host needs to actually run it:
//!
//! - [`RemoteListSource`], the async page-source seam, and [`PageRequest`]
//! - [`decode_page`] for the registry's JSON envelope (one-or-many `item` quirk included)
//! - [`HttpListSource`] (feature `http`, on by default)
//! - [`Session`], a single-task driver publishing [`shelterlist::ListingView`] snapshots
#![forbid(unsafe_code)]

mod error;
#[cfg(feature = "http")]
mod http;
mod page;
mod session;
mod source;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, SessionError};
#[cfg(feature = "http")]
pub use http::{ENV_BASE_URL, ENV_SERVICE_KEY, ENV_TIMEOUT_MS, HttpListSource, HttpSourceConfig};
pub use page::decode_page;
pub use session::{Session, SessionHandle};
pub use source::{PageRequest, RemoteListSource};
