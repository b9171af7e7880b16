use chrono::NaiveDate;

use crate::{ProcessStatus, Sex};

/// An immutable filter snapshot.
///
/// Edits never mutate a snapshot in place: callers build a new value (usually with the `with_*`
/// helpers) and hand it to [`FilterState::set_filter`] / [`crate::Listing::set_filter`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterCriteria {
    pub sex: Option<Sex>,
    pub status: Option<ProcessStatus>,
    /// Species (upper kind) code, e.g. `417000` for dogs.
    pub species: Option<String>,
    pub query: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    /// Region (province) code, e.g. `6110000`.
    pub region: Option<String>,
}

impl FilterCriteria {
    pub fn with_sex(mut self, sex: Option<Sex>) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_status(mut self, status: Option<ProcessStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_species(mut self, species: Option<impl Into<String>>) -> Self {
        self.species = species.map(Into::into);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_start = start;
        self.date_end = end;
        self
    }

    pub fn with_region(mut self, region: Option<impl Into<String>>) -> Self {
        self.region = region.map(Into::into);
        self
    }

    /// Classifies the transition from `self` to `next`.
    ///
    /// Any non-query field difference wins over a simultaneous query difference.
    pub fn classify(&self, next: &FilterCriteria) -> FilterChange {
        let structural = self.sex != next.sex
            || self.status != next.status
            || self.species != next.species
            || self.date_start != next.date_start
            || self.date_end != next.date_end
            || self.region != next.region;
        if structural {
            FilterChange::Structural
        } else if self.query != next.query {
            FilterChange::Search
        } else {
            FilterChange::Unchanged
        }
    }
}

/// Classification of a filter edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterChange {
    /// Deep-equal to the previous snapshot; nothing happens downstream.
    Unchanged,
    /// Only the free-text query changed; applied after the debounce window.
    Search,
    /// Some other field changed; applied immediately.
    Structural,
}

/// A cancellable, adapter-clocked scheduled value.
///
/// Scheduling replaces (and thereby cancels) any pending value. The host polls with its own
/// clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Debounce<T> {
    delay_ms: u64,
    pending: Option<(u64, T)>,
}

impl<T> Debounce<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn schedule(&mut self, value: T, now_ms: u64) {
        self.pending = Some((now_ms.saturating_add(self.delay_ms), value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now_ms >= *deadline => self.cancel(),
            _ => None,
        }
    }
}

/// Holds the latest filter snapshot and the pending search debounce.
#[derive(Clone, Debug)]
pub struct FilterState {
    current: FilterCriteria,
    search: Debounce<FilterCriteria>,
}

impl FilterState {
    pub fn new(initial: FilterCriteria, search_debounce_ms: u64) -> Self {
        Self {
            current: initial,
            search: Debounce::new(search_debounce_ms),
        }
    }

    /// The most recent snapshot handed to `set_filter`, whether or not it has been applied yet.
    pub fn current(&self) -> &FilterCriteria {
        &self.current
    }

    /// Replaces the snapshot and returns exactly one classification for the edit.
    ///
    /// Search edits (re)start the debounce with the new snapshot. Structural edits cancel any
    /// pending search: the new snapshot already carries the latest query.
    pub fn set_filter(&mut self, next: FilterCriteria, now_ms: u64) -> FilterChange {
        let change = self.current.classify(&next);
        match change {
            FilterChange::Unchanged => return change,
            FilterChange::Search => {
                self.search.schedule(next.clone(), now_ms);
            }
            FilterChange::Structural => {
                if self.search.cancel().is_some() {
                    ltrace!("structural edit cancelled pending search");
                }
            }
        }
        self.current = next;
        change
    }

    pub fn cancel_search(&mut self) -> Option<FilterCriteria> {
        self.search.cancel()
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.search.deadline_ms()
    }

    /// Returns the debounced snapshot once its quiet period has elapsed.
    pub fn poll_search(&mut self, now_ms: u64) -> Option<FilterCriteria> {
        self.search.poll(now_ms)
    }
}
