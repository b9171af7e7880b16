use crate::{AnimalRecord, FetchError, FilterCriteria, ListStore, PageSnapshot};

/// Public view of the orchestrator's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchState {
    Idle,
    Resetting,
    AppendingMore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchKind {
    /// Page 1; replaces the whole list.
    Reset,
    /// Page N > 1; grows the list.
    Append,
}

/// Identifies one issued fetch. A response is applied only if its ticket is still the one in
/// flight for the live generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticket {
    pub generation: u64,
    pub kind: FetchKind,
    pub page_no: u32,
}

/// A network operation the host must perform and report back via `settle`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub page_size: u32,
    pub filter: FilterCriteria,
}

impl FetchRequest {
    pub fn page_no(&self) -> u32 {
        self.ticket.page_no
    }

    pub fn kind(&self) -> FetchKind {
        self.ticket.kind
    }
}

/// What happened when a response was handed to the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement {
    Applied {
        kind: FetchKind,
        received: usize,
        has_more: bool,
    },
    /// The response belongs to a superseded request and was dropped.
    Discarded,
    Failed {
        kind: FetchKind,
        error: FetchError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    InFlight(Ticket),
}

enum Event {
    NearEnd,
    Settled(Ticket, Result<Vec<AnimalRecord>, FetchError>),
}

enum Effect {
    Fetch(FetchRequest),
    Settled(Settlement),
    Ignored,
}

/// The pagination state machine.
///
/// ```text
/// Idle --reset--> Resetting --settled--> Idle
/// Idle --near end (has_more)--> AppendingMore --settled--> Idle
/// Resetting | AppendingMore --reset--> Resetting (new generation)
/// ```
///
/// `phase` is the only in-progress flag, and every transition rewrites it together with the
/// generation and the list, so they can never disagree. A reset is unconditional and issues its
/// request directly; near-end signals and responses go through one dispatch function. At most
/// one request is tracked as in flight; a superseded request is not aborted, its response is
/// simply discarded when it arrives.
#[derive(Clone, Debug)]
pub struct FetchOrchestrator {
    phase: Phase,
    generation: u64,
    filter: FilterCriteria,
    store: ListStore,
    page_size: u32,
}

impl FetchOrchestrator {
    pub fn new(filter: FilterCriteria, page_size: u32) -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            filter,
            store: ListStore::default(),
            page_size: page_size.max(1),
        }
    }

    pub fn state(&self) -> FetchState {
        match self.phase {
            Phase::Idle => FetchState::Idle,
            Phase::InFlight(Ticket {
                kind: FetchKind::Reset,
                ..
            }) => FetchState::Resetting,
            Phase::InFlight(Ticket {
                kind: FetchKind::Append,
                ..
            }) => FetchState::AppendingMore,
        }
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        match self.phase {
            Phase::Idle => None,
            Phase::InFlight(ticket) => Some(ticket),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The filter the live generation was issued under.
    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.store.snapshot()
    }

    pub fn is_loading_initial(&self) -> bool {
        self.state() == FetchState::Resetting
    }

    pub fn is_loading_more(&self) -> bool {
        self.state() == FetchState::AppendingMore
    }

    /// Starts a new generation: clears the list and issues page 1 under `filter`.
    ///
    /// Any request still in flight is superseded.
    pub fn reset(&mut self, filter: FilterCriteria) -> FetchRequest {
        if self.in_flight().is_some() {
            ldebug!(
                superseded = ?self.in_flight(),
                live_generation = self.generation,
                "superseding in-flight request"
            );
        }
        self.generation = self.generation.wrapping_add(1);
        self.filter = filter;
        self.store.clear();
        self.store.set_page_no(1);
        let ticket = Ticket {
            generation: self.generation,
            kind: FetchKind::Reset,
            page_no: 1,
        };
        self.phase = Phase::InFlight(ticket);
        ltrace!(generation = self.generation, "reset fetch issued");
        self.request_for(ticket)
    }

    /// Requests the next page. Returns `None` while anything is in flight, when the last page
    /// was short, or before the first page has landed.
    pub fn request_more(&mut self) -> Option<FetchRequest> {
        match self.dispatch(Event::NearEnd) {
            Effect::Fetch(req) => Some(req),
            Effect::Settled(_) | Effect::Ignored => None,
        }
    }

    /// Hands a response back to the state machine.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<AnimalRecord>, FetchError>,
    ) -> Settlement {
        match self.dispatch(Event::Settled(ticket, result)) {
            Effect::Settled(s) => s,
            Effect::Fetch(_) | Effect::Ignored => Settlement::Discarded,
        }
    }

    fn dispatch(&mut self, event: Event) -> Effect {
        match event {
            Event::NearEnd => {
                if self.in_flight().is_some() {
                    ltrace!(in_flight = ?self.in_flight(), "near-end ignored: request in flight");
                    return Effect::Ignored;
                }
                if !self.store.has_more() || self.store.is_empty() {
                    return Effect::Ignored;
                }
                let page_no = self.store.page_no().saturating_add(1);
                self.store.set_page_no(page_no);
                let ticket = Ticket {
                    generation: self.generation,
                    kind: FetchKind::Append,
                    page_no,
                };
                self.phase = Phase::InFlight(ticket);
                ltrace!(generation = self.generation, page_no, "append fetch issued");
                Effect::Fetch(self.request_for(ticket))
            }
            Event::Settled(ticket, result) => {
                if self.phase != Phase::InFlight(ticket) {
                    ldebug!(
                        generation = ticket.generation,
                        live_generation = self.generation,
                        page_no = ticket.page_no,
                        "discarding superseded response"
                    );
                    return Effect::Settled(Settlement::Discarded);
                }
                self.phase = Phase::Idle;
                match result {
                    Ok(items) => {
                        let received = items.len();
                        // No total count upstream: only a full page implies another one.
                        let has_more = received == self.page_size as usize;
                        match ticket.kind {
                            FetchKind::Reset => self.store.replace(items, has_more),
                            FetchKind::Append => self.store.append(items, has_more),
                        }
                        ltrace!(
                            generation = ticket.generation,
                            page_no = ticket.page_no,
                            received,
                            has_more,
                            "page applied"
                        );
                        Effect::Settled(Settlement::Applied {
                            kind: ticket.kind,
                            received,
                            has_more,
                        })
                    }
                    Err(error) => {
                        lwarn!(
                            generation = ticket.generation,
                            page_no = ticket.page_no,
                            %error,
                            "page fetch failed; paging stopped"
                        );
                        if ticket.kind == FetchKind::Reset {
                            self.store.replace(Vec::new(), false);
                        }
                        self.store.stop_paging();
                        Effect::Settled(Settlement::Failed {
                            kind: ticket.kind,
                            error,
                        })
                    }
                }
            }
        }
    }

    fn request_for(&self, ticket: Ticket) -> FetchRequest {
        FetchRequest {
            ticket,
            page_size: self.page_size,
            filter: self.filter.clone(),
        }
    }
}
