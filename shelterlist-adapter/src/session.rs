use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use shelterlist::{
    AnimalRecord, FetchError, FetchRequest, FilterCriteria, Listing, ListingOptions, ListingView,
    Settlement, Ticket,
};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

use crate::{PageRequest, RemoteListSource, SessionError};

type InFlight = BoxFuture<'static, (Ticket, Result<Vec<AnimalRecord>, FetchError>)>;

#[derive(Debug)]
enum Command {
    SetFilter(FilterCriteria),
    Scroll(u64),
    Resize(u32, u32),
    Refresh,
}

/// The UI shell's side of a running [`Session`].
///
/// Commands are fire-and-forget; the resulting state arrives as [`ListingView`] snapshots.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ListingView>,
}

impl SessionHandle {
    pub fn set_filter(&self, criteria: FilterCriteria) -> Result<(), SessionError> {
        self.send(Command::SetFilter(criteria))
    }

    pub fn on_scroll(&self, scroll_top: u64) -> Result<(), SessionError> {
        self.send(Command::Scroll(scroll_top))
    }

    pub fn on_resize(&self, width: u32, height: u32) -> Result<(), SessionError> {
        self.send(Command::Resize(width, height))
    }

    pub fn refresh(&self) -> Result<(), SessionError> {
        self.send(Command::Refresh)
    }

    /// The latest settled view.
    pub fn view(&self) -> ListingView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.view.clone()
    }

    /// Waits until a published view satisfies `f` and returns it.
    pub async fn wait_for(
        &mut self,
        f: impl FnMut(&ListingView) -> bool,
    ) -> Result<ListingView, SessionError> {
        self.view
            .wait_for(f)
            .await
            .map(|v| v.clone())
            .map_err(|_| SessionError::Closed)
    }

    fn send(&self, cmd: Command) -> Result<(), SessionError> {
        self.commands.send(cmd).map_err(|_| SessionError::Closed)
    }
}

/// Drives a [`Listing`] against a [`RemoteListSource`] on a single task.
///
/// One `select!` loop multiplexes UI commands, fetch completions and the search debounce
/// deadline. Superseded fetches keep running to completion; the listing drops their results.
/// The session ends when every [`SessionHandle`] has been dropped.
pub struct Session<S> {
    listing: Listing,
    source: Arc<S>,
    in_flight: FuturesUnordered<InFlight>,
    commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<ListingView>,
    epoch: Instant,
}

impl<S: RemoteListSource + 'static> Session<S> {
    pub fn new(options: ListingOptions, source: Arc<S>) -> (Self, SessionHandle) {
        let listing = Listing::new(options);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(listing.view());
        let session = Self {
            listing,
            source,
            in_flight: FuturesUnordered::new(),
            commands: commands_rx,
            view: view_tx,
            epoch: Instant::now(),
        };
        let handle = SessionHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (session, handle)
    }

    /// Spawns the session onto the current tokio runtime and issues the first page request.
    pub fn spawn(options: ListingOptions, source: Arc<S>) -> SessionHandle {
        let (session, handle) = Self::new(options, source);
        tokio::spawn(session.run());
        handle
    }

    pub async fn run(mut self) {
        let req = self.listing.refresh();
        self.start(req);
        self.publish();

        loop {
            let deadline = self
                .listing
                .next_deadline_ms()
                .map(|ms| self.epoch + Duration::from_millis(ms));

            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                Some((ticket, result)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.settle(ticket, result);
                }
                _ = time::sleep_until(deadline.unwrap_or(self.epoch)), if deadline.is_some() => {
                    let now_ms = self.now_ms();
                    if let Some(req) = self.listing.tick(now_ms) {
                        self.start(req);
                    }
                }
            }

            self.publish();
        }

        tracing::debug!(
            target: "shelterlist::session",
            abandoned = self.in_flight.len(),
            "session closed"
        );
    }

    fn handle(&mut self, cmd: Command) {
        let now_ms = self.now_ms();
        let req = match cmd {
            Command::SetFilter(criteria) => self.listing.set_filter(criteria, now_ms),
            Command::Scroll(scroll_top) => self.listing.on_scroll(scroll_top),
            Command::Resize(width, height) => {
                self.listing.on_resize(width, height);
                None
            }
            Command::Refresh => Some(self.listing.refresh()),
        };
        if let Some(req) = req {
            self.start(req);
        }
    }

    fn settle(&mut self, ticket: Ticket, result: Result<Vec<AnimalRecord>, FetchError>) {
        match self.listing.settle(ticket, result) {
            Settlement::Applied { received, has_more, .. } => {
                tracing::trace!(
                    target: "shelterlist::session",
                    generation = ticket.generation,
                    page_no = ticket.page_no,
                    received,
                    has_more,
                    "page settled"
                );
            }
            Settlement::Discarded => {}
            Settlement::Failed { error, .. } => {
                tracing::warn!(
                    target: "shelterlist::session",
                    generation = ticket.generation,
                    page_no = ticket.page_no,
                    %error,
                    "page fetch failed"
                );
            }
        }
    }

    fn start(&mut self, req: FetchRequest) {
        let source = Arc::clone(&self.source);
        let ticket = req.ticket;
        let page = PageRequest::from(&req);
        tracing::debug!(
            target: "shelterlist::session",
            generation = ticket.generation,
            page_no = ticket.page_no,
            kind = ?ticket.kind,
            outstanding = self.in_flight.len(),
            "fetch started"
        );
        self.in_flight.push(
            async move {
                let result = source.fetch_page(&page).await;
                (ticket, result)
            }
            .boxed(),
        );
    }

    fn publish(&self) {
        let next = self.listing.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
