//! The pagination state machine.
//!
//! The machine never performs I/O. Every navigation action either returns a
//! `PageRequest` describing the single forward fetch to run, or `None` when the
//! action is rejected. The caller runs the fetch and hands the result back to
//! `apply` together with the request's ticket. Tickets carry the session
//! generation, so responses that outlive their session are dropped instead of
//! being shown under the wrong query.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::FetchFailure;
use crate::query::QueryKey;
use crate::source::{Cursor, FetchedPage};

use super::cache::{FetchStart, Page, RetentionPolicy, StaleCache};
use super::history::CursorHistory;

/// Lifecycle status of a pagination session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerStatus {
    Uninitialized,
    LoadingInitial,
    Loaded,
    LoadingNext,
    LoadingPrev,
    /// Re-fetching the current page in place.
    Reloading,
    Error,
}

impl PagerStatus {
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            PagerStatus::LoadingInitial
                | PagerStatus::LoadingNext
                | PagerStatus::LoadingPrev
                | PagerStatus::Reloading
        )
    }
}

enum_display!(
    PagerStatus,
    {
        Uninitialized => "uninitialized",
        LoadingInitial => "loading initial",
        Loaded => "loaded",
        LoadingNext => "loading next",
        LoadingPrev => "loading prev",
        Reloading => "reloading",
        Error => "error",
    }
);

/// Which navigation issued a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Initial,
    Next,
    Prev,
    Reload,
}

impl Direction {
    fn loading_status(self) -> PagerStatus {
        match self {
            Direction::Initial => PagerStatus::LoadingInitial,
            Direction::Next => PagerStatus::LoadingNext,
            Direction::Prev => PagerStatus::LoadingPrev,
            Direction::Reload => PagerStatus::Reloading,
        }
    }
}

enum_display!(
    Direction,
    {
        Initial => "initial",
        Next => "next",
        Prev => "prev",
        Reload => "reload",
    }
);

/// Tag identifying one issued fetch within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    generation: u64,
    seq: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A single forward fetch the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: FetchTicket,
    pub direction: Direction,
    /// Key active when the request was issued.
    pub key: QueryKey,
    /// `None` fetches from the start of the results.
    pub cursor: Option<Cursor>,
    /// Page number the response will be shown as.
    pub page_number: usize,
}

#[cfg(test)]
impl PageRequest {
    pub(crate) fn for_test(
        direction: Direction,
        key: QueryKey,
        cursor: Option<Cursor>,
        page_number: usize,
    ) -> Self {
        Self {
            ticket: FetchTicket {
                generation: 0,
                seq: 0,
            },
            direction,
            key,
            cursor,
            page_number,
        }
    }
}

/// What `apply` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response belonged to the in-flight request and moved the machine.
    Applied(PagerStatus),
    /// The response was superseded and ignored.
    Discarded,
}

/// Read-only view of a session for rendering.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub status: PagerStatus,
    /// Number of the page whose position the session holds; 0 before the
    /// first successful load.
    pub page_number: usize,
    pub items: Arc<[T]>,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub error: Option<FetchFailure>,
    /// True while previously loaded items are shown during a fetch.
    pub is_stale: bool,
    pub query: QueryKey,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            page_number: self.page_number,
            items: Arc::clone(&self.items),
            can_go_next: self.can_go_next,
            can_go_prev: self.can_go_prev,
            error: self.error.clone(),
            is_stale: self.is_stale,
            query: self.query.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    page_number: usize,
    next_cursor: Option<Cursor>,
}

/// One pagination session plus the bookkeeping to start new ones.
#[derive(Debug)]
pub struct PagerMachine<T> {
    status: PagerStatus,
    key: QueryKey,
    generation: u64,
    next_seq: u64,
    in_flight: Option<PageRequest>,
    failed: Option<PageRequest>,
    error: Option<FetchFailure>,
    position: Option<Position>,
    history: CursorHistory,
    cache: StaleCache<T>,
}

impl<T> PagerMachine<T> {
    pub fn new(key: QueryKey, policy: RetentionPolicy) -> Self {
        Self {
            status: PagerStatus::Uninitialized,
            key,
            generation: 0,
            next_seq: 0,
            in_flight: None,
            failed: None,
            error: None,
            position: None,
            history: CursorHistory::new(),
            cache: StaleCache::new(policy),
        }
    }

    pub fn status(&self) -> PagerStatus {
        self.status
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &CursorHistory {
        &self.history
    }

    pub fn in_flight(&self) -> Option<&PageRequest> {
        self.in_flight.as_ref()
    }

    pub fn page_number(&self) -> usize {
        self.position.as_ref().map_or(0, |p| p.page_number)
    }

    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    /// Start the first session. No-op once mounted.
    pub fn mount(&mut self) -> Option<PageRequest> {
        if self.status != PagerStatus::Uninitialized {
            trace!(status = %self.status, "mount ignored: already mounted");
            return None;
        }
        Some(self.start_session())
    }

    /// Discard the session. Responses still in flight will be dropped.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.status = PagerStatus::Uninitialized;
        self.in_flight = None;
        self.failed = None;
        self.error = None;
        self.position = None;
        self.history.reset();
        self.cache.clear();
        debug!(generation = self.generation, "pager unmounted");
    }

    /// Switch to a new query key, resetting the session if it differs.
    pub fn set_query_key(&mut self, key: QueryKey) -> Option<PageRequest> {
        let change = self.key.diff(&key);
        if !change.requires_reset() && self.status != PagerStatus::Uninitialized {
            trace!("query key unchanged");
            return None;
        }
        if let crate::query::KeyChange::Changed(fields) = &change {
            debug!(?fields, "query key changed, resetting session");
        }
        self.key = key;
        Some(self.start_session())
    }

    /// Request the page after the current one.
    pub fn go_next(&mut self) -> Option<PageRequest> {
        if !self.accepts_navigation("next") {
            return None;
        }
        let position = self.position.as_ref()?;
        let Some(cursor) = position.next_cursor.clone() else {
            trace!(page = position.page_number, "next ignored: already at last page");
            return None;
        };
        let target = position.page_number + 1;
        Some(self.issue(Direction::Next, Some(cursor), target, FetchStart::SameKey))
    }

    /// Request the page before the current one.
    pub fn go_prev(&mut self) -> Option<PageRequest> {
        if !self.accepts_navigation("prev") {
            return None;
        }
        let page = self.position.as_ref()?.page_number;
        let Some(cursor) = self.history.peek_prev(page) else {
            trace!(page, "prev ignored: already at first page");
            return None;
        };
        let cursor = cursor.cloned();
        Some(self.issue(Direction::Prev, cursor, page - 1, FetchStart::SameKey))
    }

    /// Re-fetch the current page in place, keeping it visible meanwhile.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        if !self.accepts_navigation("refresh") {
            return None;
        }
        let page = self.position.as_ref()?.page_number;
        let cursor = self.history.cursor_for(page).cloned();
        if page > 1 && cursor.is_none() {
            warn!(page, "refresh ignored: start cursor missing from history");
            return None;
        }
        Some(self.issue(Direction::Reload, cursor, page, FetchStart::SameKey))
    }

    /// Reissue the request that failed. No-op unless in the error state.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.status != PagerStatus::Error {
            trace!(status = %self.status, "retry ignored: nothing failed");
            return None;
        }
        let failed = self.failed.take()?;
        Some(self.issue(
            failed.direction,
            failed.cursor,
            failed.page_number,
            FetchStart::SameKey,
        ))
    }

    /// Feed back the outcome of a request issued by this machine.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedPage<T>, FetchFailure>,
    ) -> ApplyOutcome {
        let is_current = ticket.generation == self.generation
            && self.in_flight.as_ref().is_some_and(|r| r.ticket == ticket);
        if !is_current {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding stale response"
            );
            return ApplyOutcome::Discarded;
        }
        let Some(request) = self.in_flight.take() else {
            return ApplyOutcome::Discarded;
        };

        match result {
            Ok(fetched) => self.complete(request, fetched),
            Err(failure) => {
                warn!(
                    direction = %failure.direction,
                    kind = %failure.kind,
                    "page fetch failed: {}",
                    failure.message
                );
                self.status = PagerStatus::Error;
                self.error = Some(failure);
                self.failed = Some(request);
            }
        }

        ApplyOutcome::Applied(self.status)
    }

    /// Current view for the UI.
    pub fn snapshot(&self) -> Snapshot<T> {
        let navigable = matches!(self.status, PagerStatus::Loaded | PagerStatus::Error);
        let page_number = self.page_number();
        let cached = self.cache.get();

        Snapshot {
            status: self.status,
            page_number,
            items: cached.map_or_else(|| Arc::from(Vec::new()), |p| Arc::clone(&p.items)),
            can_go_next: navigable
                && self
                    .position
                    .as_ref()
                    .is_some_and(|p| p.next_cursor.is_some()),
            can_go_prev: navigable && page_number > 1,
            error: if self.status == PagerStatus::Error {
                self.error.clone()
            } else {
                None
            },
            is_stale: self.status.is_loading() && cached.is_some(),
            query: self.key.clone(),
        }
    }

    fn accepts_navigation(&self, action: &str) -> bool {
        match self.status {
            PagerStatus::Loaded | PagerStatus::Error => true,
            status if status.is_loading() => {
                trace!(action, status = %status, "navigation dropped: fetch in flight");
                false
            }
            status => {
                trace!(action, status = %status, "navigation ignored");
                false
            }
        }
    }

    fn start_session(&mut self) -> PageRequest {
        self.generation += 1;
        self.history.reset();
        self.position = None;
        self.failed = None;
        self.error = None;
        self.in_flight = None;
        debug!(generation = self.generation, "starting pagination session");
        self.issue(Direction::Initial, None, 1, FetchStart::NewKey)
    }

    fn issue(
        &mut self,
        direction: Direction,
        cursor: Option<Cursor>,
        page_number: usize,
        start: FetchStart,
    ) -> PageRequest {
        self.cache.begin_fetch(start);
        self.error = None;
        self.failed = None;
        self.status = direction.loading_status();

        let ticket = FetchTicket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let request = PageRequest {
            ticket,
            direction,
            key: self.key.clone(),
            cursor,
            page_number,
        };
        debug!(%direction, page = page_number, "issuing page fetch");
        self.in_flight = Some(request.clone());
        request
    }

    fn complete(&mut self, request: PageRequest, fetched: FetchedPage<T>) {
        let page_number = request.page_number;

        if let Some(cursor) = request.cursor
            && page_number > 1
            && !self.history.record(page_number, cursor)
        {
            warn!(page = page_number, "start cursor not adjacent to history");
        }

        // A changed continuation means the pages after this one shifted
        let stored_next = self.history.cursor_for(page_number + 1);
        let diverged = match (&fetched.next_cursor, stored_next) {
            (Some(fresh), Some(stored)) => fresh != stored,
            (None, Some(_)) => true,
            _ => false,
        };
        if diverged {
            debug!(page = page_number, "continuation changed, truncating history");
            self.history.truncate_after(page_number);
        }

        self.position = Some(Position {
            page_number,
            next_cursor: fetched.next_cursor.clone(),
        });
        self.cache.store(Page {
            items: fetched.items.into(),
            next_cursor: fetched.next_cursor,
            page_number,
        });
        self.status = PagerStatus::Loaded;
        self.error = None;
        self.failed = None;
        debug!(page = page_number, direction = %request.direction, "page loaded");
    }
}
