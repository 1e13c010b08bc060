//! Background pagination task.
//!
//! `spawn_pager` moves a session into its own tokio task. The UI sends
//! `Intent`s through a `PagerHandle` and renders whatever arrives on the
//! snapshot channel. Fetches run concurrently with intent handling, so a query
//! change never waits for an old fetch; the old response is dropped by the
//! machine's generation check when it lands.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FetchFailure, PagewiseError, Result};
use crate::query::{DebounceInput, DebouncedOutput, Debouncer, QueryParams, SortOrder};
use crate::source::{CursorSource, FetchedPage, PageFetcher};

use super::machine::{ApplyOutcome, FetchTicket, PageRequest, PagerMachine, Snapshot};

/// A navigation or query edit sent to the pager task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Next,
    Prev,
    Retry,
    Refresh,
    /// Replace the search text immediately (no debounce).
    SetSearch(String),
    SetFilter { field: String, value: String },
    ClearFilter(String),
    SetOrder(SortOrder),
    ToggleOrder,
    SetPageSize(usize),
    ResetFilters,
    SetParams(QueryParams),
    Shutdown,
}

/// Cloneable sender side of a running pager task.
#[derive(Debug, Clone)]
pub struct PagerHandle {
    intents: mpsc::UnboundedSender<Intent>,
    search: DebounceInput<String>,
}

impl PagerHandle {
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.intents
            .send(intent)
            .map_err(|_| PagewiseError::PagerClosed)
    }

    pub fn next(&self) -> Result<()> {
        self.send(Intent::Next)
    }

    pub fn prev(&self) -> Result<()> {
        self.send(Intent::Prev)
    }

    pub fn retry(&self) -> Result<()> {
        self.send(Intent::Retry)
    }

    pub fn refresh(&self) -> Result<()> {
        self.send(Intent::Refresh)
    }

    /// Feed raw search input. Only the value that settles for the configured
    /// debounce window becomes a new query.
    pub fn search(&self, text: impl Into<String>) -> Result<()> {
        self.search.send(text.into())
    }

    pub fn set_filter(&self, field: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.send(Intent::SetFilter {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn clear_filter(&self, field: impl Into<String>) -> Result<()> {
        self.send(Intent::ClearFilter(field.into()))
    }

    pub fn set_order(&self, order: SortOrder) -> Result<()> {
        self.send(Intent::SetOrder(order))
    }

    pub fn toggle_order(&self) -> Result<()> {
        self.send(Intent::ToggleOrder)
    }

    pub fn set_page_size(&self, page_size: usize) -> Result<()> {
        self.send(Intent::SetPageSize(page_size))
    }

    pub fn reset_filters(&self) -> Result<()> {
        self.send(Intent::ResetFilters)
    }

    pub fn set_params(&self, params: QueryParams) -> Result<()> {
        self.send(Intent::SetParams(params))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Intent::Shutdown)
    }
}

type FetchOutcome<T> = (FetchTicket, std::result::Result<FetchedPage<T>, FetchFailure>);

/// Start a pager task for `source` and mount it immediately.
///
/// Must be called from within a tokio runtime. The task ends on
/// `Intent::Shutdown` or once every handle is dropped.
pub fn spawn_pager<S>(
    source: S,
    config: &Config,
    params: QueryParams,
) -> Result<(PagerHandle, watch::Receiver<Snapshot<S::Item>>)>
where
    S: CursorSource + 'static,
{
    let key = params.normalize()?;
    let machine = PagerMachine::new(key, config.retention_policy());
    let fetcher = Arc::new(PageFetcher::new(source).with_timeout(config.fetch_timeout()));

    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (search_input, search_output) = Debouncer::spawn(config.search_debounce());
    let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

    tokio::spawn(run_pager_loop(
        fetcher,
        machine,
        params,
        intent_rx,
        search_output,
        snapshot_tx,
    ));

    Ok((
        PagerHandle {
            intents: intent_tx,
            search: search_input,
        },
        snapshot_rx,
    ))
}

async fn run_pager_loop<S>(
    fetcher: Arc<PageFetcher<S>>,
    mut machine: PagerMachine<S::Item>,
    mut params: QueryParams,
    mut intent_rx: mpsc::UnboundedReceiver<Intent>,
    mut search_output: DebouncedOutput<String>,
    snapshot_tx: watch::Sender<Snapshot<S::Item>>,
) where
    S: CursorSource + 'static,
{
    let mut in_flight: FuturesUnordered<BoxFuture<'static, FetchOutcome<S::Item>>> =
        FuturesUnordered::new();

    if let Some(request) = machine.mount() {
        in_flight.push(fetch_future(&fetcher, request));
    }
    snapshot_tx.send_replace(machine.snapshot());

    loop {
        let request = tokio::select! {
            intent = intent_rx.recv() => {
                match intent {
                    None | Some(Intent::Shutdown) => break,
                    Some(intent) => handle_intent(&mut machine, &mut params, intent),
                }
            }
            Some(search) = search_output.recv() => {
                update_params(&mut machine, &mut params, |p| p.search = search)
            }
            Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                if machine.apply(ticket, result) == ApplyOutcome::Discarded {
                    continue;
                }
                None
            }
            else => break,
        };

        if let Some(request) = request {
            in_flight.push(fetch_future(&fetcher, request));
        }
        snapshot_tx.send_replace(machine.snapshot());
    }

    machine.unmount();
    debug!("pager task stopped");
}

fn fetch_future<S>(
    fetcher: &Arc<PageFetcher<S>>,
    request: PageRequest,
) -> BoxFuture<'static, FetchOutcome<S::Item>>
where
    S: CursorSource + 'static,
{
    let fetcher = Arc::clone(fetcher);
    Box::pin(async move {
        let result = fetcher.fetch(&request).await;
        (request.ticket, result)
    })
}

fn handle_intent<T>(
    machine: &mut PagerMachine<T>,
    params: &mut QueryParams,
    intent: Intent,
) -> Option<PageRequest> {
    match intent {
        Intent::Next => machine.go_next(),
        Intent::Prev => machine.go_prev(),
        Intent::Retry => machine.retry(),
        Intent::Refresh => machine.refresh(),
        Intent::SetSearch(text) => update_params(machine, params, |p| p.search = text),
        Intent::SetFilter { field, value } => update_params(machine, params, |p| {
            p.filters.insert(field, value);
        }),
        Intent::ClearFilter(field) => update_params(machine, params, |p| {
            p.filters.remove(&field);
        }),
        Intent::SetOrder(order) => update_params(machine, params, |p| p.order = order),
        Intent::ToggleOrder => update_params(machine, params, |p| p.order = p.order.toggle()),
        Intent::SetPageSize(size) => update_params(machine, params, |p| p.page_size = size),
        Intent::ResetFilters => update_params(machine, params, QueryParams::reset_filters),
        Intent::SetParams(next) => update_params(machine, params, |p| *p = next),
        Intent::Shutdown => None,
    }
}

/// Apply an edit to the parameters and switch keys if it normalizes.
/// Invalid edits are dropped and the previous parameters kept.
fn update_params<T>(
    machine: &mut PagerMachine<T>,
    params: &mut QueryParams,
    edit: impl FnOnce(&mut QueryParams),
) -> Option<PageRequest> {
    let mut candidate = params.clone();
    edit(&mut candidate);

    match candidate.normalize() {
        Ok(key) => {
            *params = candidate;
            machine.set_query_key(key)
        }
        Err(e) => {
            warn!("ignoring invalid query parameters: {e}");
            None
        }
    }
}
