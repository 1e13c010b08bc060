//! Bidirectional pagination over forward-only cursor sources.
//!
//! - `machine`: the session state machine (pure, no I/O)
//! - `history`: start cursors of visited pages, for "previous"
//! - `cache`: last good page kept visible while fetching
//! - `driver`: awaitable consumer owning a fetcher and a machine
//! - `handle`: background task consumer with a snapshot channel

pub mod cache;
pub mod driver;
pub mod handle;
pub mod history;
pub mod machine;

pub use cache::{Page, RetentionPolicy, StaleCache};
pub use driver::Paginator;
pub use handle::{Intent, PagerHandle, spawn_pager};
pub use history::CursorHistory;
pub use machine::{
    ApplyOutcome, Direction, FetchTicket, PageRequest, PagerMachine, PagerStatus, Snapshot,
};
