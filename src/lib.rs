#[macro_use]
mod macros;

pub mod cli;
pub mod commands;
pub mod companies;
pub mod config;
pub mod display;
pub mod error;
pub mod pager;
pub mod query;
pub mod source;

pub use companies::{Company, SubscriptionTier, generate_companies};
pub use config::Config;
pub use error::{FailureKind, FetchFailure, PagewiseError, Result};
pub use pager::{
    Direction, Intent, PageRequest, PagerHandle, PagerMachine, PagerStatus, Paginator,
    RetentionPolicy, Snapshot, spawn_pager,
};
pub use query::{QueryKey, QueryParams, SortOrder};
pub use source::{Cursor, CursorSource, MemorySource, PageFetcher, Searchable, SourcePage};
