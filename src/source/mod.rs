//! Forward-only cursor data sources.
//!
//! A data source answers exactly one question: "give me up to N items after
//! cursor C for this query". It never supports offsets or backward cursors.
//! Everything bidirectional is reconstructed by the pager on top of this.

pub mod fetcher;
pub mod memory;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::QueryKey;

pub use fetcher::{FetchedPage, PageFetcher};
pub use memory::{MemorySource, Searchable};

/// Opaque continuation token issued by a data source.
///
/// Only meaningful for the exact `QueryKey` that produced it, and only in the
/// forward direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// One raw response from a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage<T> {
    /// Items in source order.
    pub page: Vec<T>,
    /// Resume point after the last returned item, if the source issued one.
    pub continue_cursor: Option<Cursor>,
    /// Set when the source knows there is nothing after this page.
    pub is_done: bool,
}

/// Common interface for cursor-paginated data sources
///
/// Implementations must apply search, filters and ordering deterministically
/// for a given key: a stable order is what keeps cursors valid across pages.
pub trait CursorSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    /// Fetch up to `limit` items following `cursor` (`None` = from the start).
    fn paginate(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> impl Future<Output = Result<SourcePage<Self::Item>>> + Send;
}

/// Lets one source be shared between a pager and whoever mutates it.
impl<S: CursorSource> CursorSource for Arc<S> {
    type Item = S::Item;

    fn paginate(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> impl Future<Output = Result<SourcePage<Self::Item>>> + Send {
        (**self).paginate(key, cursor, limit)
    }
}
