//! Stale-while-revalidate holder for the last successfully loaded page.

use std::sync::Arc;

use crate::source::Cursor;

/// The last successfully fetched page of a session.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Arc<[T]>,
    pub next_cursor: Option<Cursor>,
    pub page_number: usize,
}

impl<T> Clone for Page<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            next_cursor: self.next_cursor.clone(),
            page_number: self.page_number,
        }
    }
}

/// What happens to visible data while a same-key fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep showing the last good page until the new one arrives.
    #[default]
    RetainStale,
    /// Drop the visible page as soon as any fetch starts.
    DiscardOnReload,
}

impl RetentionPolicy {
    pub fn from_flag(retain_stale_during_reload: bool) -> Self {
        if retain_stale_during_reload {
            RetentionPolicy::RetainStale
        } else {
            RetentionPolicy::DiscardOnReload
        }
    }
}

/// Why a fetch is starting, as far as the cache is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStart {
    /// First fetch under a new query key.
    NewKey,
    /// Navigation, refresh or retry under the current key.
    SameKey,
}

#[derive(Debug)]
pub struct StaleCache<T> {
    last_good: Option<Page<T>>,
    policy: RetentionPolicy,
}

impl<T> StaleCache<T> {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            last_good: None,
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn get(&self) -> Option<&Page<T>> {
        self.last_good.as_ref()
    }

    /// Apply the retention policy at the moment a fetch begins.
    ///
    /// Data from a previous key is never kept under a new one.
    pub fn begin_fetch(&mut self, start: FetchStart) {
        match (start, self.policy) {
            (FetchStart::NewKey, _) | (FetchStart::SameKey, RetentionPolicy::DiscardOnReload) => {
                self.last_good = None;
            }
            (FetchStart::SameKey, RetentionPolicy::RetainStale) => {}
        }
    }

    /// Replace the held page. Only called for successful fetches.
    pub fn store(&mut self, page: Page<T>) {
        self.last_good = Some(page);
    }

    pub fn clear(&mut self) {
        self.last_good = None;
    }
}
