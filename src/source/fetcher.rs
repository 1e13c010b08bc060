//! Adapter between a raw `CursorSource` and the pager.
//!
//! Collapses the source's continuation signals into a single `next_cursor`
//! and applies the optional fetch timeout. No retries happen here.

use std::time::Duration;

use tracing::debug;

use crate::error::{FetchFailure, PagewiseError, Result};
use crate::pager::PageRequest;
use crate::query::QueryKey;

use super::{Cursor, CursorSource};

/// A page as seen by the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    /// `None` when this is the last page.
    pub next_cursor: Option<Cursor>,
}

/// Wraps a data source with the page contract the pager relies on.
#[derive(Debug)]
pub struct PageFetcher<S> {
    source: S,
    timeout: Option<Duration>,
}

impl<S: CursorSource> PageFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: None,
        }
    }

    /// Fail fetches that take longer than `timeout`. A zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one page. `cursor = None` starts from the beginning of the results.
    pub async fn fetch_page(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<FetchedPage<S::Item>> {
        let fetch_operation = self.source.paginate(key, cursor, limit);

        let raw = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, fetch_operation).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(PagewiseError::Timeout {
                        seconds: timeout.as_secs(),
                    });
                }
            },
            None => fetch_operation.await?,
        };

        let exhausted = raw.is_done || raw.page.len() < limit;
        let next_cursor = if exhausted { None } else { raw.continue_cursor };

        debug!(
            items = raw.page.len(),
            limit,
            has_next = next_cursor.is_some(),
            "fetched page"
        );

        Ok(FetchedPage {
            items: raw.page,
            next_cursor,
        })
    }

    /// Run a request issued by the state machine, annotating any failure with
    /// the request's direction.
    pub async fn fetch(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<FetchedPage<S::Item>, FetchFailure> {
        self.fetch_page(
            &request.key,
            request.cursor.as_ref(),
            request.key.page_size(),
        )
        .await
        .map_err(|e| FetchFailure::from_error(request.direction, &e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::FailureKind;
    use crate::query::QueryParams;
    use crate::source::SourcePage;

    /// Returns a fixed response and counts calls.
    struct FixedSource {
        response: SourcePage<u32>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(page: Vec<u32>, continue_cursor: Option<&str>, is_done: bool) -> Self {
            Self {
                response: SourcePage {
                    page,
                    continue_cursor: continue_cursor.map(Cursor::from),
                    is_done,
                },
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CursorSource for FixedSource {
        type Item = u32;

        async fn paginate(
            &self,
            _key: &QueryKey,
            _cursor: Option<&Cursor>,
            _limit: usize,
        ) -> Result<SourcePage<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.response.clone())
        }
    }

    struct FailingSource;

    impl CursorSource for FailingSource {
        type Item = u32;

        async fn paginate(
            &self,
            _key: &QueryKey,
            _cursor: Option<&Cursor>,
            _limit: usize,
        ) -> Result<SourcePage<u32>> {
            Err(PagewiseError::Source("storage offline".to_string()))
        }
    }

    fn key(size: usize) -> QueryKey {
        QueryParams::new(size).normalize().unwrap()
    }

    #[tokio::test]
    async fn test_full_page_keeps_cursor() {
        let fetcher = PageFetcher::new(FixedSource::new(vec![1, 2, 3], Some("c1"), false));
        let page = fetcher.fetch_page(&key(3), None, 3).await.unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.next_cursor, Some(Cursor::from("c1")));
    }

    #[tokio::test]
    async fn test_short_page_drops_cursor() {
        let fetcher = PageFetcher::new(FixedSource::new(vec![1, 2], Some("c1"), false));
        let page = fetcher.fetch_page(&key(3), None, 3).await.unwrap();
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_done_signal_drops_cursor() {
        let fetcher = PageFetcher::new(FixedSource::new(vec![1, 2, 3], Some("c1"), true));
        let page = fetcher.fetch_page(&key(3), None, 3).await.unwrap();
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_errors_propagate_unchanged_without_retry() {
        let fetcher = PageFetcher::new(FailingSource);
        let err = fetcher.fetch_page(&key(3), None, 3).await.unwrap_err();
        assert!(matches!(err, PagewiseError::Source(ref m) if m == "storage offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_timeout_error() {
        let mut source = FixedSource::new(vec![1], None, true);
        source.delay = Some(Duration::from_secs(10));
        let fetcher = PageFetcher::new(source).with_timeout(Duration::from_secs(2));

        let err = fetcher.fetch_page(&key(3), None, 3).await.unwrap_err();
        assert!(matches!(err, PagewiseError::Timeout { seconds: 2 }));
        assert_eq!(fetcher.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_failure_is_annotated_with_direction() {
        let fetcher = PageFetcher::new(FailingSource);
        let request = PageRequest::for_test(crate::pager::Direction::Prev, key(3), None, 1);
        let failure = fetcher.fetch(&request).await.unwrap_err();
        assert_eq!(failure.direction, crate::pager::Direction::Prev);
        assert_eq!(failure.kind, FailureKind::Source);
    }
}
