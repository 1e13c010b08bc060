//! Awaitable pagination consumer.
//!
//! `Paginator` couples a `PageFetcher` with a `PagerMachine` for callers that
//! drive navigation one step at a time and wait for each step to settle. With
//! `&mut self` on every action there is never more than one fetch in flight.

use crate::config::Config;
use crate::error::Result;
use crate::query::{QueryKey, QueryParams};
use crate::source::{CursorSource, PageFetcher};

use super::cache::RetentionPolicy;
use super::machine::{PageRequest, PagerMachine, Snapshot};

pub struct Paginator<S: CursorSource> {
    fetcher: PageFetcher<S>,
    machine: PagerMachine<S::Item>,
}

impl<S: CursorSource> Paginator<S> {
    pub fn new(source: S, key: QueryKey, policy: RetentionPolicy) -> Self {
        Self {
            fetcher: PageFetcher::new(source),
            machine: PagerMachine::new(key, policy),
        }
    }

    /// Build a paginator with the retention policy and timeout from `config`.
    pub fn from_config(source: S, config: &Config, params: &QueryParams) -> Result<Self> {
        let key = params.normalize()?;
        Ok(Self {
            fetcher: PageFetcher::new(source).with_timeout(config.fetch_timeout()),
            machine: PagerMachine::new(key, config.retention_policy()),
        })
    }

    pub fn source(&self) -> &S {
        self.fetcher.source()
    }

    pub fn machine(&self) -> &PagerMachine<S::Item> {
        &self.machine
    }

    pub fn snapshot(&self) -> Snapshot<S::Item> {
        self.machine.snapshot()
    }

    pub async fn mount(&mut self) -> Snapshot<S::Item> {
        let request = self.machine.mount();
        self.run(request).await
    }

    pub async fn go_next(&mut self) -> Snapshot<S::Item> {
        let request = self.machine.go_next();
        self.run(request).await
    }

    pub async fn go_prev(&mut self) -> Snapshot<S::Item> {
        let request = self.machine.go_prev();
        self.run(request).await
    }

    pub async fn refresh(&mut self) -> Snapshot<S::Item> {
        let request = self.machine.refresh();
        self.run(request).await
    }

    pub async fn retry(&mut self) -> Snapshot<S::Item> {
        let request = self.machine.retry();
        self.run(request).await
    }

    pub async fn set_query_key(&mut self, key: QueryKey) -> Snapshot<S::Item> {
        let request = self.machine.set_query_key(key);
        self.run(request).await
    }

    /// Normalize `params` and switch to the resulting key.
    pub async fn set_params(&mut self, params: &QueryParams) -> Result<Snapshot<S::Item>> {
        let key = params.normalize()?;
        Ok(self.set_query_key(key).await)
    }

    pub fn unmount(&mut self) {
        self.machine.unmount();
    }

    async fn run(&mut self, request: Option<PageRequest>) -> Snapshot<S::Item> {
        if let Some(request) = request {
            let result = self.fetcher.fetch(&request).await;
            self.machine.apply(request.ticket, result);
        }
        self.machine.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::PagerStatus;
    use crate::source::MemorySource;
    use crate::source::memory::Searchable;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl Searchable for Item {
        fn id(&self) -> &str {
            &self.0
        }

        fn search_text(&self) -> String {
            self.0.clone()
        }

        fn filter_value(&self, _field: &str) -> Option<&str> {
            None
        }

        fn sort_key(&self) -> String {
            self.0.clone()
        }
    }

    fn items(count: usize) -> Vec<Item> {
        (0..count).map(|i| Item(format!("item-{i:02}"))).collect()
    }

    #[tokio::test]
    async fn test_from_config_uses_config_defaults() {
        let mut config = Config::default();
        config.retain_stale_during_reload = false;
        let params = QueryParams::new(config.page_size);

        let pager =
            Paginator::from_config(MemorySource::with_records(items(3)), &config, &params).unwrap();
        assert_eq!(pager.machine().key().page_size(), 10);
        assert_eq!(pager.snapshot().status, PagerStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid_params() {
        let config = Config::default();
        let result = Paginator::from_config(
            MemorySource::with_records(items(3)),
            &config,
            &QueryParams::new(0),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_walk_forward_and_back() {
        let key = QueryParams::new(4).normalize().unwrap();
        let mut pager = Paginator::new(
            MemorySource::with_records(items(10)),
            key,
            RetentionPolicy::default(),
        );

        let first = pager.mount().await;
        assert_eq!(first.page_number, 1);
        assert_eq!(first.items.len(), 4);

        let second = pager.go_next().await;
        assert_eq!(second.page_number, 2);
        let third = pager.go_next().await;
        assert_eq!(third.page_number, 3);
        assert_eq!(third.items.len(), 2);
        assert!(!third.can_go_next);

        let back = pager.go_prev().await;
        assert_eq!(back.items.to_vec(), second.items.to_vec());
        let start = pager.go_prev().await;
        assert_eq!(start.items.to_vec(), first.items.to_vec());
        assert!(!start.can_go_prev);
    }
}
