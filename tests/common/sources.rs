//! Test records and data sources with injectable failures and latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pagewise::{
    Cursor, CursorSource, MemorySource, PagewiseError, QueryKey, Result, Searchable, SourcePage,
};

/// Minimal searchable record: `name` orders, `kind` filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: String,
}

impl Searchable for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.kind)
    }

    fn filter_value(&self, field: &str) -> Option<&str> {
        match field {
            "kind" => Some(&self.kind),
            _ => None,
        }
    }

    fn sort_key(&self) -> String {
        self.name.clone()
    }
}

pub fn item(id: usize, kind: &str) -> Item {
    Item {
        id: format!("{id:03}"),
        name: format!("item-{id:03}"),
        kind: kind.to_string(),
    }
}

/// `count` items alternating between kinds "even" and "odd".
pub fn items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| item(i, if i % 2 == 0 { "even" } else { "odd" }))
        .collect()
}

pub fn names(items: &[Item]) -> Vec<String> {
    items.iter().map(|i| i.name.clone()).collect()
}

/// Wraps a `MemorySource` with call counting, latency and injected failures.
pub struct FlakySource {
    pub inner: MemorySource<Item>,
    calls: AtomicUsize,
    failures: AtomicUsize,
    delay: Option<Duration>,
}

impl FlakySource {
    pub fn new(records: Vec<Item>) -> Self {
        Self {
            inner: MemorySource::with_records(records),
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CursorSource for FlakySource {
    type Item = Item;

    async fn paginate(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<SourcePage<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(PagewiseError::Source("connection reset".to_string()));
        }
        self.inner.paginate(key, cursor, limit).await
    }
}
