//! In-memory cursor data source.
//!
//! A small storage engine with the guarantees the pager depends on: stable
//! ordering, search and equality filters applied identically on every call,
//! and keyset cursors that stay valid while records are added or removed.

use std::time::Duration;

use parking_lot::RwLock;
use unicase::UniCase;

use crate::error::{PagewiseError, Result};
use crate::query::{QueryKey, SortOrder};

use super::{Cursor, CursorSource, SourcePage};

/// A record that can be searched, filtered and ordered by `MemorySource`.
pub trait Searchable {
    /// Unique id, used as the ordering tie-breaker.
    fn id(&self) -> &str;

    /// Text matched against the search string.
    fn search_text(&self) -> String;

    /// Value of a filterable field, if the record has it.
    fn filter_value(&self, field: &str) -> Option<&str>;

    /// Primary ordering key.
    fn sort_key(&self) -> String;
}

/// Thread-safe in-memory source over a vector of records.
#[derive(Debug)]
pub struct MemorySource<T> {
    records: RwLock<Vec<T>>,
    latency: Option<Duration>,
}

impl<T> MemorySource<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            latency: None,
        }
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
            latency: None,
        }
    }

    /// Delay every fetch by `latency`, to mimic a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    pub fn insert(&self, record: T) {
        self.records.write().push(record);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = T>) {
        self.records.write().extend(records);
    }

    /// Remove a record by id, returning it if it existed.
    pub fn remove(&self, id: &str) -> Option<T> {
        let mut records = self.records.write();
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    /// Remove every record, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Sorted distinct values of a filterable field.
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .records
            .read()
            .iter()
            .filter_map(|r| r.filter_value(field).map(str::to_string))
            .collect();
        values.sort();
        values.dedup();
        values
    }

    fn page_now(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<SourcePage<T>> {
        let after = cursor.map(decode_cursor).transpose()?;
        let needle = key.search().to_lowercase();

        let records = self.records.read();
        let mut matching: Vec<(String, &T)> = records
            .iter()
            .filter(|r| needle.is_empty() || r.search_text().to_lowercase().contains(&needle))
            .filter(|r| {
                key.filters().iter().all(|(field, expected)| {
                    r.filter_value(field)
                        .is_some_and(|v| UniCase::new(v) == UniCase::new(expected.as_str()))
                })
            })
            .map(|r| (r.sort_key(), r))
            .collect();

        matching.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.id().cmp(b.id())));
        if key.order() == SortOrder::Desc {
            matching.reverse();
        }

        let start = match &after {
            None => 0,
            Some((sort_key, id)) => {
                let position = (sort_key.as_str(), id.as_str());
                match key.order() {
                    SortOrder::Asc => matching
                        .partition_point(|(k, r)| (k.as_str(), r.id()) <= position),
                    SortOrder::Desc => matching
                        .partition_point(|(k, r)| (k.as_str(), r.id()) >= position),
                }
            }
        };

        let end = start.saturating_add(limit).min(matching.len());
        let page: Vec<T> = matching[start..end].iter().map(|(_, r)| (*r).clone()).collect();

        let continue_cursor = match matching[start..end].last() {
            Some((sort_key, record)) => Some(encode_cursor(sort_key, record.id())?),
            None => cursor.cloned(),
        };

        Ok(SourcePage {
            page,
            continue_cursor,
            is_done: end >= matching.len(),
        })
    }
}

impl<T> CursorSource for MemorySource<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    type Item = T;

    async fn paginate(
        &self,
        key: &QueryKey,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<SourcePage<T>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.page_now(key, cursor, limit)
    }
}

fn encode_cursor(sort_key: &str, id: &str) -> Result<Cursor> {
    Ok(Cursor::new(serde_json::to_string(&(sort_key, id))?))
}

fn decode_cursor(cursor: &Cursor) -> Result<(String, String)> {
    serde_json::from_str(cursor.as_str())
        .map_err(|_| PagewiseError::InvalidCursor(cursor.to_string()))
}
