//! Key-value table backend: one row per record with an `id` and a `data`
//! column.
//!
//! The remote table is reached through [`TableClient`] so the provider logic
//! (identifier generation, not-found mapping, bounded scans) does not depend
//! on a particular SDK.

use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{Arc, RwLock},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use data_model::{RecordId, StorageTarget};

use crate::{listing::IdCollector, StorageError, StorageProvider, StorageResult};

pub const ID_COLUMN: &str = "id";
pub const DATA_COLUMN: &str = "data";

/// One page of a table scan.
#[derive(Debug, Default, Clone)]
pub struct ScanPage {
    /// Raw `id` column values, unvalidated.
    pub ids: Vec<String>,

    /// Key to resume from, `None` once the table is exhausted.
    pub last_key: Option<String>,
}

/// Minimal set of table operations the provider needs.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn put_item(&self, id: &str, data: &str) -> Result<()>;

    async fn get_item(&self, id: &str) -> Result<Option<String>>;

    /// Deleting a missing row is not an error.
    async fn delete_item(&self, id: &str) -> Result<()>;

    async fn scan(&self, page_size: Option<usize>, start_after: Option<String>)
        -> Result<ScanPage>;
}

/// Table client keeping rows in process memory, ordered by key.
#[derive(Default)]
pub struct InMemoryTable {
    rows: RwLock<BTreeMap<String, String>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableClient for InMemoryTable {
    async fn put_item(&self, id: &str, data: &str) -> Result<()> {
        let mut rows = self.rows.write().map_err(|_| anyhow!("table lock poisoned"))?;
        rows.insert(id.to_string(), data.to_string());
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<String>> {
        let rows = self.rows.read().map_err(|_| anyhow!("table lock poisoned"))?;
        Ok(rows.get(id).cloned())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        let mut rows = self.rows.write().map_err(|_| anyhow!("table lock poisoned"))?;
        rows.remove(id);
        Ok(())
    }

    async fn scan(
        &self,
        page_size: Option<usize>,
        start_after: Option<String>,
    ) -> Result<ScanPage> {
        let rows = self.rows.read().map_err(|_| anyhow!("table lock poisoned"))?;
        let lower = match &start_after {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };
        let page_size = page_size.unwrap_or(usize::MAX);
        let mut remaining = rows.range((lower, Bound::Unbounded)).map(|(k, _)| k);
        let ids: Vec<String> = remaining.by_ref().take(page_size).cloned().collect();
        let last_key = match remaining.next() {
            Some(_) => ids.last().cloned(),
            None => None,
        };
        Ok(ScanPage { ids, last_key })
    }
}

pub struct TableProvider {
    client: Arc<dyn TableClient>,
    table: String,
}

impl TableProvider {
    pub fn new(client: Arc<dyn TableClient>, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn unavailable(e: anyhow::Error) -> StorageError {
        StorageError::unavailable(StorageTarget::Table, e)
    }
}

#[async_trait]
impl StorageProvider for TableProvider {
    fn kind(&self) -> StorageTarget {
        StorageTarget::Table
    }

    async fn write(&self, payload: &str) -> StorageResult<RecordId> {
        let id = RecordId::new();
        self.client
            .put_item(&id.to_string(), payload)
            .await
            .map_err(Self::unavailable)?;
        Ok(id)
    }

    async fn read(&self, id: &RecordId) -> StorageResult<String> {
        self.client
            .get_item(&id.to_string())
            .await
            .map_err(Self::unavailable)?
            .ok_or(StorageError::NotFound { id: *id })
    }

    async fn delete(&self, id: &RecordId) -> StorageResult<()> {
        self.client
            .delete_item(&id.to_string())
            .await
            .map_err(Self::unavailable)
    }

    /// Scans page by page until enough valid identifiers are collected.
    /// Rows with foreign ids do not count towards the limit.
    async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<RecordId>> {
        let mut collector = IdCollector::new(limit);
        let mut start_after = None;
        loop {
            let page = self
                .client
                .scan(collector.remaining(), start_after)
                .await
                .map_err(Self::unavailable)?;
            for id in &page.ids {
                collector.offer(id);
            }
            match page.last_key {
                Some(key) if !collector.is_full() => start_after = Some(key),
                _ => break,
            }
        }
        Ok(collector.into_ids())
    }
}
