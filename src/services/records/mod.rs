pub mod matcher;
pub mod merge;
pub mod sheet;

use async_trait::async_trait;

use crate::models::CustomerRecord;

/// Opaque handle to a stored row. Only the adapter that issued it knows
/// what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey(i64);

impl RowKey {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

/// Persistence for customer records. Rows come back in insertion order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, owner: &str) -> anyhow::Result<Vec<(RowKey, CustomerRecord)>>;
    async fn append(&self, record: &CustomerRecord) -> anyhow::Result<RowKey>;
    async fn update(&self, key: RowKey, record: &CustomerRecord) -> anyhow::Result<()>;
}
