//! Per-table write serialization

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per table id, created on first use
///
/// Entries are never evicted; a restaurant has a bounded number of tables.
#[derive(Debug, Clone, Default)]
pub struct TableLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl TableLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `table_id`; released on drop
    pub async fn lock(&self, table_id: i64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard guard is released before awaiting
        let mutex = self.inner.entry(table_id).or_default().clone();
        mutex.lock_owned().await
    }
}
