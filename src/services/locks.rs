use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::services::phone;

/// Serializes read-modify-write cycles per (owner, normalized phone) so two
/// transcripts for the same customer cannot clobber each other's merge.
#[derive(Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, owner: &str, phone: &str) -> OwnedMutexGuard<()> {
        let key = format!("{owner}\u{1f}{}", phone::normalize(phone));
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            // Drop locks nobody holds or waits on.
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(key).or_default().clone()
        };
        entry.lock_owned().await
    }
}
