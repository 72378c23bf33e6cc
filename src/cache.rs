//! Expiring lookup cache for live reputation providers.

use crate::providers::ReputationRecord;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Records keyed by address, each valid for one TTL after insertion.
///
/// When full, expired records are dropped first, then the oldest one.
pub struct ReputationCache {
    entries: RwLock<HashMap<String, (ReputationRecord, Instant)>>,
    ttl: Duration,
    capacity: usize,
}

impl ReputationCache {
    pub fn new(ttl_seconds: u64, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
            capacity,
        }
    }

    fn is_fresh(&self, stored_at: Instant) -> bool {
        stored_at.elapsed() <= self.ttl
    }

    /// The cached record for `address`, unless missing or expired.
    pub fn get(&self, address: &str) -> Option<ReputationRecord> {
        let entries = self.entries.read().ok()?;
        let (record, stored_at) = entries.get(address)?;

        self.is_fresh(*stored_at).then(|| record.clone())
    }

    /// Remember `record` for `address`. A zero capacity disables caching.
    pub fn set(&self, address: &str, record: ReputationRecord) {
        if self.capacity == 0 {
            return;
        }

        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        if entries.len() >= self.capacity && !entries.contains_key(address) {
            entries.retain(|_, (_, stored_at)| stored_at.elapsed() <= self.ttl);

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, (_, stored_at))| *stored_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(address.to_string(), (record, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
