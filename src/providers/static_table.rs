//! Static in-memory reputation table.

use super::{ReputationRecord, ReputationResolver};
use crate::config::ReputationEntry;
use std::collections::HashMap;

/// Reputation provider backed by a fixed address table.
///
/// Stands in for a live intelligence service; lookups are exact string
/// matches on the address.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, ReputationRecord>,
}

impl StaticResolver {
    /// Build from `(address, record)` pairs. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ReputationRecord)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build from configured table entries.
    pub fn from_config(entries: &[ReputationEntry]) -> Self {
        Self::from_entries(
            entries
                .iter()
                .map(|e| (e.address.clone(), ReputationRecord::new(&e.country, e.tor))),
        )
    }

    /// The built-in sample table.
    pub fn builtin() -> Self {
        Self::from_config(&crate::config::default_reputation_entries())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReputationResolver for StaticResolver {
    fn lookup(&self, address: &str) -> ReputationRecord {
        self.entries.get(address).cloned().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "static"
    }
}
