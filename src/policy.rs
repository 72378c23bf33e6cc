//! Blocking policy and per-run deduplication.
//!
//! An address is evaluated the first time it is seen. If it is blocked it
//! goes into the seen set and is never looked up or reported again during
//! the run. Addresses that are not blocked are not remembered: every later
//! occurrence is resolved and evaluated afresh.

use crate::config::PolicyConfig;
use crate::extract::Address;
use crate::providers::{ReputationRecord, ReputationResolver};
use std::collections::HashSet;
use tracing::debug;

/// Reason label for Tor exit nodes.
pub const TOR_REASON: &str = "Tor Exit Node";

/// Reason text reported when a block has no specific reason.
pub const FALLBACK_REASON: &str = "suspicious activity";

/// Which addresses get blocked.
#[derive(Debug, Clone, Default)]
pub struct BlockPolicy {
    /// Countries blocked unconditionally.
    pub blocked_countries: HashSet<String>,

    /// Addresses blocked unconditionally.
    pub blocked_addresses: HashSet<Address>,

    /// Addresses never blocked.
    pub allowlist: HashSet<Address>,
}

impl BlockPolicy {
    /// Policy that blocks the given countries (and Tor exits).
    pub fn with_countries<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked_countries: countries.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Build from configuration plus addresses loaded from blocklists.
    pub fn from_config(config: &PolicyConfig, blocked_addresses: HashSet<Address>) -> Self {
        Self {
            blocked_countries: config.blocked_countries.iter().cloned().collect(),
            blocked_addresses,
            allowlist: config.allowlist.iter().map(|a| Address::from(a.as_str())).collect(),
        }
    }

    /// The blocking predicate.
    pub fn should_block(&self, address: &str, record: &ReputationRecord) -> bool {
        if self.allowlist.contains(address) {
            return false;
        }

        record.is_tor
            || self.blocked_countries.contains(&record.country)
            || self.blocked_addresses.contains(address)
    }
}

/// Build the justification for a block: the country when known, then the
/// Tor label.
pub fn block_reasons(record: &ReputationRecord) -> Vec<String> {
    let mut reasons = Vec::new();

    if record.has_country() {
        reasons.push(record.country.clone());
    }
    if record.is_tor {
        reasons.push(TOR_REASON.to_string());
    }

    reasons
}

/// Final decision for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDecision {
    pub address: Address,
    pub reasons: Vec<String>,
    pub blocked: bool,
}

impl BlockDecision {
    /// Reasons joined for display, or the fallback text if there are none.
    pub fn reason_text(&self) -> String {
        if self.reasons.is_empty() {
            FALLBACK_REASON.to_string()
        } else {
            self.reasons.join(", ")
        }
    }
}

/// Outcome of presenting one address occurrence to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Already blocked earlier in the run; nothing was looked up.
    AlreadyBlocked,
    /// Looked up and not blocked. Not remembered.
    Allowed(ReputationRecord),
    /// Newly blocked.
    Blocked(BlockDecision),
}

/// Applies a [`BlockPolicy`] and owns the run's seen set.
#[derive(Debug, Default)]
pub struct PolicyEngine {
    policy: BlockPolicy,
    seen: HashSet<Address>,
}

impl PolicyEngine {
    pub fn new(policy: BlockPolicy) -> Self {
        Self {
            policy,
            seen: HashSet::new(),
        }
    }

    /// Evaluate one occurrence of `address`, resolving it if needed.
    pub fn evaluate<R>(&mut self, address: &str, resolver: &R) -> Verdict
    where
        R: ReputationResolver + ?Sized,
    {
        if self.seen.contains(address) {
            debug!(ip = address, "Already blocked, skipping");
            return Verdict::AlreadyBlocked;
        }

        let record = resolver.lookup(address);

        if !self.policy.should_block(address, &record) {
            return Verdict::Allowed(record);
        }

        let address = Address::from(address);
        self.seen.insert(address.clone());

        Verdict::Blocked(BlockDecision {
            address,
            reasons: block_reasons(&record),
            blocked: true,
        })
    }

    /// Whether `address` has been blocked in this run.
    pub fn is_blocked(&self, address: &str) -> bool {
        self.seen.contains(address)
    }

    /// Number of distinct addresses blocked so far.
    pub fn blocked_count(&self) -> usize {
        self.seen.len()
    }
}
