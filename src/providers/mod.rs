//! Reputation providers.
//!
//! Every provider answers the same total question: given an address, what
//! country is it in and is it a Tor exit node. Providers never fail outward;
//! lookup problems are logged and answered with [`ReputationRecord::unknown`].

pub mod iplocate;
pub mod static_table;
pub mod tor;

use tracing::debug;

/// Country value used when a provider knows nothing about an address.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Reputation attributes for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReputationRecord {
    /// Country name, or [`UNKNOWN_COUNTRY`].
    pub country: String,

    /// Whether the address is a known Tor exit node.
    pub is_tor: bool,
}

impl ReputationRecord {
    /// Create a record for a known address.
    pub fn new(country: &str, is_tor: bool) -> Self {
        Self {
            country: country.to_string(),
            is_tor,
        }
    }

    /// The record for an address nobody has data on.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_COUNTRY, false)
    }

    /// Mark as Tor exit node.
    pub fn with_tor(mut self) -> Self {
        self.is_tor = true;
        self
    }

    /// Whether the country is known.
    pub fn has_country(&self) -> bool {
        self.country != UNKNOWN_COUNTRY
    }
}

impl Default for ReputationRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Error from a live reputation provider.
///
/// These stay inside the provider; callers only ever see a record.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(e)
        }
    }
}

/// Trait for address reputation lookups.
pub trait ReputationResolver: Send + Sync {
    /// Look up an address. Total: unknown or failed lookups yield
    /// [`ReputationRecord::unknown`].
    fn lookup(&self, address: &str) -> ReputationRecord;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

impl<R: ReputationResolver + ?Sized> ReputationResolver for Box<R> {
    fn lookup(&self, address: &str) -> ReputationRecord {
        (**self).lookup(address)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Queries several providers and merges their answers.
///
/// The country comes from the first provider that knows it; the Tor flag is
/// set if any provider reports it.
pub struct ChainResolver {
    providers: Vec<Box<dyn ReputationResolver>>,
}

impl ChainResolver {
    pub fn new(providers: Vec<Box<dyn ReputationResolver>>) -> Self {
        Self { providers }
    }

    /// Number of chained providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ReputationResolver for ChainResolver {
    fn lookup(&self, address: &str) -> ReputationRecord {
        let mut merged = ReputationRecord::unknown();

        for provider in &self.providers {
            let record = provider.lookup(address);
            debug!(
                provider = provider.name(),
                ip = address,
                country = %record.country,
                is_tor = record.is_tor,
                "Provider answered"
            );

            if !merged.has_country() && record.has_country() {
                merged.country = record.country;
            }
            merged.is_tor |= record.is_tor;
        }

        merged
    }

    fn name(&self) -> &str {
        "chain"
    }
}
