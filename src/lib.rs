//! Log-file IP reputation scanner.
//!
//! Scans log files for IPv4 addresses, enriches each one with reputation
//! data and decides whether to block it. Each blocked address is reported
//! exactly once per run, however often it appears.
//!
//! # Features
//!
//! - **Permissive extraction** - Any dotted-quad at word boundaries, octet ranges unchecked
//! - **Pluggable reputation** - Static table by default, IPLocate and Tor exit lists optional
//! - **Country and Tor blocking** - Tor exits are always blocked, countries by policy
//! - **Blocklists and allowlist** - Exact-address lists loaded from plain, CSV or JSON files
//! - **Resilient scanning** - Unreadable sources are reported and skipped
//!
//! # Example Configuration
//!
//! ```yaml
//! policy:
//!   blocked_countries: ["China", "Russia", "North Korea"]
//!   allowlist:
//!     - "127.0.0.1"
//!
//! tor:
//!   enabled: true
//!   source: "https://check.torproject.org/torbulkexitlist"
//!
//! iplocate:
//!   enabled: true
//!   api_key: "${IPLOCATE_API_KEY}"
//! ```

pub mod blocklist;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod policy;
pub mod providers;
pub mod report;
pub mod scanner;

pub use config::Config;
pub use error::ScanError;
pub use policy::{BlockDecision, BlockPolicy, PolicyEngine};
pub use providers::{ReputationRecord, ReputationResolver};
pub use scanner::LogScanner;
