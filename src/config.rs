//! Configuration types for the log scanner.

use crate::extract::is_address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
///
/// Every section has defaults, so an empty file (or no file at all) gives
/// the built-in reputation table and blocked countries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,

    /// Blocking policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Static reputation table.
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// IPLocate live lookup provider.
    #[serde(default)]
    pub iplocate: Option<IpLocateConfig>,

    /// Tor exit node detection.
    #[serde(default)]
    pub tor: Option<TorConfig>,

    /// File-based address blocklists.
    #[serde(default)]
    pub blocklists: Vec<BlocklistConfig>,
}

/// Global settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Log each blocked address.
    #[serde(default = "default_true")]
    pub log_blocked: bool,

    /// Log each address that was looked up and allowed.
    #[serde(default)]
    pub log_allowed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_blocked: true,
            log_allowed: false,
        }
    }
}

/// Blocking policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Countries whose addresses are always blocked.
    #[serde(default = "default_blocked_countries")]
    pub blocked_countries: Vec<String>,

    /// Addresses that are never blocked.
    #[serde(default)]
    pub allowlist: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            blocked_countries: default_blocked_countries(),
            allowlist: Vec::new(),
        }
    }
}

fn default_blocked_countries() -> Vec<String> {
    vec![
        "China".to_string(),
        "Russia".to_string(),
        "North Korea".to_string(),
    ]
}

/// Static reputation table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReputationConfig {
    /// Use the static table as a provider.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Table entries.
    #[serde(default = "default_reputation_entries")]
    pub entries: Vec<ReputationEntry>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entries: default_reputation_entries(),
        }
    }
}

/// One row of the static reputation table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReputationEntry {
    pub address: String,
    pub country: String,
    #[serde(default)]
    pub tor: bool,
}

/// The sample table used when none is configured.
pub fn default_reputation_entries() -> Vec<ReputationEntry> {
    [
        ("203.0.113.42", "China", true),
        ("198.51.100.17", "Russia", false),
        ("192.168.1.10", "United States", false),
        ("45.83.64.12", "North Korea", false),
    ]
    .into_iter()
    .map(|(address, country, tor)| ReputationEntry {
        address: address.to_string(),
        country: country.to_string(),
        tor,
    })
    .collect()
}

/// IPLocate provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpLocateConfig {
    /// Enable IPLocate lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax).
    pub api_key: String,

    /// Lookup endpoint; the address is appended as a path segment.
    #[serde(default = "default_iplocate_url")]
    pub base_url: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Cache TTL in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Maximum cached lookups.
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
}

fn default_iplocate_url() -> String {
    "https://iplocate.io/api/lookup".to_string()
}

fn default_timeout() -> u64 {
    5000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_max_cache_entries() -> usize {
    10000
}

/// Tor exit node detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorConfig {
    /// Enable Tor exit node detection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL or file path of the bulk exit list.
    #[serde(default = "default_tor_source")]
    pub source: String,

    /// Fetch timeout in milliseconds when `source` is a URL.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_tor_source() -> String {
    "https://check.torproject.org/torbulkexitlist".to_string()
}

/// File-based blocklist configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlocklistConfig {
    /// Name for logging.
    pub name: String,

    /// Enable this blocklist.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to blocklist file.
    pub path: PathBuf,

    /// File format.
    #[serde(default)]
    pub format: BlocklistFormat,
}

/// Blocklist file format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlocklistFormat {
    /// Plain text, one address per line.
    #[default]
    Plain,
    /// CSV with the address in the first column.
    Csv,
    /// JSON array of addresses.
    Json,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content)?;
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.policy.blocked_countries.iter().any(|c| c.trim().is_empty()) {
            anyhow::bail!("blocked_countries must not contain empty names");
        }

        for entry in &self.policy.allowlist {
            if !is_address(entry) {
                anyhow::bail!("Invalid allowlist entry: {}", entry);
            }
        }

        for entry in &self.reputation.entries {
            if !is_address(&entry.address) {
                anyhow::bail!("Invalid reputation entry address: {}", entry.address);
            }
            if entry.country.trim().is_empty() {
                anyhow::bail!("Reputation entry {} has an empty country", entry.address);
            }
        }

        if let Some(ref iplocate) = self.iplocate {
            if iplocate.enabled && iplocate.api_key.is_empty() {
                anyhow::bail!("IPLocate is enabled but api_key is empty");
            }
        }

        if let Some(ref tor) = self.tor {
            if tor.enabled && tor.source.trim().is_empty() {
                anyhow::bail!("Tor detection is enabled but source is empty");
            }
        }

        for blocklist in &self.blocklists {
            if blocklist.enabled && !blocklist.path.exists() {
                anyhow::bail!(
                    "Blocklist '{}' path does not exist: {}",
                    blocklist.name,
                    blocklist.path.display()
                );
            }
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# IP Reputation Scanner Configuration

settings:
  log_blocked: true            # log each blocked address
  log_allowed: false           # log each allowed lookup (debug level)

policy:
  blocked_countries:
    - "China"
    - "Russia"
    - "North Korea"
  allowlist:                   # exact addresses, never blocked
    - "127.0.0.1"

# Static reputation table (the built-in sample table if omitted)
reputation:
  enabled: true
  entries:
    - { address: "203.0.113.42", country: "China", tor: true }
    - { address: "198.51.100.17", country: "Russia", tor: false }
    - { address: "192.168.1.10", country: "United States", tor: false }
    - { address: "45.83.64.12", country: "North Korea", tor: false }

# IPLocate live lookups (optional)
iplocate:
  enabled: false
  api_key: "${IPLOCATE_API_KEY}"  # Use environment variable
  base_url: "https://iplocate.io/api/lookup"
  timeout_ms: 5000
  cache_ttl_seconds: 3600
  max_cache_entries: 10000

# Tor exit node detection (optional)
tor:
  enabled: false
  source: "https://check.torproject.org/torbulkexitlist"  # URL or file path
  timeout_ms: 5000

# Exact-address blocklists (optional)
blocklists:
  - name: "internal-blocklist"
    enabled: false
    path: "/etc/ip-reputation-scan/blocklist.txt"
    format: plain              # plain, csv, or json
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> anyhow::Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

    let expanded = re.replace_all(content, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });

    Ok(expanded.into_owned())
}
