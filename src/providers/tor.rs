//! Tor exit node detection provider.

use super::{ProviderError, ReputationRecord, ReputationResolver};
use crate::config::TorConfig;
use reqwest::blocking::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Marks addresses found in a Tor bulk exit list.
///
/// Knows nothing about geography; every answer has an unknown country.
pub struct TorExitResolver {
    exit_nodes: HashSet<String>,
}

impl TorExitResolver {
    /// Load the exit list named by the config.
    ///
    /// A list that cannot be fetched is logged and treated as empty, so the
    /// scan still runs with the remaining providers.
    pub fn load(config: &TorConfig) -> Self {
        let exit_nodes = match fetch_exit_list(config) {
            Ok(nodes) => {
                info!(exit_nodes = nodes.len(), source = %config.source, "Tor exit node list loaded");
                nodes
            }
            Err(e) => {
                warn!(error = %e, source = %config.source, "Failed to load Tor exit node list");
                HashSet::new()
            }
        };

        Self { exit_nodes }
    }

    /// Build from an already known set of exit addresses.
    pub fn from_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exit_nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the number of loaded exit nodes.
    pub fn exit_node_count(&self) -> usize {
        self.exit_nodes.len()
    }
}

impl ReputationResolver for TorExitResolver {
    fn lookup(&self, address: &str) -> ReputationRecord {
        if self.exit_nodes.contains(address) {
            debug!(ip = address, "IP is a Tor exit node");
            ReputationRecord::unknown().with_tor()
        } else {
            ReputationRecord::unknown()
        }
    }

    fn name(&self) -> &str {
        "tor"
    }
}

fn fetch_exit_list(config: &TorConfig) -> Result<HashSet<String>, ProviderError> {
    let content = if is_url(&config.source) {
        debug!(url = %config.source, "Fetching Tor exit node list");

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let response = client.get(&config.source).send()?;

        if !response.status().is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response.text().map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to read response: {}", e))
        })?
    } else {
        std::fs::read_to_string(&config.source)?
    };

    Ok(parse_exit_list(&content))
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Parse a bulk exit list: one address per line, `#` comments allowed.
fn parse_exit_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| crate::extract::is_address(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_for(source: &str) -> TorConfig {
        TorConfig {
            enabled: true,
            source: source.to_string(),
            timeout_ms: 500,
        }
    }

    #[test]
    fn test_provider_name() {
        let provider = TorExitResolver::from_nodes(Vec::<String>::new());
        assert_eq!(provider.name(), "tor");
    }

    #[test]
    fn test_lookup_exit_node() {
        let provider = TorExitResolver::from_nodes(["1.2.3.4"]);

        let record = provider.lookup("1.2.3.4");
        assert!(record.is_tor);
        assert!(!record.has_country());

        assert_eq!(provider.lookup("5.6.7.8"), ReputationRecord::unknown());
    }

    #[test]
    fn test_parse_exit_list() {
        let content = "# exit list\n1.2.3.4\n\n  5.6.7.8  \ngarbage\n";
        let nodes = parse_exit_list(content);
        assert_eq!(nodes.len(), 2);
        assert!(nodes.contains("5.6.7.8"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1.2.3.4\n9.9.9.9\n").unwrap();
        file.flush().unwrap();

        let provider = TorExitResolver::load(&config_for(&file.path().display().to_string()));
        assert_eq!(provider.exit_node_count(), 2);
        assert!(provider.lookup("9.9.9.9").is_tor);
    }

    #[test]
    fn test_load_failure_is_empty() {
        let provider = TorExitResolver::load(&config_for("/nonexistent/tor-exit-list.txt"));
        assert_eq!(provider.exit_node_count(), 0);
        assert!(!provider.lookup("1.2.3.4").is_tor);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://check.torproject.org/torbulkexitlist"));
        assert!(is_url("http://localhost/list"));
        assert!(!is_url("/var/lib/tor/exits.txt"));
    }
}
