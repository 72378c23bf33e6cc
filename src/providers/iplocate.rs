//! IPLocate geolocation provider.

use super::{ProviderError, ReputationRecord, ReputationResolver, UNKNOWN_COUNTRY};
use crate::cache::ReputationCache;
use crate::config::IpLocateConfig;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// IPLocate lookup response. Only the fields used for decisions.
#[derive(Debug, Deserialize)]
struct IpLocateResponse {
    #[serde(default)]
    country: Option<String>,

    #[serde(default)]
    privacy: IpLocatePrivacy,
}

#[derive(Debug, Default, Deserialize)]
struct IpLocatePrivacy {
    #[serde(default)]
    is_tor: bool,
}

impl From<IpLocateResponse> for ReputationRecord {
    fn from(response: IpLocateResponse) -> Self {
        let country = response
            .country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        ReputationRecord {
            country,
            is_tor: response.privacy.is_tor,
        }
    }
}

/// Live lookups against the IPLocate API, with a TTL cache in front.
///
/// Any failure is answered with the unknown record.
pub struct IpLocateResolver {
    config: IpLocateConfig,
    client: Client,
    cache: ReputationCache,
}

impl IpLocateResolver {
    /// Create a new IPLocate provider.
    pub fn new(config: IpLocateConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let cache = ReputationCache::new(config.cache_ttl_seconds, config.max_cache_entries);

        Ok(Self {
            config,
            client,
            cache,
        })
    }

    fn lookup_url(&self, address: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), address)
    }

    fn fetch(&self, address: &str) -> Result<ReputationRecord, ProviderError> {
        debug!(ip = address, "Querying IPLocate");

        let response = self
            .client
            .get(self.lookup_url(address))
            .header("X-API-Key", &self.config.api_key)
            .header("Accept", "application/json")
            .send()?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::InvalidResponse(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body: IpLocateResponse = response.json().map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(body.into())
    }
}

impl ReputationResolver for IpLocateResolver {
    fn lookup(&self, address: &str) -> ReputationRecord {
        if let Some(cached) = self.cache.get(address) {
            debug!(ip = address, "IPLocate cache hit");
            return cached;
        }

        match self.fetch(address) {
            Ok(record) => {
                debug!(
                    ip = address,
                    country = %record.country,
                    is_tor = record.is_tor,
                    "IPLocate lookup complete"
                );
                self.cache.set(address, record.clone());
                record
            }
            Err(e) => {
                warn!(ip = address, error = %e, "IPLocate lookup failed");
                ReputationRecord::unknown()
            }
        }
    }

    fn name(&self) -> &str {
        "iplocate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> IpLocateConfig {
        IpLocateConfig {
            enabled: true,
            api_key: "test-key".to_string(),
            // Nothing listens on the discard port; connections fail fast.
            base_url: "http://127.0.0.1:9/api/lookup".to_string(),
            timeout_ms: 500,
            cache_ttl_seconds: 3600,
            max_cache_entries: 100,
        }
    }

    #[test]
    fn test_provider_name() {
        let provider = IpLocateResolver::new(create_test_config()).unwrap();
        assert_eq!(provider.name(), "iplocate");
    }

    #[test]
    fn test_lookup_url() {
        let mut config = create_test_config();
        config.base_url = "https://iplocate.io/api/lookup/".to_string();
        let provider = IpLocateResolver::new(config).unwrap();
        assert_eq!(
            provider.lookup_url("1.2.3.4"),
            "https://iplocate.io/api/lookup/1.2.3.4"
        );
    }

    #[test]
    fn test_response_mapping() {
        let json = r#"{
            "ip": "203.0.113.42",
            "country": "China",
            "country_code": "CN",
            "privacy": { "is_tor": true, "is_vpn": false, "is_proxy": false }
        }"#;
        let response: IpLocateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(ReputationRecord::from(response), ReputationRecord::new("China", true));
    }

    #[test]
    fn test_response_missing_fields() {
        let response: IpLocateResponse = serde_json::from_str(r#"{"ip": "10.0.0.1"}"#).unwrap();
        assert_eq!(ReputationRecord::from(response), ReputationRecord::unknown());

        let response: IpLocateResponse =
            serde_json::from_str(r#"{"country": "", "privacy": {}}"#).unwrap();
        assert_eq!(ReputationRecord::from(response), ReputationRecord::unknown());
    }

    #[test]
    fn test_cache_hit() {
        let provider = IpLocateResolver::new(create_test_config()).unwrap();
        provider.cache.set("1.2.3.4", ReputationRecord::new("Russia", true));

        assert_eq!(provider.lookup("1.2.3.4"), ReputationRecord::new("Russia", true));
    }

    #[test]
    fn test_failure_maps_to_unknown() {
        let provider = IpLocateResolver::new(create_test_config()).unwrap();

        assert_eq!(provider.lookup("1.2.3.4"), ReputationRecord::unknown());
        // Failures are not cached.
        assert!(provider.cache.is_empty());
    }

    #[test]
    fn test_api_key_not_in_error() {
        let mut config = create_test_config();
        config.api_key = "SUPERSECRETKEY".to_string();
        let provider = IpLocateResolver::new(config).unwrap();

        let err = provider.fetch("1.2.3.4").unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
    }
}
