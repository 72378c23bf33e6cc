//! File-based address blocklists.
//!
//! Entries are exact dotted-quads; anything else in the file is skipped.

use crate::config::{BlocklistConfig, BlocklistFormat};
use crate::extract::{is_address, Address};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Errors from loading a blocklist file.
#[derive(Debug, thiserror::Error)]
pub enum BlocklistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load every enabled blocklist and merge the addresses.
///
/// A list that fails to load is logged and skipped.
pub fn load_all(configs: &[BlocklistConfig]) -> HashSet<Address> {
    let mut merged = HashSet::new();

    for config in configs.iter().filter(|c| c.enabled) {
        match load_blocklist(&config.path, config.format) {
            Ok(entries) => {
                info!(
                    blocklist = %config.name,
                    entries = entries.len(),
                    "Blocklist loaded"
                );
                merged.extend(entries);
            }
            Err(e) => {
                warn!(
                    blocklist = %config.name,
                    error = %e,
                    "Failed to load blocklist"
                );
            }
        }
    }

    merged
}

/// Load a blocklist from a file.
pub fn load_blocklist(path: &Path, format: BlocklistFormat) -> Result<HashSet<Address>, BlocklistError> {
    let content = std::fs::read_to_string(path)?;

    match format {
        BlocklistFormat::Plain => Ok(parse_plain(&content)),
        BlocklistFormat::Csv => Ok(parse_csv(&content)),
        BlocklistFormat::Json => parse_json(&content),
    }
}

fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// One address per line.
fn parse_plain(content: &str) -> HashSet<Address> {
    content_lines(content).filter_map(Address::parse).collect()
}

/// Address in the first column.
fn parse_csv(content: &str) -> HashSet<Address> {
    content_lines(content)
        .filter_map(|line| line.split(',').next())
        .filter_map(|first| Address::parse(first.trim()))
        .collect()
}

/// JSON array of addresses.
fn parse_json(content: &str) -> Result<HashSet<Address>, BlocklistError> {
    let ips: Vec<String> = serde_json::from_str(content)?;

    Ok(ips
        .iter()
        .map(|ip| ip.trim())
        .filter(|ip| is_address(ip))
        .map(Address::from)
        .collect())
}
