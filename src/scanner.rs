//! Log scanning pipeline.
//!
//! Sources are read strictly in the order given, line by line. Each line is
//! split into addresses, each address goes through the policy engine, and
//! every new block is handed to the report sink straight away.

use crate::blocklist;
use crate::config::{Config, Settings};
use crate::error::ScanError;
use crate::extract::addresses;
use crate::policy::{BlockPolicy, PolicyEngine, Verdict};
use crate::providers::iplocate::IpLocateResolver;
use crate::providers::static_table::StaticResolver;
use crate::providers::tor::TorExitResolver;
use crate::providers::{ChainResolver, ReputationResolver};
use crate::report::ReportSink;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Sources read to the end.
    pub sources_scanned: usize,
    /// Sources that could not be opened or failed mid-read.
    pub sources_failed: usize,
    pub lines: usize,
    /// Address occurrences, duplicates included.
    pub addresses: usize,
    /// Resolver calls made.
    pub lookups: usize,
    /// Distinct addresses blocked.
    pub blocked: usize,
}

/// Why scanning a source stopped early.
enum Interrupt {
    /// The source itself failed; reported, then the run goes on.
    Source(ScanError),
    /// The report sink failed; the run cannot continue.
    Sink(io::Error),
}

/// Scans log sources and reports blocked addresses.
pub struct LogScanner<R, S> {
    resolver: R,
    engine: PolicyEngine,
    sink: S,
    settings: Settings,
    stats: ScanStats,
}

impl<S: ReportSink> LogScanner<ChainResolver, S> {
    /// Create a scanner with the providers and policy named by `config`.
    pub fn from_config(config: &Config, sink: S) -> anyhow::Result<Self> {
        let resolver = build_resolver(config)?;
        let policy = BlockPolicy::from_config(&config.policy, blocklist::load_all(&config.blocklists));

        info!(
            providers = resolver.len(),
            blocked_countries = policy.blocked_countries.len(),
            blocked_addresses = policy.blocked_addresses.len(),
            allowlist_entries = policy.allowlist.len(),
            "Scanner initialized"
        );

        Ok(Self::new(resolver, policy, sink).with_settings(config.settings.clone()))
    }
}

impl<R: ReputationResolver, S: ReportSink> LogScanner<R, S> {
    pub fn new(resolver: R, policy: BlockPolicy, sink: S) -> Self {
        Self {
            resolver,
            engine: PolicyEngine::new(policy),
            sink,
            settings: Settings::default(),
            stats: ScanStats::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Scan every path in order. Source failures are reported and skipped.
    ///
    /// Only a failing report sink stops the run.
    pub fn scan_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> io::Result<&ScanStats> {
        for path in paths {
            self.scan_source(path.as_ref())?;
        }

        info!(
            sources_scanned = self.stats.sources_scanned,
            sources_failed = self.stats.sources_failed,
            lines = self.stats.lines,
            addresses = self.stats.addresses,
            lookups = self.stats.lookups,
            blocked = self.stats.blocked,
            "Scan complete"
        );

        Ok(&self.stats)
    }

    /// Scan one file. Returns whether it was read to the end.
    pub fn scan_source(&mut self, path: &Path) -> io::Result<bool> {
        debug!(path = %path.display(), "Scanning log source");

        let outcome = self.read_source(path);
        self.finish_source(outcome)
    }

    /// Count and report how a source ended.
    fn finish_source(&mut self, outcome: Result<(), Interrupt>) -> io::Result<bool> {
        match outcome {
            Ok(()) => {
                self.stats.sources_scanned += 1;
                Ok(true)
            }
            Err(Interrupt::Source(e)) => {
                warn!(path = %e.path().display(), error = %e, "Skipping log source");
                self.stats.sources_failed += 1;
                self.sink.source_error(&e)?;
                Ok(false)
            }
            Err(Interrupt::Sink(e)) => Err(e),
        }
    }

    /// Scan in-memory text as if it were one source.
    pub fn scan_text(&mut self, text: &str) -> io::Result<()> {
        match self.scan_lines(text.as_bytes(), Path::new("<memory>")) {
            Ok(()) => Ok(()),
            Err(Interrupt::Sink(e)) => Err(e),
            Err(Interrupt::Source(e)) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn read_source(&mut self, path: &Path) -> Result<(), Interrupt> {
        // Dropped on every return path, including mid-read errors.
        let file = File::open(path).map_err(|e| Interrupt::Source(ScanError::from_io(path, e)))?;
        self.scan_lines(BufReader::new(file), path)
    }

    fn scan_lines<B: BufRead>(&mut self, mut reader: B, path: &Path) -> Result<(), Interrupt> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| Interrupt::Source(ScanError::from_io(path, e)))?;
            if read == 0 {
                return Ok(());
            }

            self.stats.lines += 1;
            let line = String::from_utf8_lossy(&buf);
            self.scan_line(&line).map_err(Interrupt::Sink)?;
        }
    }

    fn scan_line(&mut self, line: &str) -> io::Result<()> {
        for address in addresses(line) {
            self.stats.addresses += 1;

            match self.engine.evaluate(address, &self.resolver) {
                Verdict::AlreadyBlocked => {}
                Verdict::Allowed(record) => {
                    self.stats.lookups += 1;
                    if self.settings.log_allowed {
                        debug!(ip = address, country = %record.country, "Address allowed");
                    }
                }
                Verdict::Blocked(decision) => {
                    self.stats.lookups += 1;
                    self.stats.blocked += 1;
                    if self.settings.log_blocked {
                        info!(
                            ip = %decision.address,
                            reasons = %decision.reason_text(),
                            "Blocking address"
                        );
                    }
                    self.sink.blocked(&decision)?;
                }
            }
        }

        Ok(())
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Assemble the provider chain. The static table answers first so its
/// countries take precedence over live lookups.
pub fn build_resolver(config: &Config) -> anyhow::Result<ChainResolver> {
    let mut providers: Vec<Box<dyn ReputationResolver>> = Vec::new();

    if config.reputation.enabled {
        let provider = StaticResolver::from_config(&config.reputation.entries);
        info!(entries = provider.len(), "Static reputation table enabled");
        providers.push(Box::new(provider));
    }

    if let Some(ref iplocate_config) = config.iplocate {
        if iplocate_config.enabled {
            providers.push(Box::new(IpLocateResolver::new(iplocate_config.clone())?));
            info!("IPLocate provider enabled");
        }
    }

    if let Some(ref tor_config) = config.tor {
        if tor_config.enabled {
            providers.push(Box::new(TorExitResolver::load(tor_config)));
            info!("Tor exit node detection enabled");
        }
    }

    Ok(ChainResolver::new(providers))
}
