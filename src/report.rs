//! Output of decisions and source errors.

use crate::error::ScanError;
use crate::policy::BlockDecision;
use std::io::{self, Write};

/// Receives everything the scan reports.
pub trait ReportSink {
    /// A newly blocked address.
    fn blocked(&mut self, decision: &BlockDecision) -> io::Result<()>;

    /// A source that could not be scanned.
    fn source_error(&mut self, error: &ScanError) -> io::Result<()>;
}

/// Format the report line for a block decision.
pub fn format_decision(decision: &BlockDecision) -> String {
    format!(
        "[BLOCKED] IP {} ({}) has been blocked.",
        decision.address,
        decision.reason_text()
    )
}

/// Format the report line for a source error.
pub fn format_error(error: &ScanError) -> String {
    format!("[ERROR] {}", error)
}

/// Writes one line per report to any [`Write`].
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for LineSink<W> {
    fn blocked(&mut self, decision: &BlockDecision) -> io::Result<()> {
        writeln!(self.out, "{}", format_decision(decision))?;
        self.out.flush()
    }

    fn source_error(&mut self, error: &ScanError) -> io::Result<()> {
        writeln!(self.out, "{}", format_error(error))?;
        self.out.flush()
    }
}

/// Keeps reports in memory, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub decisions: Vec<BlockDecision>,
    pub errors: Vec<String>,
}

impl ReportSink for CollectingSink {
    fn blocked(&mut self, decision: &BlockDecision) -> io::Result<()> {
        self.decisions.push(decision.clone());
        Ok(())
    }

    fn source_error(&mut self, error: &ScanError) -> io::Result<()> {
        self.errors.push(format_error(error));
        Ok(())
    }
}
