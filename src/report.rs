// 🗂️ Report Kinds - one tagged union instead of branching on a type string
//
// TransactionDetail → /api/analyze   (P&L from a transaction export)
// Quarterly         → /api/quarterly (department income statement)
// HcAnalysis        → /api/quarterly, then headcount split computed here

use crate::aggregate::HcAnalysis;
use crate::error::{Error, Result};
use crate::model::{PlReport, QuarterlyReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// REPORT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    TransactionDetail,
    Quarterly,
    HcAnalysis,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::TransactionDetail,
        ReportKind::Quarterly,
        ReportKind::HcAnalysis,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            ReportKind::TransactionDetail => "Transaction Detail (P&L)",
            ReportKind::Quarterly => "Quarterly Income Statement",
            ReportKind::HcAnalysis => "Headcount Analysis",
        }
    }

    /// Short code used in URLs and on the command line
    pub fn code(&self) -> &str {
        match self {
            ReportKind::TransactionDetail => "transaction-detail",
            ReportKind::Quarterly => "quarterly",
            ReportKind::HcAnalysis => "hc-analysis",
        }
    }

    /// Analysis endpoint path on the upstream service
    pub fn endpoint(&self) -> &str {
        match self {
            ReportKind::TransactionDetail => "/api/analyze",
            ReportKind::Quarterly | ReportKind::HcAnalysis => "/api/quarterly",
        }
    }

    /// File extensions the upstream parser accepts for this kind
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ReportKind::TransactionDetail => &["csv", "xlsx", "xls"],
            ReportKind::Quarterly | ReportKind::HcAnalysis => &["xlsx", "xls"],
        }
    }

    /// Check a file name against `extensions()`, case-insensitively
    pub fn accepts(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.extensions().iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    /// Like `accepts`, but with an error naming the allowed formats
    pub fn check_file(&self, filename: &str) -> Result<()> {
        if self.accepts(filename) {
            return Ok(());
        }

        let allowed: Vec<String> = self
            .extensions()
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect();

        Err(Error::UnsupportedFile(format!(
            "{} files must be one of: {}",
            self.name(),
            allowed.join(", ")
        )))
    }

    /// File name prefix for CSV downloads
    pub fn export_prefix(&self) -> &str {
        match self {
            ReportKind::TransactionDetail => "pl-report",
            ReportKind::Quarterly => "quarterly-report",
            ReportKind::HcAnalysis => "hc-analysis",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// A decoded report, carrying the payload shape for its kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Report {
    TransactionDetail(PlReport),
    Quarterly(QuarterlyReport),
    HcAnalysis(HcAnalysis),
}

impl Report {
    /// Decode an upstream response body for `kind`.
    ///
    /// For `HcAnalysis` the body is a quarterly report; the headcount split
    /// is computed from it here.
    pub fn decode(kind: ReportKind, body: &str) -> Result<Report> {
        let report = match kind {
            ReportKind::TransactionDetail => Report::TransactionDetail(serde_json::from_str(body)?),
            ReportKind::Quarterly => Report::Quarterly(serde_json::from_str(body)?),
            ReportKind::HcAnalysis => {
                let quarterly: QuarterlyReport = serde_json::from_str(body)?;
                Report::HcAnalysis(HcAnalysis::from_report(&quarterly))
            }
        };
        Ok(report)
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            Report::TransactionDetail(_) => ReportKind::TransactionDetail,
            Report::Quarterly(_) => ReportKind::Quarterly,
            Report::HcAnalysis(_) => ReportKind::HcAnalysis,
        }
    }

    /// Company name, when the payload carries one
    pub fn company_name(&self) -> Option<&str> {
        let name = match self {
            Report::TransactionDetail(_) => return None,
            Report::Quarterly(q) => &q.company_name,
            Report::HcAnalysis(hc) => &hc.company_name,
        };
        (!name.is_empty()).then_some(name.as_str())
    }
}
