// P&L Report - Core Library
// Exposes all modules for use in CLI, web server, and tests

pub mod account;     // Account numbers in line-item labels
pub mod aggregate;   // Company-wide HC totals
pub mod classifier;  // Headcount vs non-headcount split
pub mod config;      // Server settings from the environment
pub mod error;
pub mod export;      // CSV export
pub mod format;      // Currency / percent / size display
pub mod model;       // Report payloads
pub mod normalizer;  // Department name canonicalization + merge
pub mod render;      // HTML fragments
pub mod report;      // Report kinds (tagged union)
pub mod session;     // One upload/display/export cycle

#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod upstream;

// Re-export commonly used types
pub use account::{account_number, AccountLabel, HEADCOUNT_ACCOUNTS, OPERATING_EXPENSE_ACCOUNTS};
pub use aggregate::{aggregate, DepartmentHc, HcAnalysis, HcTotals};
pub use classifier::{classify, HcBreakdown, HcClassifier, TotalSource};
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use export::{export_filename, export_report, report_rows, to_csv};
pub use model::{
    DepartmentData, LineItem, LineItems, PlCategory, PlReport, PlSubcategory, QuarterlyReport,
};
pub use normalizer::{canonical_name, normalize_departments};
pub use render::render_report;
pub use report::{Report, ReportKind};
pub use session::{CurrentReport, ReportSession, SelectedFile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
