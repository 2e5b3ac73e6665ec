// 👥 Headcount Classifier - split a department's opex into HC and non-HC
//
// total  = explicit "total operating expenses" line if the statement has one,
//          otherwise the sum of 6xxxx expense accounts
// hc     = sum of 61xxx accounts, always taken from the raw line items
// non_hc = total - hc (never computed on its own, never clamped)

use crate::account::{AccountLabel, HEADCOUNT_ACCOUNTS, OPERATING_EXPENSE_ACCOUNTS};
use crate::model::LineItems;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Labels containing any of these are never expenses
const NON_EXPENSE_MARKERS: [&str; 5] = [
    "revenue",
    "net income",
    "net loss",
    "net ordinary",
    "other income",
];

// ============================================================================
// RESULT
// ============================================================================

/// Where a department's `total` came from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TotalSource {
    /// An explicit total line in the statement, by label
    ExplicitLine(String),

    /// Summed from individual expense accounts
    #[default]
    Computed,
}

/// Headcount split for one department
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcBreakdown {
    pub hc: f64,
    pub non_hc: f64,
    pub total: f64,

    #[serde(skip)]
    pub total_source: TotalSource,
}

impl HcBreakdown {
    /// Build from a total and a headcount figure; non-HC is derived.
    pub fn new(total: f64, hc: f64, total_source: TotalSource) -> Self {
        HcBreakdown {
            hc,
            non_hc: total - hc,
            total,
            total_source,
        }
    }

    /// Headcount share of the total in percent, 0 when the total is 0
    pub fn hc_percent(&self) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            self.hc / self.total * 100.0
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct HcClassifier {
    /// Accounts summed into the fallback total (default: 60000..70000)
    pub operating_accounts: Range<u64>,

    /// Accounts counted as headcount (default: 61000..62000)
    pub headcount_accounts: Range<u64>,
}

impl HcClassifier {
    pub fn new() -> Self {
        HcClassifier {
            operating_accounts: OPERATING_EXPENSE_ACCOUNTS,
            headcount_accounts: HEADCOUNT_ACCOUNTS,
        }
    }

    /// Classify one department's line items.
    ///
    /// Never fails: empty input gives an all-zero breakdown.
    pub fn classify(&self, items: &LineItems) -> HcBreakdown {
        let (total, total_source) = match explicit_total_line(items) {
            Some((label, amount)) => (amount, TotalSource::ExplicitLine(label.to_string())),
            None => (self.computed_total(items), TotalSource::Computed),
        };

        let hc = self.headcount_total(items);

        debug!(total, hc, source = ?total_source, "classified department");

        HcBreakdown::new(total, hc, total_source)
    }

    /// Fallback total: expense accounts, skipping revenue/net lines and
    /// subtotal rows.
    fn computed_total(&self, items: &LineItems) -> f64 {
        items
            .iter()
            .filter(|item| {
                let folded = item.label.trim().to_lowercase();
                !is_non_expense(&folded) && !folded.starts_with("total ")
            })
            .filter(|item| {
                let number = AccountLabel::parse(&item.label).number_or_zero();
                self.operating_accounts.contains(&number)
            })
            .map(|item| item.amount)
            .sum()
    }

    fn headcount_total(&self, items: &LineItems) -> f64 {
        items
            .iter()
            .filter(|item| {
                let number = AccountLabel::parse(&item.label).number_or_zero();
                self.headcount_accounts.contains(&number)
            })
            .map(|item| item.amount)
            .sum()
    }
}

impl Default for HcClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the standard account ranges
pub fn classify(items: &LineItems) -> HcBreakdown {
    HcClassifier::new().classify(items)
}

// ============================================================================
// EXPLICIT TOTAL LINES
// ============================================================================

/// Does this label look like a "total operating expenses" line?
pub fn is_total_expense_label(label: &str) -> bool {
    let folded = label.trim().to_lowercase();
    (folded.starts_with("total - 6") && folded.contains("operating"))
        || (folded.contains("total") && folded.contains("60000"))
}

/// The qualifying total line with the largest absolute amount.
/// On an exact tie the earlier line wins.
fn explicit_total_line(items: &LineItems) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;

    for item in items.iter().filter(|item| is_total_expense_label(&item.label)) {
        let beats_best = best.map_or(true, |(_, amount)| item.amount.abs() > amount.abs());
        if beats_best {
            best = Some((item.label.as_str(), item.amount));
        }
    }

    best
}

fn is_non_expense(folded_label: &str) -> bool {
    NON_EXPENSE_MARKERS
        .iter()
        .any(|marker| folded_label.contains(marker))
}

// ============================================================================
// TESTS
// ============================================================================
