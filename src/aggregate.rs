// 📊 HC Analysis - per-department headcount split plus company totals
// Quarterly report → normalize → classify each department → aggregate

use crate::classifier::{HcBreakdown, HcClassifier};
use crate::model::{Keyed, QuarterlyReport};
use crate::normalizer::normalize_departments;
use serde::{Deserialize, Serialize};
use tracing::info;

/// HC split for one normalized department
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentHc {
    #[serde(skip)]
    pub department: String,

    #[serde(flatten)]
    pub breakdown: HcBreakdown,
}

impl Keyed for DepartmentHc {
    fn key(&self) -> &str {
        &self.department
    }

    fn set_key(&mut self, key: String) {
        self.department = key;
    }
}

/// Company-wide totals across all departments.
///
/// `total_all` is `total_hc + total_non_hc`, not a separate sum of the
/// per-department totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcTotals {
    #[serde(rename = "totalHC")]
    pub total_hc: f64,
    #[serde(rename = "totalNonHC")]
    pub total_non_hc: f64,
    pub total_all: f64,
}

impl HcTotals {
    /// Headcount share of everything, in percent
    pub fn hc_percent(&self) -> f64 {
        if self.total_all == 0.0 {
            0.0
        } else {
            self.total_hc / self.total_all * 100.0
        }
    }
}

/// Sum per-department splits into company totals
pub fn aggregate<'a, I>(breakdowns: I) -> HcTotals
where
    I: IntoIterator<Item = &'a HcBreakdown>,
{
    let (total_hc, total_non_hc) = breakdowns
        .into_iter()
        .fold((0.0, 0.0), |(hc, non_hc), b| (hc + b.hc, non_hc + b.non_hc));

    HcTotals {
        total_hc,
        total_non_hc,
        total_all: total_hc + total_non_hc,
    }
}

/// Full headcount analysis of a quarterly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcAnalysis {
    #[serde(default)]
    pub company_name: String,

    #[serde(default)]
    pub period: String,

    /// Normalized department name → split, in first-seen order
    #[serde(default, with = "crate::model::keyed")]
    pub departments: Vec<DepartmentHc>,

    #[serde(default)]
    pub totals: HcTotals,
}

impl HcAnalysis {
    pub fn from_report(report: &QuarterlyReport) -> Self {
        Self::with_classifier(report, &HcClassifier::new())
    }

    pub fn with_classifier(report: &QuarterlyReport, classifier: &HcClassifier) -> Self {
        let departments: Vec<DepartmentHc> = normalize_departments(&report.departments)
            .into_iter()
            .map(|dept| DepartmentHc {
                breakdown: classifier.classify(&dept.line_items),
                department: dept.name,
            })
            .collect();

        let totals = aggregate(departments.iter().map(|d| &d.breakdown));

        info!(
            raw = report.departments.len(),
            normalized = departments.len(),
            total_hc = totals.total_hc,
            total_non_hc = totals.total_non_hc,
            "headcount analysis complete"
        );

        HcAnalysis {
            company_name: report.company_name.clone(),
            period: report.period.clone(),
            departments,
            totals,
        }
    }

    pub fn department(&self, name: &str) -> Option<&HcBreakdown> {
        self.departments
            .iter()
            .find(|d| d.department == name)
            .map(|d| &d.breakdown)
    }
}
