// 🧭 Report Session - the state of one upload/display/export cycle
//
// Replaces page-level globals: which kind of report the user picked, which
// file is selected, and the report currently on screen. A new successful
// report replaces the old one wholesale.

use crate::error::{Error, Result};
use crate::export::{export_filename, export_report};
use crate::format::file_size;
use crate::render::render_report;
use crate::report::{Report, ReportKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// File picked for upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    /// "Size: 1.5 KB" style label for the upload zone
    pub fn size_label(&self) -> String {
        format!("Size: {}", file_size(self.size))
    }
}

/// The report on screen plus when and under which cycle it arrived
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentReport {
    pub cycle_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub source_file: Option<String>,
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct ReportSession {
    kind: ReportKind,
    selected: Option<SelectedFile>,
    current: Option<CurrentReport>,
}

impl ReportSession {
    pub fn new(kind: ReportKind) -> Self {
        ReportSession {
            kind,
            selected: None,
            current: None,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Switch report kind. A selected file that the new kind cannot take
    /// is dropped.
    pub fn set_kind(&mut self, kind: ReportKind) {
        self.kind = kind;
        if let Some(file) = &self.selected {
            if !kind.accepts(&file.name) {
                self.selected = None;
            }
        }
    }

    /// Record the file to upload, rejecting extensions the kind cannot take
    pub fn select_file(&mut self, name: &str, size: u64) -> Result<&SelectedFile> {
        self.kind.check_file(name)?;
        Ok(&*self.selected.insert(SelectedFile {
            name: name.to_string(),
            size,
        }))
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Replace the current report and start a new cycle
    pub fn install(&mut self, report: Report) -> &CurrentReport {
        let cycle_id = Uuid::new_v4();
        info!(%cycle_id, kind = %report.kind(), "report installed");

        self.kind = report.kind();
        &*self.current.insert(CurrentReport {
            cycle_id,
            received_at: Utc::now(),
            source_file: self.selected.as_ref().map(|f| f.name.clone()),
            report,
        })
    }

    pub fn current(&self) -> Option<&CurrentReport> {
        self.current.as_ref()
    }

    /// Forget the selection and the report
    pub fn reset(&mut self) {
        self.selected = None;
        self.current = None;
    }

    pub fn render(&self) -> Result<String> {
        let current = self.current.as_ref().ok_or(Error::NoReport)?;
        Ok(render_report(&current.report))
    }

    /// CSV text and download name for the current report
    pub fn export(&self, date: NaiveDate) -> Result<(String, String)> {
        let current = self.current.as_ref().ok_or(Error::NoReport)?;
        let csv = export_report(&current.report)?;
        Ok((export_filename(current.report.kind(), date), csv))
    }
}

impl Default for ReportSession {
    fn default() -> Self {
        Self::new(ReportKind::TransactionDetail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuarterlyReport;

    #[test]
    fn test_select_file_validates_extension() {
        let mut session = ReportSession::new(ReportKind::Quarterly);

        assert!(session.select_file("q1.csv", 10).is_err());
        assert!(session.selected().is_none());

        let file = session.select_file("q1.xlsx", 2048).unwrap();
        assert_eq!(file.size_label(), "Size: 2.0 KB");
    }

    #[test]
    fn test_switching_kind_drops_incompatible_file() {
        let mut session = ReportSession::new(ReportKind::TransactionDetail);
        session.select_file("export.csv", 10).unwrap();

        session.set_kind(ReportKind::HcAnalysis);
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_install_replaces_current_report() {
        let mut session = ReportSession::default();
        session.select_file("q1.xlsx", 1).unwrap();

        let first = session
            .install(Report::Quarterly(QuarterlyReport::default()))
            .cycle_id;
        let second = session
            .install(Report::Quarterly(QuarterlyReport {
                period: "Q2".into(),
                ..Default::default()
            }))
            .cycle_id;

        assert_ne!(first, second);
        let current = session.current().unwrap();
        assert_eq!(current.cycle_id, second);
        assert_eq!(current.source_file.as_deref(), Some("q1.xlsx"));
        assert_eq!(session.kind(), ReportKind::Quarterly);
    }

    #[test]
    fn test_export_without_report() {
        let session = ReportSession::default();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert!(matches!(session.export(date), Err(Error::NoReport)));
        assert!(matches!(session.render(), Err(Error::NoReport)));
    }

    #[test]
    fn test_export_and_reset() {
        let mut session = ReportSession::default();
        session.install(Report::HcAnalysis(Default::default()));

        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let (name, csv) = session.export(date).unwrap();
        assert_eq!(name, "hc-analysis-2025-06-30.csv");
        assert!(csv.starts_with("Headcount Analysis"));

        session.reset();
        assert!(session.current().is_none());
    }
}
