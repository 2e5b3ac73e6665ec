// 📤 CSV Export - turn whatever report is on screen into a spreadsheet
//
// One generic writer (`to_csv`) and one row builder per report kind.
// Cells with a comma, double quote or newline are quoted, inner quotes are
// doubled, rows are joined with "\n".

use crate::aggregate::HcAnalysis;
use crate::error::Result;
use crate::format::{currency_export, percent};
use crate::model::{PlCategory, PlReport, QuarterlyReport};
use crate::report::{Report, ReportKind};
use chrono::NaiveDate;

pub type Row = Vec<String>;

const BREAKDOWN_HEADER: [&str; 5] = ["Category", "Subcategory", "Headcount", "Non-Headcount", "Total"];

// ============================================================================
// GENERIC WRITER
// ============================================================================

/// Serialize rows as CSV text. Rows may differ in length; an empty row is
/// an empty line. There is no trailing newline.
pub fn to_csv<R, C>(rows: &[R]) -> Result<String>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let mut lines: Vec<String> = Vec::with_capacity(rows.len());

    for row in rows {
        let cells = row.as_ref();

        // The csv writer quotes a lone empty field as `""`; a row of blanks
        // should stay blank.
        if cells.iter().all(|cell| cell.as_ref().is_empty()) {
            lines.push(",".repeat(cells.len().saturating_sub(1)));
            continue;
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());
        writer.write_record(cells.iter().map(|cell| cell.as_ref()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        let mut line = String::from_utf8_lossy(&bytes).into_owned();
        if line.ends_with('\n') {
            line.pop();
        }
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

// ============================================================================
// ROW BUILDERS
// ============================================================================

fn row<const N: usize>(cells: [&str; N]) -> Row {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// Export rows for any report kind
pub fn report_rows(report: &Report) -> Vec<Row> {
    match report {
        Report::TransactionDetail(pl) => pl_rows(pl),
        Report::Quarterly(quarterly) => quarterly_rows(quarterly),
        Report::HcAnalysis(analysis) => hc_rows(analysis),
    }
}

/// Render the report straight to CSV text
pub fn export_report(report: &Report) -> Result<String> {
    to_csv(&report_rows(report))
}

/// Download name: `<prefix>-YYYY-MM-DD.csv`
pub fn export_filename(kind: ReportKind, date: NaiveDate) -> String {
    format!("{}-{}.csv", kind.export_prefix(), date.format("%Y-%m-%d"))
}

pub fn pl_rows(report: &PlReport) -> Vec<Row> {
    let mut rows = vec![row(["NetSuite P&L Report"]), Vec::new()];

    rows.push(row(["Summary"]));
    rows.push(row(["Metric", "Amount"]));
    rows.push(vec!["Revenue".into(), currency_export(report.revenue)]);
    rows.push(vec!["COGS".into(), currency_export(report.cogs_total())]);
    rows.push(vec!["Gross Profit".into(), currency_export(report.gross_profit)]);
    rows.push(vec!["Gross Margin".into(), format!("{:.2}%", report.gross_margin)]);
    rows.push(vec!["Total OpEx".into(), currency_export(report.total_opex)]);
    rows.push(vec!["EBITDA".into(), currency_export(report.ebitda)]);
    rows.push(Vec::new());

    if let Some(cogs) = &report.cogs {
        rows.push(row(["COGS Breakdown"]));
        rows.push(row(BREAKDOWN_HEADER));
        push_category_rows(&mut rows, "COGS", cogs);
        rows.push(Vec::new());
    }

    for (name, category) in report.opex_in_order() {
        rows.push(vec![format!("{} Breakdown", name)]);
        rows.push(row(BREAKDOWN_HEADER));
        push_category_rows(&mut rows, name, category);
        rows.push(Vec::new());
    }

    rows
}

fn push_category_rows(rows: &mut Vec<Row>, name: &str, category: &PlCategory) {
    rows.push(vec![
        name.to_string(),
        "TOTAL".to_string(),
        currency_export(category.headcount),
        currency_export(category.non_headcount),
        currency_export(category.total),
    ]);

    for subcategory in category.sorted_subcategories() {
        rows.push(vec![
            String::new(),
            subcategory.name.clone(),
            currency_export(subcategory.headcount),
            currency_export(subcategory.non_headcount),
            currency_export(subcategory.total),
        ]);
    }
}

fn push_heading(rows: &mut Vec<Row>, title: &str, company: &str, period: &str) {
    rows.push(vec![title.to_string()]);
    if !company.is_empty() {
        rows.push(vec!["Company".to_string(), company.to_string()]);
    }
    if !period.is_empty() {
        rows.push(vec!["Period".to_string(), period.to_string()]);
    }
    rows.push(Vec::new());
}

pub fn quarterly_rows(report: &QuarterlyReport) -> Vec<Row> {
    let mut rows = Vec::new();
    push_heading(
        &mut rows,
        "Quarterly Income Statement",
        &report.company_name,
        &report.period,
    );

    for department in &report.departments {
        rows.push(vec![department.name.clone()]);
        rows.push(row(["Line Item", "Amount"]));
        for item in &department.line_items {
            rows.push(vec![item.label.clone(), currency_export(item.amount)]);
        }
        rows.push(vec!["Total".to_string(), currency_export(department.total)]);
        rows.push(Vec::new());
    }

    if report.revenue_total != 0.0 {
        rows.push(vec!["Revenue Total".to_string(), currency_export(report.revenue_total)]);
    }

    rows
}

pub fn hc_rows(analysis: &HcAnalysis) -> Vec<Row> {
    let mut rows = Vec::new();
    push_heading(
        &mut rows,
        "Headcount Analysis",
        &analysis.company_name,
        &analysis.period,
    );

    rows.push(row(["Department", "Headcount", "Non-Headcount", "Total", "HC %"]));
    for department in &analysis.departments {
        let b = &department.breakdown;
        rows.push(vec![
            department.department.clone(),
            currency_export(b.hc),
            currency_export(b.non_hc),
            currency_export(b.total),
            percent(b.hc_percent()),
        ]);
    }

    let totals = &analysis.totals;
    rows.push(vec![
        "TOTAL".to_string(),
        currency_export(totals.total_hc),
        currency_export(totals.total_non_hc),
        currency_export(totals.total_all),
        percent(totals.hc_percent()),
    ]);

    rows
}

// ============================================================================
// TESTS
// ============================================================================
