// 🖼️ HTML Rendering - report fragments for the results panel
// Every text field coming from the report is escaped before it hits markup.

use crate::aggregate::HcAnalysis;
use crate::format::{currency, percent};
use crate::model::{PlCategory, PlReport, QuarterlyReport};
use crate::report::Report;
use std::fmt::Write as _;

/// Escape text for HTML
pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// CSS modifier for a signed figure
fn tone(value: f64) -> &'static str {
    if value >= 0.0 {
        "positive"
    } else {
        "negative"
    }
}

/// Render any report as an HTML fragment
pub fn render_report(report: &Report) -> String {
    match report {
        Report::TransactionDetail(pl) => render_pl(pl),
        Report::Quarterly(quarterly) => render_quarterly(quarterly),
        Report::HcAnalysis(analysis) => render_hc_analysis(analysis),
    }
}

// ============================================================================
// P&L
// ============================================================================

struct SummaryCard {
    label: &'static str,
    value: String,
    tone: &'static str,
}

pub fn render_pl(report: &PlReport) -> String {
    let cards = [
        SummaryCard {
            label: "Revenue",
            value: currency(report.revenue),
            tone: "positive",
        },
        SummaryCard {
            label: "Gross Profit",
            value: currency(report.gross_profit),
            tone: tone(report.gross_profit),
        },
        SummaryCard {
            label: "Gross Margin",
            value: percent(report.gross_margin),
            tone: tone(report.gross_margin),
        },
        SummaryCard {
            label: "Total OpEx",
            value: currency(report.total_opex),
            tone: "",
        },
        SummaryCard {
            label: "EBITDA",
            value: currency(report.ebitda),
            tone: tone(report.ebitda),
        },
    ];

    let mut html = String::new();
    html.push_str("<div class=\"summary-cards\">\n");
    for card in &cards {
        let _ = writeln!(
            html,
            "  <div class=\"summary-card {}\"><h3>{}</h3><div class=\"amount\">{}</div></div>",
            card.tone, card.label, card.value
        );
    }
    html.push_str("</div>\n");

    if let Some(cogs) = &report.cogs {
        html.push_str(&render_category("COGS", cogs));
    }
    for (name, category) in report.opex_in_order() {
        html.push_str(&render_category(name, category));
    }

    html
}

fn render_category(name: &str, category: &PlCategory) -> String {
    let mut html = String::new();

    let _ = writeln!(html, "<div class=\"category-section\">");
    let _ = writeln!(
        html,
        "  <div class=\"category-header\"><h2>{}</h2><div class=\"category-total\">{}</div></div>",
        esc(name),
        currency(category.total)
    );
    let _ = writeln!(
        html,
        "  <div class=\"category-stats\">{}{}{}</div>",
        stat("Total", category.total),
        stat("Headcount", category.headcount),
        stat("Non-Headcount", category.non_headcount)
    );

    let subcategories = category.sorted_subcategories();
    if !subcategories.is_empty() {
        html.push_str("  <table class=\"subcategories\">\n");
        html.push_str(
            "    <tr><th>Subcategory</th><th>Headcount</th><th>Non-Headcount</th><th>Total</th></tr>\n",
        );
        for sub in subcategories {
            let _ = writeln!(
                html,
                "    <tr><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>",
                esc(&sub.name),
                currency(sub.headcount),
                currency(sub.non_headcount),
                currency(sub.total)
            );
        }
        html.push_str("  </table>\n");
    }

    html.push_str("</div>\n");
    html
}

fn stat(label: &str, value: f64) -> String {
    format!(
        "<div class=\"stat-item\"><div class=\"stat-label\">{}</div><div class=\"stat-value\">{}</div></div>",
        label,
        currency(value)
    )
}

// ============================================================================
// QUARTERLY
// ============================================================================

fn render_heading(html: &mut String, title: &str, company: &str, period: &str) {
    let _ = writeln!(html, "<div class=\"report-heading\"><h2>{}</h2>", esc(title));
    if !company.is_empty() {
        let _ = writeln!(html, "  <div class=\"company\">{}</div>", esc(company));
    }
    if !period.is_empty() {
        let _ = writeln!(html, "  <div class=\"period\">{}</div>", esc(period));
    }
    html.push_str("</div>\n");
}

pub fn render_quarterly(report: &QuarterlyReport) -> String {
    let mut html = String::new();
    render_heading(
        &mut html,
        "Quarterly Income Statement",
        &report.company_name,
        &report.period,
    );

    if report.departments.is_empty() {
        html.push_str("<p class=\"empty\">No departments found in this report.</p>\n");
        return html;
    }

    for department in &report.departments {
        let _ = writeln!(
            html,
            "<div class=\"category-section\">\n  <div class=\"category-header\"><h2>{}</h2><div class=\"category-total\">{}</div></div>",
            esc(&department.name),
            currency(department.total)
        );
        html.push_str("  <table class=\"line-items\">\n");
        for item in &department.line_items {
            let _ = writeln!(
                html,
                "    <tr><td>{}</td><td class=\"{}\">{}</td></tr>",
                esc(&item.label),
                tone(item.amount),
                currency(item.amount)
            );
        }
        html.push_str("  </table>\n</div>\n");
    }

    html
}

// ============================================================================
// HC ANALYSIS
// ============================================================================

pub fn render_hc_analysis(analysis: &HcAnalysis) -> String {
    let mut html = String::new();
    render_heading(
        &mut html,
        "Headcount Analysis",
        &analysis.company_name,
        &analysis.period,
    );

    let totals = &analysis.totals;
    let _ = writeln!(
        html,
        "<div class=\"summary-cards\">\n  <div class=\"summary-card\"><h3>Headcount</h3><div class=\"amount\">{}</div></div>\n  <div class=\"summary-card\"><h3>Non-Headcount</h3><div class=\"amount\">{}</div></div>\n  <div class=\"summary-card\"><h3>Total</h3><div class=\"amount\">{}</div></div>\n  <div class=\"summary-card\"><h3>HC %</h3><div class=\"amount\">{}</div></div>\n</div>",
        currency(totals.total_hc),
        currency(totals.total_non_hc),
        currency(totals.total_all),
        percent(totals.hc_percent())
    );

    html.push_str("<table class=\"hc-analysis\">\n");
    html.push_str(
        "  <tr><th>Department</th><th>Headcount</th><th>Non-Headcount</th><th>Total</th><th>HC %</th></tr>\n",
    );
    for department in &analysis.departments {
        let b = &department.breakdown;
        let _ = writeln!(
            html,
            "  <tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
            esc(&department.department),
            currency(b.hc),
            tone(b.non_hc),
            currency(b.non_hc),
            currency(b.total),
            percent(b.hc_percent())
        );
    }
    let _ = writeln!(
        html,
        "  <tr class=\"totals\"><td>TOTAL</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        currency(totals.total_hc),
        currency(totals.total_non_hc),
        currency(totals.total_all),
        percent(totals.hc_percent())
    );
    html.push_str("</table>\n");

    html
}
