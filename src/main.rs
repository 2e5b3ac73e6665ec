use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pnl_report::format::{currency, percent};
use pnl_report::{
    export_filename, export_report, render_report, HcAnalysis, QuarterlyReport, Report, ReportKind,
};

#[derive(Parser)]
#[command(name = "pnl-report", version, about = "P&L and headcount reports from analysis JSON")]
struct Cli {
    /// Log classifier decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headcount vs non-headcount split of a quarterly report
    Hc {
        /// Quarterly report JSON, as returned by /api/quarterly
        file: PathBuf,
    },

    /// Write a report as CSV
    Export {
        #[arg(short, long, value_enum)]
        kind: ReportKind,

        file: PathBuf,

        /// Output path (default: <prefix>-YYYY-MM-DD.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a report as an HTML fragment
    Render {
        #[arg(short, long, value_enum)]
        kind: ReportKind,

        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Hc { file } => run_hc(&file),
        Commands::Export { kind, file, output } => run_export(kind, &file, output),
        Commands::Render { kind, file } => {
            let report = load_report(kind, &file)?;
            println!("{}", render_report(&report));
            Ok(())
        }
    }
}

fn load_report(kind: ReportKind, path: &Path) -> Result<Report> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {:?}", path))?;
    Report::decode(kind, &body).with_context(|| format!("Failed to decode {} report", kind))
}

fn run_hc(path: &Path) -> Result<()> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {:?}", path))?;
    let quarterly: QuarterlyReport =
        serde_json::from_str(&body).context("Failed to parse quarterly report JSON")?;
    let analysis = HcAnalysis::from_report(&quarterly);

    println!("👥 Headcount Analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if !analysis.company_name.is_empty() {
        println!("   {}", analysis.company_name);
    }
    if !analysis.period.is_empty() {
        println!("   {}", analysis.period);
    }

    println!(
        "\n{:<28} {:>12} {:>14} {:>12} {:>8}",
        "Department", "Headcount", "Non-Headcount", "Total", "HC %"
    );
    for dept in &analysis.departments {
        let b = &dept.breakdown;
        println!(
            "{:<28} {:>12} {:>14} {:>12} {:>8}",
            dept.department,
            currency(b.hc),
            currency(b.non_hc),
            currency(b.total),
            percent(b.hc_percent())
        );
        if b.non_hc < 0.0 {
            println!("   ⚠️  non-headcount is negative; check the total line for {}", dept.department);
        }
    }

    let totals = &analysis.totals;
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{:<28} {:>12} {:>14} {:>12} {:>8}",
        "TOTAL",
        currency(totals.total_hc),
        currency(totals.total_non_hc),
        currency(totals.total_all),
        percent(totals.hc_percent())
    );

    Ok(())
}

fn run_export(kind: ReportKind, path: &Path, output: Option<PathBuf>) -> Result<()> {
    let report = load_report(kind, path)?;
    let csv = export_report(&report).context("Failed to build CSV")?;

    let output = output.unwrap_or_else(|| {
        PathBuf::from(export_filename(kind, chrono::Local::now().date_naive()))
    });
    fs::write(&output, csv).with_context(|| format!("Failed to write {:?}", output))?;

    println!("✓ Exported {} to {}", kind.name(), output.display());
    Ok(())
}
