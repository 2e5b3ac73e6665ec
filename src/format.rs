// 💲 Display formatting for amounts, percentages and file sizes

/// Compact currency for on-screen display: `$1.25M`, `$12.5K`, `$950.00`.
pub fn currency(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.1}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

/// Currency for CSV export: full precision to the cent, sign after the `$`.
pub fn currency_export(value: f64) -> String {
    format!("${:.2}", value)
}

/// Percentage with one decimal
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
