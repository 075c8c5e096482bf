//! Statistics reporting.

use console::style;

use crate::archive::AccountSummary;
use crate::download::{DownloadState, GlobalState};

/// Format a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Print statistics for a single account.
pub fn print_account_stats(state: &DownloadState) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for @{}:", state.account_handle)).bold()
    );
    println!(
        "  Candidates: {} found, {} above threshold",
        state.candidates_found, state.candidates_kept
    );
    println!(
        "  Downloaded: {} ({})",
        state.downloaded_count,
        format_bytes(state.bytes_written)
    );
    println!("  Too small:  {}", state.low_resolution_count);
    println!("  Duplicates: {}", state.duplicate_count);
    if state.error_count > 0 {
        println!("  Errors:     {}", style(state.error_count).red());
    }
    if state.synced_count > 0 || state.sync_failed_count > 0 {
        println!(
            "  Synced:     {} ({} failed)",
            state.synced_count, state.sync_failed_count
        );
    }
}

/// Print global statistics across all accounts.
pub fn print_global_stats(state: &GlobalState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Accounts processed: {}", state.accounts_processed);
    if state.accounts_failed > 0 {
        println!(
            "  Accounts failed:    {}",
            style(state.accounts_failed).red()
        );
    }
    println!(
        "  Downloaded: {} ({})",
        state.downloaded_count,
        format_bytes(state.bytes_written)
    );
    println!("  Synced:     {}", state.synced_count);
    println!(
        "  Skipped:    {} ({} too small, {} duplicates, {} errors)",
        state.skipped_count(),
        state.low_resolution_count,
        state.duplicate_count,
        state.error_count
    );
    println!("{}", style("═".repeat(50)).dim());
}

/// Print a summary line for quick viewing.
pub fn print_summary(downloaded: u64, skipped: u64) {
    println!(
        "Downloaded: {} images ({} skipped)",
        style(downloaded).green(),
        style(skipped).yellow()
    );
}

/// Print the `--list` table of archived accounts.
pub fn print_account_list(summaries: &[AccountSummary]) {
    if summaries.is_empty() {
        println!("No archived accounts.");
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:<32} {:>8} {:>12}  {}",
            "Account", "Images", "Size", "Last updated"
        ))
        .bold()
    );
    for summary in summaries {
        let updated = summary
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:>8} {:>12}  {}",
            format!("@{}", summary.account_handle),
            summary.image_count,
            format_bytes(summary.total_bytes),
            updated
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
    }
}
