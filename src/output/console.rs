//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     insta-fetch                                       ║
║     High-resolution Instagram image archiver          ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(
    accounts: &[String],
    source: &str,
    min_resolution: u32,
    limit: usize,
    download_dir: &str,
    upload_to_remote: bool,
) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Accounts:   {}", accounts.join(", "));
    println!("  Source:     {}", source);
    println!("  Min size:   {}px (either side)", min_resolution);
    println!("  Limit:      {} per account", limit);
    println!("  Directory:  {}", download_dir);
    println!(
        "  Remote:     {}",
        if upload_to_remote { "enabled" } else { "disabled" }
    );
    println!();
}
