//! insta-fetch - CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tracing_subscriber::{fmt, EnvFilter};

use insta_fetch::{
    archive::summarize_accounts,
    cli::Args,
    config::{validate_config, Config},
    download::{FetchRequest, GlobalState},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_account_list, print_account_stats, print_banner,
        print_config_summary, print_error, print_global_stats, print_info, print_success,
        print_summary, print_warning,
    },
    pipeline::Pipeline,
    report::{load_accounts_file, RunReport},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                e if e.is_source_failure() => ExitCode::from(exit_codes::SOURCE_ERROR as u8),
                Error::Fetch(_) | Error::Store(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    if args.list {
        let summaries = summarize_accounts(&config.download_directory())?;
        print_account_list(&summaries);
        return Ok(exit_codes::SUCCESS);
    }

    if let Some(path) = &args.accounts_file {
        let handles = load_accounts_file(path, args.start_from, args.max_accounts)?;
        print_info(&format!(
            "Loaded {} accounts from {}",
            handles.len(),
            path.display()
        ));
        config.targets.handles.extend(handles);
    }

    // Validate configuration
    validate_config(&config)?;

    // Build every request up front so a bad handle fails before any work
    let requests = config
        .targets
        .handles
        .iter()
        .map(|handle| FetchRequest::from_config(&config, handle))
        .collect::<Result<Vec<_>>>()?;

    let pipeline = Pipeline::from_config(&config)?;

    let accounts: Vec<String> = requests
        .iter()
        .map(|r| r.account_handle().to_string())
        .collect();
    print_config_summary(
        &accounts,
        pipeline.source_name(),
        config.options.min_resolution,
        config.options.limit,
        &config.download_directory().display().to_string(),
        config.options.upload_to_remote,
    );

    let mut global_state = GlobalState::default();
    let mut report = RunReport::new(pipeline.source_name());

    for (index, request) in requests.iter().enumerate() {
        let handle = request.account_handle();
        if index > 0 {
            account_delay(config.options.account_delay_ms).await;
        }

        print_info(&format!(
            "[{}/{}] Fetching @{}",
            index + 1,
            requests.len(),
            handle
        ));
        let spinner = config
            .options
            .show_downloads
            .then(|| create_spinner(&format!("Listing posts for @{}...", handle)));

        let outcome = pipeline.fetch_account(request).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match outcome {
            Ok(account) => {
                print_account_stats(&account.stats);
                global_state.add_account_stats(&account.stats);
                report.add_account(&account);
            }
            Err(e) => {
                print_error(&format!("Failed to process @{}: {}", handle, e));
                global_state.mark_account_failed();
                report.add_failure(handle, &e);

                // A single-account run reports the source failure directly
                if requests.len() == 1 {
                    write_report(&args, &mut report, &global_state)?;
                    return Err(e);
                }
            }
        }
    }

    print_global_stats(&global_state);
    print_summary(global_state.downloaded_count, global_state.skipped_count());
    write_report(&args, &mut report, &global_state)?;

    if global_state.accounts_failed > 0 {
        print_warning(&format!(
            "{} account(s) failed",
            global_state.accounts_failed
        ));
        return Ok(exit_codes::SOME_ACCOUNTS_FAILED);
    }

    Ok(exit_codes::SUCCESS)
}

fn write_report(args: &Args, report: &mut RunReport, global_state: &GlobalState) -> Result<()> {
    if let Some(path) = &args.report {
        report.finish(global_state);
        report.save(path)?;
        print_success(&format!("Report written to {}", path.display()));
    }
    Ok(())
}

/// Pause between accounts, with up to 50% random jitter.
async fn account_delay(base_ms: u64) {
    if base_ms == 0 {
        return;
    }
    let jitter = rand::thread_rng().gen_range(0..=base_ms / 2);
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}
