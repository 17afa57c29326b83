mod aggregate;
mod args;
mod classify;
mod collect;
mod datetime;
mod error;
mod report;
mod utils;

use anyhow::Context;
use args::Config;
use report::Report;
use std::fs;
use std::io::{self, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse_args();
    init_logging(&config);
    do_main(&config)
}

fn init_logging(config: &Config) {
    let default_level = if config.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn do_main(config: &Config) -> anyhow::Result<()> {
    info!("Reading emails from the last {} days...", config.days_window);
    let records = collect::list_emails(config)
        .with_context(|| format!("reading maildir {}", config.maildir.display()))?;

    info!("Aggregating {} emails...", records.len());
    let patterns = aggregate::aggregate(records);
    for pattern in &patterns {
        debug!(
            from = %pattern.from_email_example,
            subject = %pattern.subject_example,
            list_id = %pattern.list_id,
            messages = ?pattern.message_ids,
            "{} emails from {:?}",
            pattern.count,
            pattern.from_domain
        );
    }

    info!("Classifying {} patterns...", patterns.len());
    let suggestions = classify::suggest(&patterns, config.min_count);

    let report = Report::new(suggestions).to_string();
    match &config.output {
        Some(path) => {
            fs::write(path, report)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!("Suggestions written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
