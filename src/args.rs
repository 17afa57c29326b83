use crate::classify::DEFAULT_MIN_COUNT;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "maildir-triage")]
#[clap(author, version, about)]
pub struct Args {
    /// Path to the maildir.
    pub maildir: PathBuf,
    /// Number of days to analyze.
    #[clap(short, long, default_value_t = 30)]
    pub days: u32,
    /// Maximum number of messages to analyze.
    #[clap(short, long, default_value_t = 1000)]
    pub max: usize,
    /// Minimum number of messages a pattern needs to get a suggestion.
    #[clap(short = 'c', long, default_value_t = DEFAULT_MIN_COUNT)]
    pub min_count: usize,
    /// Output file for the suggestions (default to stdout).
    #[clap(short, long)]
    pub output: Option<PathBuf>,
    /// Suppress any progress output if set.
    #[clap(short, long)]
    pub quiet: bool,
}

/// Run parameters handed to each stage of the analysis.
#[derive(Debug, Clone)]
pub struct Config {
    pub maildir: PathBuf,
    pub days_window: u32,
    pub max_messages: usize,
    pub min_count: usize,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            maildir: PathBuf::new(),
            days_window: 30,
            max_messages: 1000,
            min_count: DEFAULT_MIN_COUNT,
            output: None,
            quiet: false,
        }
    }
}

impl Config {
    pub fn parse_args() -> Self {
        Args::parse().into()
    }

    /// The provider search query equivalent to the day window.
    pub fn search_query(&self) -> String {
        format!("newer_than:{}d", self.days_window)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            maildir: args.maildir,
            days_window: args.days,
            max_messages: args.max,
            min_count: args.min_count,
            output: args.output,
            quiet: args.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = Args::parse_from(["maildir-triage", "/tmp/mail"]).into();
        assert_eq!(config.maildir, PathBuf::from("/tmp/mail"));
        assert_eq!(config.days_window, 30);
        assert_eq!(config.max_messages, 1000);
        assert_eq!(config.min_count, 5);
        assert_eq!(config.output, None);
        assert!(!config.quiet);
        assert_eq!(config.search_query(), "newer_than:30d");
    }

    #[test]
    fn test_flags() {
        let config: Config = Args::parse_from([
            "maildir-triage",
            "-d",
            "7",
            "--max",
            "50",
            "-c",
            "3",
            "-o",
            "out.txt",
            "--quiet",
            "mail",
        ])
        .into();
        assert_eq!(config.days_window, 7);
        assert_eq!(config.max_messages, 50);
        assert_eq!(config.min_count, 3);
        assert_eq!(config.output, Some(PathBuf::from("out.txt")));
        assert!(config.quiet);
        assert_eq!(config.search_query(), "newer_than:7d");
    }
}
