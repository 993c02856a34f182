use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use simplelog::LevelFilter;

pub const APP_NAME: &str = "ReadReminder";
pub const DATA_FILE: &str = "data.json";
pub const LOG_FILE: &str = "readnudge.log";
pub const MARKDOWN_FILE: &str = "2026-Reading-List.md";
pub const DEFAULT_VAULT: &str = "obsidian";

pub const DELAY_AFTER_LAUNCH_MIN: u64 = 20;
pub const SNOOZE_AFTER_CLOSE_MIN: u64 = 30;
/// Upper bound for both delay flags: one week.
pub const MAX_DELAY_MIN: u64 = 7 * 24 * 60;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Nudges you to read from a small tracked list")]
pub struct Args {
    /// Ignore the persisted snooze and use the post-launch delay
    #[arg(long)]
    pub popup_now: bool,

    /// Clear the persisted snooze timestamp before starting
    #[arg(long)]
    pub reset: bool,

    /// Directory holding data.json and the log file
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Markdown file completed items are appended to
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Vault name used when opening the markdown file
    #[arg(long, value_name = "NAME")]
    pub vault: Option<String>,

    /// Minutes after launch before the first reminder
    #[arg(
        long,
        value_name = "N",
        default_value_t = DELAY_AFTER_LAUNCH_MIN,
        value_parser = clap::value_parser!(u64).range(1..=MAX_DELAY_MIN)
    )]
    pub login_delay_min: u64,

    /// Minutes a closed reminder stays quiet
    #[arg(
        long,
        value_name = "N",
        default_value_t = SNOOZE_AFTER_CLOSE_MIN,
        value_parser = clap::value_parser!(u64).range(1..=MAX_DELAY_MIN)
    )]
    pub snooze_min: u64,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub markdown_path: PathBuf,
    pub vault_name: String,
    pub launch_delay: Duration,
    pub snooze: Duration,
    pub popup_now: bool,
    pub reset: bool,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_args(args: Args) -> Self {
        let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
        let markdown_path = args.markdown.unwrap_or_else(default_markdown_path);
        Self {
            data_dir,
            markdown_path,
            vault_name: args.vault.unwrap_or_else(|| DEFAULT_VAULT.to_string()),
            launch_delay: minutes(args.login_delay_min),
            snooze: minutes(args.snooze_min),
            popup_now: args.popup_now,
            reset: args.reset,
            log_level: if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }

    /// Defaults rooted somewhere other than the user's real directories.
    #[cfg(test)]
    pub fn rooted_at(root: &std::path::Path) -> Self {
        Self {
            data_dir: root.join(APP_NAME),
            markdown_path: root.join(DEFAULT_VAULT).join(MARKDOWN_FILE),
            vault_name: DEFAULT_VAULT.to_string(),
            launch_delay: Duration::from_secs(DELAY_AFTER_LAUNCH_MIN * 60),
            snooze: Duration::from_secs(SNOOZE_AFTER_CLOSE_MIN * 60),
            popup_now: false,
            reset: false,
            log_level: LevelFilter::Info,
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(60))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

fn default_markdown_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_VAULT)
        .join(MARKDOWN_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let args = Args::parse_from(["readnudge", "--popup-now", "--reset", "--snooze-min", "5"]);
        assert!(args.popup_now);
        assert!(args.reset);
        assert_eq!(args.snooze_min, 5);
        assert_eq!(args.login_delay_min, DELAY_AFTER_LAUNCH_MIN);
    }

    #[test]
    fn delay_flags_are_bounded() {
        for flag in ["--snooze-min", "--login-delay-min"] {
            for bad in ["0", "10081", "18446744073709551615", "-1"] {
                assert!(Args::try_parse_from(["readnudge", flag, bad]).is_err(), "{flag} {bad}");
            }
            assert!(Args::try_parse_from(["readnudge", flag, "10080"]).is_ok(), "{flag}");
        }

        let args = Args::parse_from(["readnudge", "--snooze-min", "10080"]);
        assert_eq!(Settings::from_args(args).snooze, Duration::from_secs(10_080 * 60));
        assert_eq!(minutes(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn settings_from_defaults() {
        let args = Args::parse_from(["readnudge", "--data-dir", "/tmp/rr"]);
        let settings = Settings::from_args(args);
        assert_eq!(settings.data_path(), PathBuf::from("/tmp/rr/data.json"));
        assert_eq!(settings.launch_delay, Duration::from_secs(1200));
        assert_eq!(settings.snooze, Duration::from_secs(1800));
        assert_eq!(settings.vault_name, "obsidian");
        assert!(settings.markdown_path.ends_with("obsidian/2026-Reading-List.md"));
        assert_eq!(settings.log_level, LevelFilter::Info);
    }
}
