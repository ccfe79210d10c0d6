use clap::Parser;
use std::path::PathBuf;

use crate::settings::Theme;

/// filewizard – preview and apply an optimized folder layout
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to organize (can also be typed in the TUI)
    #[arg(value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Include files in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Comma-separated extensions to preselect (e.g. ".pdf,.md" or "pdf,md").
    /// Can be specified multiple times.
    #[arg(short = 'e', long = "ext", value_delimiter = ',', value_name = "EXTENSIONS")]
    pub exts: Vec<String>,

    /// Preselect every extension of every group
    #[arg(long)]
    pub all_exts: bool,

    /// Base URL of the organizer backend
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fetch the proposed layout, print both trees and exit without TUI.
    #[arg(long)]
    pub headless: bool,

    /// With --headless: apply the proposed layout after printing it.
    #[arg(long, requires = "headless")]
    pub apply: bool,

    /// With --headless: copy the move plan to the clipboard.
    #[arg(long, requires = "headless")]
    pub copy: bool,

    /// List local files under DIR matching the selected extensions and exit.
    #[arg(long, conflicts_with = "headless")]
    pub search: bool,

    /// With --search: only list files whose name contains TEXT
    #[arg(long, requires = "search", value_name = "TEXT")]
    pub query: Option<String>,

    /// With --search: include files ignored by .gitignore
    #[arg(long, requires = "search")]
    pub include_ignored: bool,

    /// Override the saved theme for this session
    #[arg(long, value_enum, value_name = "THEME")]
    pub theme: Option<Theme>,

    /// Write logs to this file (the TUI discards logs otherwise)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.headless && !self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extension_lists_and_flags() {
        let cli = Cli::try_parse_from([
            "filewizard",
            "/data",
            "-r",
            "-e",
            ".pdf,md",
            "--ext",
            ".png",
            "--headless",
            "--apply",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data")));
        assert!(cli.recursive);
        assert_eq!(cli.exts, vec![".pdf", "md", ".png"]);
        assert!(cli.apply);
        assert!(!cli.is_interactive());
    }

    #[test]
    fn apply_requires_headless() {
        assert!(Cli::try_parse_from(["filewizard", "--apply"]).is_err());
    }

    #[test]
    fn search_conflicts_with_headless() {
        assert!(Cli::try_parse_from(["filewizard", "--search", "--headless"]).is_err());
    }

    #[test]
    fn query_belongs_to_search() {
        let cli = Cli::try_parse_from(["filewizard", "--search", "--query", "invoice"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("invoice"));
        assert!(!cli.is_interactive());
        assert!(Cli::try_parse_from(["filewizard", "--query", "invoice"]).is_err());
    }

    #[test]
    fn counts_verbosity_and_parses_theme() {
        let cli = Cli::try_parse_from(["filewizard", "-vv", "--theme", "dark"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.theme, Some(Theme::Dark));
        assert!(cli.is_interactive());
    }
}
