use crate::api::{DEFAULT_SERVER, DEFAULT_TIMEOUT};
use crate::cli::Cli;
use crate::paths;
use crate::settings::{Settings, Theme};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const SERVER_ENV: &str = "FILEWIZARD_SERVER";
pub const TIMEOUT_ENV: &str = "FILEWIZARD_TIMEOUT";

/// Effective configuration: defaults, then the settings file, then the
/// environment, then command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: String,
    pub timeout: Duration,
    pub theme: Theme,
    pub root_path: String,
}

impl Config {
    pub fn resolve(
        cli: &Cli,
        settings: &Settings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config> {
        let server = cli
            .server
            .clone()
            .or_else(|| env(SERVER_ENV))
            .or_else(|| settings.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let timeout_secs = match (cli.timeout, env(TIMEOUT_ENV)) {
            (Some(secs), _) => Some(secs),
            (None, Some(raw)) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| {
                        format!("{} must be a number of seconds, got '{}'", TIMEOUT_ENV, raw)
                    })?,
            ),
            (None, None) => settings.timeout_secs,
        };
        let timeout = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let root_path = cli
            .root
            .as_ref()
            .map(|root| root_to_string(root.clone()))
            .unwrap_or_default();

        Ok(Config {
            server,
            timeout,
            theme: cli.theme.unwrap_or(settings.theme),
            root_path,
        })
    }
}

// Prefer the absolute path so the backend gets an unambiguous root.
// On Windows `canonicalize` yields `\\?\C:\...`, which the backend can't use.
fn root_to_string(root: PathBuf) -> String {
    let absolute = root.canonicalize().unwrap_or(root);
    paths::strip_verbatim_prefix(&absolute.to_string_lossy())
}
