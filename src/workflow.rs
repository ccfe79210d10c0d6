use crate::api::{ApiClient, OrganizerApi};
use crate::cli::Cli;
use crate::config::Config;
use crate::extensions::ExtensionCatalog;
use crate::session::{Comparison, Session, Side};
use crate::settings::{self, Settings};
use crate::tree_builder::FolderTree;
use crate::{clipboard, file_scanner, logging, tui};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

// Preselect extensions from the command line.
fn build_catalog(cli_args: &Cli) -> ExtensionCatalog {
    let mut catalog = ExtensionCatalog::default();
    if cli_args.all_exts {
        catalog.select_all();
    }
    catalog.select(&cli_args.exts);
    catalog
}

/// Both trees of a fetched layout as plain text.
pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    for side in [Side::Current, Side::Proposed] {
        let tree = FolderTree::from_paths(comparison.root_path(), comparison.paths(side));
        out.push_str(&format!("{}:\n", side.title()));
        out.push_str(&tree.render_text());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} files, {} would move.\n",
        comparison.files().items.len(),
        comparison.moved_count()
    ));
    out
}

// Fetch, print, then optionally copy the plan and apply it.
fn run_headless_mode(cli_args: &Cli, mut session: Session, api: &dyn OrganizerApi) -> Result<()> {
    if session.root_path().is_empty() {
        bail!("--headless needs a root directory");
    }
    session.fetch(api)?;
    let Some(comparison) = session.comparison() else {
        bail!("{}", session.error_message);
    };
    print!("{}", render_comparison(comparison));

    if cli_args.copy {
        clipboard::copy_text_to_clipboard(comparison.move_plan())?;
        eprintln!("📋 Move plan copied to clipboard.");
    }

    if cli_args.apply {
        session.commit(api)?;
        if !session.error_message.is_empty() {
            bail!("{}", session.error_message);
        }
        println!("✅ {}", session.success_message);
    }
    Ok(())
}

// Local listing of matching files; never contacts the backend.
fn run_search_mode(cli_args: &Cli, session: &Session) -> Result<()> {
    let root = file_scanner::search_root(session.root_path());
    let found = file_scanner::search_files(
        &root,
        session.recursive,
        session.catalog.selected_extensions(),
        cli_args.query.as_deref().unwrap_or_default(),
        cli_args.include_ignored,
    )?;
    info!(root = %root.display(), matches = found.len(), "local search finished");
    if found.is_empty() {
        eprintln!("No matching files found under {}.", root.display());
        return Ok(());
    }
    for path in &found {
        println!("{}", path.display());
    }
    Ok(())
}

fn report_interactive_outcome(session: &Session) {
    if !session.success_message.is_empty() {
        println!("✅ {}", session.success_message);
    }
    if !session.error_message.is_empty() {
        eprintln!("❌ {}", session.error_message);
    }
}

pub fn run_filewizard(cli_args: Cli) -> Result<()> {
    logging::init(
        cli_args.verbose,
        cli_args.log_file.as_deref(),
        cli_args.is_interactive(),
    )?;

    let settings_path = settings::default_settings_path();
    let settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    let config = Config::resolve(&cli_args, &settings, |key| std::env::var(key).ok())?;
    debug!(?config, "configuration resolved");

    let session = Session::new(&config.root_path, cli_args.recursive, build_catalog(&cli_args));

    if cli_args.search {
        return run_search_mode(&cli_args, &session);
    }

    let api = ApiClient::new(&config.server, config.timeout)
        .with_context(|| format!("Cannot use backend at '{}'", config.server))?;
    info!(server = %api.base_url(), "using backend");

    if cli_args.headless {
        return run_headless_mode(&cli_args, session, &api);
    }

    let final_session = tui::run_tui(session, Arc::new(api), settings, settings_path, config.theme)?;
    report_interactive_outcome(&final_session);
    Ok(())
}
