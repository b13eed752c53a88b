//! rustwalk - resumable, filterable directory-tree walker
//!
//! The library walks a tree depth-first and hands every node to a callback,
//! with node and sibling filters, listening windows, per-folder sampling,
//! an optional worker pool for the callback, and save/resume of a walk that
//! was interrupted. The `rustwalk` binary is a thin shell over [`nav`].

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod nav;
pub mod signal;
pub mod text;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands};
use crate::config::WalkConfig;
use crate::error::{ExitCode, NavError};
use crate::nav::{
    ActiveState, Callback, PrimarySession, ResumeInfo, ResumeSession, Restorer, TraverseItem,
    TraverseOptions, TraverseResult,
};
use crate::signal::CancelToken;
use crate::text::NavContext;

/// Run the binary for parsed `cli` arguments.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let cancel = signal::install_handler().context("Failed to install Ctrl+C handler")?;
    let config = WalkConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let ctx = NavContext::default();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Walk(args) => {
            let mut store = config.store;
            args.apply(&mut store);
            let options = TraverseOptions {
                store,
                callback: Some(printer(&args.root, quiet)),
                cancel: cancel.clone(),
                ..TraverseOptions::default()
            };

            let mut session = PrimarySession::new(&ctx, &args.root, options)
                .with_context(|| format!("Invalid walk options for {}", args.root.display()))?;
            let result = session.run();
            let save = args.save.or(config.state_file);
            finish(&result, &cancel, quiet, save.as_deref(), |path| {
                session.save(path)
            })
        }
        Commands::Resume(args) => {
            let hooked = cancel.clone();
            let restorer: Restorer =
                Box::new(move |options: &mut TraverseOptions, active: &mut ActiveState| {
                    options.callback = Some(printer(&active.root, quiet));
                    options.cancel = hooked;
                    Ok(())
                });
            let info = ResumeInfo {
                path: args.state.clone(),
                strategy: args.strategy.into(),
                restorer: Some(restorer),
            };

            let mut session = ResumeSession::new(&ctx, info)
                .with_context(|| format!("Failed to resume from {}", args.state.display()))?;
            let result = session.run();
            let save = args.save.or(config.state_file);
            finish(&result, &cancel, quiet, save.as_deref(), |path| {
                session.save(path)
            })
        }
    }
}

/// Callback printing each node indented by its depth below `root`.
/// Unreadable nodes are reported by the walker and skipped.
fn printer(root: &Path, quiet: bool) -> Callback {
    let root = root.to_path_buf();
    Arc::new(move |item: &TraverseItem| {
        if item.error.is_some() {
            return Err(NavError::SkipDir);
        }
        if !quiet {
            let depth = item
                .path
                .strip_prefix(&root)
                .map_or(0, |rel| rel.components().count());
            let marker = if item.is_dir() { "/" } else { "" };
            println!("{}{}{}", "  ".repeat(depth), item.name(), marker);
        }
        Ok(())
    })
}

fn finish<F>(
    result: &TraverseResult,
    cancel: &CancelToken,
    quiet: bool,
    save: Option<&Path>,
    saver: F,
) -> Result<ExitCode>
where
    F: FnOnce(&Path) -> std::result::Result<(), crate::error::ConfigError>,
{
    let interrupted = cancel.is_cancelled() || matches!(result.error, Some(NavError::Cancelled));

    if let Some(path) = save {
        if interrupted || result.error.is_some() {
            saver(path).with_context(|| format!("Failed to save state to {}", path.display()))?;
            log::info!("Walk state saved to {}", path.display());
        }
    }

    if !quiet {
        println!(
            "\n{} folders, {} files",
            result.metrics.folders(),
            result.metrics.files()
        );
    }

    if interrupted {
        log::warn!("Walk interrupted");
        return Ok(ExitCode::Interrupted);
    }
    match &result.error {
        Some(err) => {
            log::error!("Walk stopped: {err}");
            Ok(ExitCode::Incomplete)
        }
        None => Ok(ExitCode::Success),
    }
}
