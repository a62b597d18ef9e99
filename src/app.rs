// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod formatter;
pub mod models;
pub mod properties;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::Path;

use self::cli::Cli;
use self::config::resolve_config;
use self::models::RuntimeConfig;
use self::properties::{merge, PropertiesDocument};
use self::scanner::HeaderWalker;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Identify Project Root & Name
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 3. Resolve Configuration
    let config = resolve_config(&args, project_name)?;

    if args.list_header_dirs {
        let walker = HeaderWalker::new(current_dir.clone(), &config)?;
        for key in walker.header_children(&current_dir)? {
            println!("{}", key);
        }
        return Ok(());
    }

    // 4. Only act inside the editor's terminal
    if !args.force && !is_running_in_vscode_terminal() {
        log::info!("Not running in the VS Code terminal, nothing to do (pass --force to override)");
        return Ok(());
    }

    // 5. Scan and write
    generate_includes(&current_dir, &config)
}

/// VS Code sets `TERM_PROGRAM=vscode` in its integrated terminal.
pub fn is_running_in_vscode_terminal() -> bool {
    env::var("TERM_PROGRAM").is_ok_and(|value| value == "vscode")
}

/// Walks `workspace` and merges the include paths into its properties file.
///
/// Returns without touching the filesystem when the platform directory is missing.
pub fn generate_includes(workspace: &Path, config: &RuntimeConfig) -> Result<()> {
    let platform = config
        .platform
        .as_deref()
        .context("No platform given (pass PLATFORM or set `platform` in a preset)")?;

    let walker = HeaderWalker::new(workspace.to_path_buf(), config)?;
    if !walker.platform_dir().is_dir() {
        log::info!(
            "No '{}' directory in {}, nothing to do",
            config.platform_dir,
            workspace.display()
        );
        return Ok(());
    }

    let mut exclusions = config.exclusions.clone();
    walker.apply_platform_excludes(&mut exclusions, platform)?;

    let include_paths = walker.collect(&exclusions)?;
    if include_paths.len() <= 1 {
        log::warn!("⚠️ No header directories found under {}", workspace.display());
    }

    if config.dry_run {
        for path in &include_paths {
            println!("{}", path);
        }
        return Ok(());
    }

    let properties_path = workspace.join(&config.properties_path);
    let count = include_paths.len();
    let document = PropertiesDocument::load(&properties_path)?;
    let document = merge(Some(document), &config.entry_name, include_paths)?;
    document.save(&properties_path)?;

    log::info!(
        "Wrote {} include paths for '{}' to {}",
        count,
        platform,
        properties_path.display()
    );
    Ok(())
}
