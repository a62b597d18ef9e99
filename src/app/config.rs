use crate::app::cli::Cli;
use crate::app::error::IncludesError;
use crate::app::exclusion::{add_excludes, ExclusionSpec};
use crate::app::models::{PathStyle, RuntimeConfig, WalkMode};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PresetConfig {
    platform: Option<String>,
    include_files: Option<bool>,
    include_all_folders: Option<bool>,
    config_path: Option<PathBuf>,
    entry_name: Option<String>,
    platform_dir: Option<String>,
    path_style: Option<PathStyle>,
    header_patterns: Option<Vec<String>>,
    exclude: Option<ExclusionSpec>,
}

fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("vscode_includes")
        .join("presets.toml"))
}

/// A missing presets file means no presets.
fn load_presets_file(config_path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    let parsed: PresetsFile = toml::from_str(&content).context("Failed to parse presets.toml")?;

    Ok(parsed.presets)
}

/// Splits `KEY=PATH` on the first `=`.
fn parse_exclude_arg(arg: &str) -> Result<(String, PathBuf), IncludesError> {
    match arg.split_once('=') {
        Some((key, path)) if !key.is_empty() && !path.is_empty() => {
            Ok((key.to_string(), PathBuf::from(path)))
        }
        _ => Err(IncludesError::InvalidExcludeArg(arg.to_string())),
    }
}

pub fn resolve_config(cli: &Cli, project_name: Option<&str>) -> Result<RuntimeConfig> {
    let presets = load_presets_file(&presets_path()?)?;
    merge_config(cli, project_name, &presets)
}

fn merge_config(
    cli: &Cli,
    project_name: Option<&str>,
    presets: &HashMap<String, PresetConfig>,
) -> Result<RuntimeConfig> {
    // Determine preset to use: CLI flag > Auto-detect > None
    let preset = match cli.preset.as_deref() {
        Some(key) => presets
            .get(key)
            .cloned()
            .with_context(|| format!("Preset '{}' not found", key))?,
        None => project_name
            .and_then(|k| presets.get(k))
            .cloned()
            .unwrap_or_default(),
    };

    let mut config = RuntimeConfig {
        platform: cli.platform.clone().or(preset.platform),
        ..RuntimeConfig::default()
    };
    config.mode = WalkMode {
        include_files: cli.include_files || preset.include_files.unwrap_or(false),
        include_all_folders: cli.include_all_folders
            || preset.include_all_folders.unwrap_or(false),
    };
    if let Some(path) = cli.config.clone().or(preset.config_path) {
        config.properties_path = path;
    }
    if let Some(name) = cli.entry_name.clone().or(preset.entry_name) {
        config.entry_name = name;
    }
    if let Some(dir) = cli.platform_dir.clone().or(preset.platform_dir) {
        config.platform_dir = dir;
    }
    if let Some(style) = cli.path_style.or(preset.path_style) {
        config.path_style = style;
    }
    if let Some(patterns) = preset.header_patterns {
        config.header_patterns = patterns;
    }
    config.exclusions = preset.exclude.unwrap_or_default();
    for arg in cli.exclude.iter().flatten() {
        let (key, path) = parse_exclude_arg(arg)?;
        add_excludes(&mut config.exclusions, &key, [path]);
    }
    config.dry_run = cli.dry_run;

    Ok(config)
}
