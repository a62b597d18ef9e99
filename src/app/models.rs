use crate::app::exclusion::ExclusionSpec;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_PROPERTIES_PATH: &str = ".vscode/c_cpp_properties.json";
pub const DEFAULT_ENTRY_NAME: &str = "godot_c_cpp_settings";
pub const DEFAULT_PLATFORM_DIR: &str = "platform";
pub const DEFAULT_HEADER_PATTERNS: [&str; 2] = ["*.h", "*.hpp"];

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub platform: Option<String>,
    pub exclusions: ExclusionSpec,
    pub mode: WalkMode,
    pub properties_path: PathBuf,
    pub entry_name: String,
    pub platform_dir: String,
    pub path_style: PathStyle,
    pub header_patterns: Vec<String>,
    pub dry_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            platform: None,
            exclusions: ExclusionSpec::new(),
            mode: WalkMode::default(),
            properties_path: PathBuf::from(DEFAULT_PROPERTIES_PATH),
            entry_name: DEFAULT_ENTRY_NAME.to_string(),
            platform_dir: DEFAULT_PLATFORM_DIR.to_string(),
            path_style: PathStyle::default(),
            header_patterns: DEFAULT_HEADER_PATTERNS.iter().map(|p| p.to_string()).collect(),
            dry_run: false,
        }
    }
}

#[cfg(test)]
impl RuntimeConfig {
    pub fn with_platform(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            ..Self::default()
        }
    }
}

/// Flags that change what the walker emits and how deep it goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkMode {
    /// Emit individual header files instead of directories.
    pub include_files: bool,
    /// Keep descending below header directories.
    pub include_all_folders: bool,
}

impl WalkMode {
    pub fn recurses_into_header_dirs(&self) -> bool {
        self.include_files || self.include_all_folders
    }
}

/// Separator convention used in emitted include paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Backslash separated.
    #[default]
    Windows,
    /// Forward-slash separated.
    Posix,
}

impl PathStyle {
    pub fn separator(&self) -> &'static str {
        match self {
            PathStyle::Windows => "\\",
            PathStyle::Posix => "/",
        }
    }
}
