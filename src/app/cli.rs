use crate::app::models::PathStyle;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Write header include paths for one platform into .vscode/c_cpp_properties.json"
)]
pub struct Cli {
    /// Platform to index (a subdirectory of the platform directory)
    pub platform: Option<String>,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Skip a child of a directory, as KEY=PATH (repeatable, e.g. '.=thirdparty')
    #[arg(long, num_args = 1, action = ArgAction::Append)]
    pub exclude: Option<Vec<String>>,

    /// Emit individual header files instead of directories
    #[arg(long)]
    pub include_files: bool,

    /// Keep descending below directories that already hold headers
    #[arg(long)]
    pub include_all_folders: bool,

    /// Properties file to update
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of the configuration entry owned by this tool
    #[arg(long)]
    pub entry_name: Option<String>,

    /// Directory holding one subdirectory per platform
    #[arg(long)]
    pub platform_dir: Option<String>,

    /// Separator convention for emitted paths
    #[arg(long, value_enum)]
    pub path_style: Option<PathStyle>,

    /// Print the include paths instead of writing the properties file
    #[arg(long)]
    pub dry_run: bool,

    /// Run even outside the VS Code integrated terminal
    #[arg(long)]
    pub force: bool,

    /// List header directories directly under the workspace and exit
    #[arg(long)]
    pub list_header_dirs: bool,
}
