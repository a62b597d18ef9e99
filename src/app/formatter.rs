use crate::app::models::{PathStyle, WalkMode};

pub const WORKSPACE_TOKEN: &str = "${workspaceFolder}";

/// Turns workspace-relative keys (`/` separated) into editor include strings.
#[derive(Debug, Clone, Copy)]
pub struct IncludePathFormatter {
    style: PathStyle,
    mode: WalkMode,
}

impl IncludePathFormatter {
    pub fn new(style: PathStyle, mode: WalkMode) -> Self {
        Self { style, mode }
    }

    pub fn workspace_root(&self) -> String {
        WORKSPACE_TOKEN.to_string()
    }

    /// Header directory entry. `bare` suppresses the recursive suffix.
    pub fn directory(&self, rel: &str, bare: bool) -> String {
        let sep = self.style.separator();
        let mut out = self.join(rel);
        if !bare && !self.mode.include_all_folders {
            out.push_str(sep);
            out.push_str("**");
        }
        out
    }

    pub fn file(&self, rel: &str) -> String {
        self.join(rel)
    }

    fn join(&self, rel: &str) -> String {
        let sep = self.style.separator();
        format!("{}{}{}", WORKSPACE_TOKEN, sep, rel.replace('/', sep))
    }
}
