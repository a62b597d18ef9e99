use crate::app::error::IncludesError;
use crate::app::exclusion::{add_excludes, ExclusionSpec, ResolvedLevel};
use crate::app::formatter::IncludePathFormatter;
use crate::app::models::{RuntimeConfig, WalkMode};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pathdiff::diff_paths;
use std::fs;
use std::path::{Path, PathBuf};

/// Key of the workspace root in an exclusion spec.
pub const ROOT_KEY: &str = ".";

/// Depth-first walker that collects header directories below a workspace root.
pub struct HeaderWalker {
    root: PathBuf,
    header_set: GlobSet,
    formatter: IncludePathFormatter,
    mode: WalkMode,
    platform_key: String,
}

impl HeaderWalker {
    pub fn new(root: PathBuf, config: &RuntimeConfig) -> Result<Self> {
        let platform_key = relative_key(&root, &root.join(&config.platform_dir));
        Ok(Self {
            header_set: build_globset(&config.header_patterns)?,
            formatter: IncludePathFormatter::new(config.path_style, config.mode),
            mode: config.mode,
            platform_key,
            root,
        })
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.root.join(&self.platform_key)
    }

    /// The bare workspace root followed by the walk output.
    pub fn collect(&self, spec: &ExclusionSpec) -> Result<Vec<String>> {
        let mut paths = vec![self.formatter.workspace_root()];
        paths.extend(self.walk(spec)?);
        Ok(paths)
    }

    /// Walks the whole workspace and returns include strings in traversal order.
    pub fn walk(&self, spec: &ExclusionSpec) -> Result<Vec<String>> {
        self.walk_dir(&self.root, ROOT_KEY, spec)
    }

    /// Per-directory step. `key` is the lookup key for this directory's children.
    fn walk_dir(&self, dir: &Path, key: &str, spec: &ExclusionSpec) -> Result<Vec<String>> {
        let level = ResolvedLevel::resolve(key, spec, &self.root)?;
        let mut found = Vec::new();

        for child in self.subdirectories(dir)? {
            if level
                .is_excluded(&child)
                .with_context(|| format!("Failed to resolve {}", child.display()))?
            {
                log::debug!("Excluded {}", child.display());
                continue;
            }

            let child_key = relative_key(&self.root, &child);
            let headers = self.header_files(&child)?;

            if !headers.is_empty() {
                if self.mode.include_files {
                    found.extend(
                        headers
                            .iter()
                            .map(|file| self.formatter.file(&relative_key(&self.root, file))),
                    );
                } else {
                    let bare = child_key == self.platform_key;
                    found.push(self.formatter.directory(&child_key, bare));
                }

                if !self.mode.recurses_into_header_dirs() {
                    continue;
                }
            }

            found.extend(self.walk_dir(&child, &child_key, level.child_spec())?);
        }

        Ok(found)
    }

    /// Keys of the immediate subdirectories of `dir` that directly hold headers.
    pub fn header_children(&self, dir: &Path) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for child in self.subdirectories(dir)? {
            if self.is_header_dir(&child)? {
                keys.push(relative_key(&self.root, &child));
            }
        }
        Ok(keys)
    }

    /// Excludes every header-bearing platform directory except `platform`.
    pub fn apply_platform_excludes(&self, spec: &mut ExclusionSpec, platform: &str) -> Result<()> {
        let mut others = self.header_children(&self.platform_dir())?;
        let selected = relative_key(&self.root, &self.platform_dir().join(platform));

        let position = others.iter().position(|key| *key == selected).ok_or_else(|| {
            IncludesError::PlatformNotFound {
                platform: platform.to_string(),
                platform_dir: self.platform_key.clone(),
            }
        })?;
        others.remove(position);

        log::debug!("Auto-excluding platforms: {:?}", others);
        add_excludes(spec, &self.platform_key, others.into_iter().map(PathBuf::from));
        Ok(())
    }

    fn is_header_dir(&self, dir: &Path) -> Result<bool> {
        Ok(!self.header_files(dir)?.is_empty())
    }

    /// Direct children only, in directory enumeration order.
    fn header_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in read_dir(dir)? {
            let path = entry?;
            let is_header = path
                .file_name()
                .is_some_and(|name| self.header_set.is_match(name));
            if is_header && path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn subdirectories(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in read_dir(dir)? {
            let path = entry?;
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }
}

fn read_dir(dir: &Path) -> Result<impl Iterator<Item = Result<PathBuf>> + '_> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    Ok(entries.map(move |entry| {
        entry
            .map(|e| e.path())
            .with_context(|| format!("Failed to read entry in {}", dir.display()))
    }))
}

/// Workspace-relative, `/` separated. The root itself is `"."`.
fn relative_key(root: &Path, path: &Path) -> String {
    let Some(relative) = diff_paths(path, root) else {
        return path.to_string_lossy().into_owned();
    };
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|part| part != ".")
        .collect();
    if parts.is_empty() {
        ROOT_KEY.to_string()
    } else {
        parts.join("/")
    }
}

/// Helper to build efficient glob sets
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::PathStyle;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "// header\n").unwrap();
    }

    fn config(mode: WalkMode) -> RuntimeConfig {
        let mut config = RuntimeConfig::with_platform("windows");
        config.path_style = PathStyle::Posix;
        config.mode = mode;
        config
    }

    fn walk(root: &Path, mode: WalkMode, spec: &ExclusionSpec) -> BTreeSet<String> {
        let walker = HeaderWalker::new(root.to_path_buf(), &config(mode)).unwrap();
        walker.walk(spec).unwrap().into_iter().collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn spec(src: &str) -> ExclusionSpec {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn excluded_sibling_is_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "root/A/a.h");
        touch(dir.path(), "root/B/b.h");

        let found = walk(dir.path(), WalkMode::default(), &spec(r#"root = ["root/A"]"#));
        assert_eq!(found, set(&["${workspaceFolder}/root/B/**"]));
    }

    #[test]
    fn root_key_excludes_top_level_entries() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "thirdparty/zlib/zlib.h");
        touch(dir.path(), "core/object.h");

        let found = walk(dir.path(), WalkMode::default(), &spec(r#""." = ["thirdparty"]"#));
        assert_eq!(found, set(&["${workspaceFolder}/core/**"]));
    }

    #[test]
    fn non_header_directory_passes_through() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "mid/deep/x.hpp");
        touch(dir.path(), "mid/readme.txt");

        let found = walk(dir.path(), WalkMode::default(), &ExclusionSpec::new());
        assert_eq!(found, set(&["${workspaceFolder}/mid/deep/**"]));
    }

    #[test]
    fn stops_at_first_header_directory_by_default() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/x.h");
        touch(dir.path(), "a/b/y.h");

        let found = walk(dir.path(), WalkMode::default(), &ExclusionSpec::new());
        assert_eq!(found, set(&["${workspaceFolder}/a/**"]));
    }

    #[test]
    fn include_all_folders_descends_below_header_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/x.h");
        touch(dir.path(), "a/b/y.h");
        let mode = WalkMode {
            include_all_folders: true,
            ..WalkMode::default()
        };

        let found = walk(dir.path(), mode, &ExclusionSpec::new());
        assert_eq!(found, set(&["${workspaceFolder}/a", "${workspaceFolder}/a/b"]));
    }

    #[test]
    fn include_files_alone_descends_below_header_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/x.h");
        touch(dir.path(), "a/b/y.h");
        let mode = WalkMode {
            include_files: true,
            ..WalkMode::default()
        };

        let found = walk(dir.path(), mode, &ExclusionSpec::new());
        assert_eq!(
            found,
            set(&["${workspaceFolder}/a/x.h", "${workspaceFolder}/a/b/y.h"])
        );
    }

    #[test]
    fn include_files_emits_each_header_once() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/x.h");
        touch(dir.path(), "a/x.cpp");
        touch(dir.path(), "a/b/y.hpp");
        let mode = WalkMode {
            include_files: true,
            include_all_folders: true,
        };

        let walker = HeaderWalker::new(dir.path().to_path_buf(), &config(mode)).unwrap();
        let mut found = walker.walk(&ExclusionSpec::new()).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec!["${workspaceFolder}/a/b/y.hpp", "${workspaceFolder}/a/x.h"]
        );
    }

    #[test]
    fn nested_spec_scopes_rules_to_subtree() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "modules/text/icu/icu.h");
        touch(dir.path(), "modules/text/harfbuzz/hb.h");

        let nested = spec(
            r#"
            [modules]
            "modules/text" = ["modules/text/icu"]
            "#,
        );
        let found = walk(dir.path(), WalkMode::default(), &nested);
        assert_eq!(found, set(&["${workspaceFolder}/modules/text/harfbuzz/**"]));

        // The nested map replaces the outer spec below "modules".
        let shadowed = spec(
            r#"
            "modules/text" = ["modules/text/icu"]

            [modules.exclude_map]
            "#,
        );
        let found = walk(dir.path(), WalkMode::default(), &shadowed);
        assert!(found.contains("${workspaceFolder}/modules/text/icu/**"));
    }

    #[test]
    fn missing_exclude_path_fails_the_walk() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "core/object.h");
        let walker =
            HeaderWalker::new(dir.path().to_path_buf(), &config(WalkMode::default())).unwrap();

        let err = walker.walk(&spec(r#""." = ["gone"]"#)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IncludesError>(),
            Some(IncludesError::ExcludePathMissing { .. })
        ));
    }

    #[test]
    fn platform_auto_exclusion_keeps_selected_platform() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "platform/windows/os_windows.h");
        touch(dir.path(), "platform/linux/os_linux.h");
        touch(dir.path(), "core/object.h");

        let walker =
            HeaderWalker::new(dir.path().to_path_buf(), &config(WalkMode::default())).unwrap();
        let mut spec = ExclusionSpec::new();
        walker.apply_platform_excludes(&mut spec, "windows").unwrap();

        let found: BTreeSet<String> = walker.walk(&spec).unwrap().into_iter().collect();
        assert_eq!(
            found,
            set(&[
                "${workspaceFolder}/core/**",
                "${workspaceFolder}/platform/windows/**"
            ])
        );
    }

    #[test]
    fn platform_directory_is_emitted_bare() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "platform/platform_config.h");
        touch(dir.path(), "platform/windows/os_windows.h");
        touch(dir.path(), "platform/linux/os_linux.h");

        let mode = WalkMode {
            include_all_folders: true,
            ..WalkMode::default()
        };
        let walker = HeaderWalker::new(dir.path().to_path_buf(), &config(mode)).unwrap();
        let mut spec = ExclusionSpec::new();
        walker.apply_platform_excludes(&mut spec, "windows").unwrap();

        let found: BTreeSet<String> = walker.walk(&spec).unwrap().into_iter().collect();
        assert_eq!(
            found,
            set(&[
                "${workspaceFolder}/platform",
                "${workspaceFolder}/platform/windows"
            ])
        );
    }

    #[test]
    fn platform_directory_bare_without_include_all_folders() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "platform/platform_config.h");
        touch(dir.path(), "platform/linux/os_linux.h");

        let found = walk(dir.path(), WalkMode::default(), &ExclusionSpec::new());
        assert_eq!(found, set(&["${workspaceFolder}/platform"]));
    }

    #[test]
    fn unknown_platform_is_an_error() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "platform/linux/os_linux.h");
        let walker =
            HeaderWalker::new(dir.path().to_path_buf(), &config(WalkMode::default())).unwrap();

        let err = walker
            .apply_platform_excludes(&mut ExclusionSpec::new(), "windows")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IncludesError>(),
            Some(IncludesError::PlatformNotFound { .. })
        ));
    }

    #[test]
    fn header_children_lists_only_direct_header_dirs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "core/object.h");
        touch(dir.path(), "servers/rendering/server.h");
        touch(dir.path(), "doc/readme.md");
        let walker =
            HeaderWalker::new(dir.path().to_path_buf(), &config(WalkMode::default())).unwrap();

        let children = walker.header_children(dir.path()).unwrap();
        assert_eq!(children, vec!["core".to_string()]);
    }

    #[test]
    fn relative_key_joins_with_forward_slashes() {
        let root = Path::new("/work");
        assert_eq!(relative_key(root, Path::new("/work")), ".");
        assert_eq!(relative_key(root, Path::new("/work/a/b")), "a/b");
        assert_eq!(relative_key(Path::new("."), Path::new("./platform")), "platform");
    }
}
