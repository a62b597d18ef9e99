use crate::app::error::IncludesError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Exclusion rules keyed by the workspace-relative path of the directory
/// whose children they apply to. The workspace root is keyed as `"."`.
pub type ExclusionSpec = BTreeMap<String, ExclusionRule>;

/// The value stored under one directory key.
///
/// An empty table reads as `Combined` with no `exclude_map`, which keeps the
/// enclosing spec; write `exclude_map = {}` to clear it below a directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExclusionRule {
    /// Children to skip; descendants keep using the enclosing spec.
    ExcludeOnly(Vec<PathBuf>),
    /// Both a narrower spec for descendants and children to skip.
    Combined(CombinedRule),
    /// A narrower spec for descendants, nothing skipped at this level.
    NestedOnly(ExclusionSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombinedRule {
    #[serde(default)]
    pub exclude_map: Option<ExclusionSpec>,
    #[serde(default)]
    pub excludes: Vec<PathBuf>,
}

impl ExclusionRule {
    /// Normalizes the three shapes into (excluded paths, spec for descendants).
    fn parts(&self) -> (&[PathBuf], Option<&ExclusionSpec>) {
        match self {
            ExclusionRule::ExcludeOnly(excludes) => (excludes.as_slice(), None),
            ExclusionRule::Combined(rule) => {
                (rule.excludes.as_slice(), rule.exclude_map.as_ref())
            }
            ExclusionRule::NestedOnly(spec) => (Default::default(), Some(spec)),
        }
    }

    /// Widens the rule with more excluded children, keeping any nested spec.
    pub fn add_excludes<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        match self {
            ExclusionRule::ExcludeOnly(excludes) => excludes.extend(paths),
            ExclusionRule::Combined(rule) => rule.excludes.extend(paths),
            ExclusionRule::NestedOnly(spec) => {
                let nested = std::mem::take(spec);
                *self = ExclusionRule::Combined(CombinedRule {
                    exclude_map: Some(nested),
                    excludes: paths.into_iter().collect(),
                });
            }
        }
    }
}

/// Adds `paths` to the rule stored under `key`, creating an exclude-only rule if absent.
pub fn add_excludes<I>(spec: &mut ExclusionSpec, key: &str, paths: I)
where
    I: IntoIterator<Item = PathBuf>,
{
    spec.entry(key.to_string())
        .or_insert_with(|| ExclusionRule::ExcludeOnly(Vec::new()))
        .add_excludes(paths);
}

/// Exclusion state for the children of one directory.
#[derive(Debug)]
pub struct ResolvedLevel<'a> {
    excluded: Vec<PathBuf>,
    children: &'a ExclusionSpec,
}

impl<'a> ResolvedLevel<'a> {
    /// Looks `key` up in `spec` by exact string match.
    ///
    /// Excluded paths are resolved against `base` and canonicalized here, so every
    /// listed path must exist.
    pub fn resolve(key: &str, spec: &'a ExclusionSpec, base: &Path) -> Result<Self, IncludesError> {
        let Some(rule) = spec.get(key) else {
            return Ok(Self {
                excluded: Vec::new(),
                children: spec,
            });
        };

        let (excludes, nested) = rule.parts();
        let excluded = excludes
            .iter()
            .map(|path| {
                fs::canonicalize(base.join(path)).map_err(|source| {
                    IncludesError::ExcludePathMissing {
                        key: key.to_string(),
                        path: path.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            excluded,
            children: nested.unwrap_or(spec),
        })
    }

    /// True when `entry` is the same filesystem object as one of the excluded paths.
    pub fn is_excluded(&self, entry: &Path) -> io::Result<bool> {
        if self.excluded.is_empty() {
            return Ok(false);
        }
        let canonical = fs::canonicalize(entry)?;
        Ok(self.excluded.contains(&canonical))
    }

    /// Spec that applies below a non-excluded child.
    pub fn child_spec(&self) -> &'a ExclusionSpec {
        self.children
    }
}
