use crate::app::error::IncludesError;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const DEFAULT_VERSION: u64 = 4;
pub const DEFAULT_C_STANDARD: &str = "c17";
pub const DEFAULT_CPP_STANDARD: &str = "c++17";

const CONFIGURATIONS: &str = "configurations";
const VERSION: &str = "version";
const NAME: &str = "name";
const INCLUDE_PATH: &str = "includePath";

/// The editor's C/C++ properties file, kept as an ordered JSON object so that
/// fields this tool does not know about survive a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertiesDocument {
    root: Map<String, Value>,
}

impl PropertiesDocument {
    /// Empty or whitespace-only input is an empty document.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value =
            serde_json::from_str(text).context("Failed to parse properties document")?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(IncludesError::InvalidDocument("top level is not an object".into()).into()),
        }
    }

    /// Reads `path`, first creating it (and its parent) as an empty file if missing.
    pub fn load(path: &Path) -> Result<Self> {
        ensure_placeholder(path)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid properties file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_pretty_string()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Adds `configurations` and `version` when absent. Existing values are kept.
    pub fn ensure_defaults(&mut self) {
        if !self.root.contains_key(CONFIGURATIONS) {
            self.root.insert(CONFIGURATIONS.into(), Value::Array(Vec::new()));
        }
        if !self.root.contains_key(VERSION) {
            self.root.insert(VERSION.into(), Value::from(DEFAULT_VERSION));
        }
    }

    /// Replaces the include list of the entry called `name`, appending a fresh
    /// entry if none matches. Every other entry and field is left as read.
    pub fn set_include_paths(&mut self, name: &str, include_paths: Vec<String>) -> Result<()> {
        let configurations = self
            .root
            .entry(CONFIGURATIONS)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| {
                IncludesError::InvalidDocument("`configurations` is not an array".into())
            })?;

        let paths = Value::from(include_paths);
        let existing = configurations
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|entry| entry.get(NAME).and_then(Value::as_str) == Some(name));

        match existing {
            Some(entry) => {
                log::debug!("Updating existing entry '{}'", name);
                entry.insert(INCLUDE_PATH.into(), paths);
            }
            None => {
                log::debug!("Appending new entry '{}'", name);
                let mut entry = Map::new();
                entry.insert(NAME.into(), Value::from(name));
                entry.insert(INCLUDE_PATH.into(), paths);
                entry.insert("cStandard".into(), Value::from(DEFAULT_C_STANDARD));
                entry.insert("cppStandard".into(), Value::from(DEFAULT_CPP_STANDARD));
                configurations.push(Value::Object(entry));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn entry(&self, name: &str) -> Option<&Map<String, Value>> {
        self.root
            .get(CONFIGURATIONS)?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .find(|entry| entry.get(NAME).and_then(Value::as_str) == Some(name))
    }

    /// Four-space indented JSON with a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.root
            .serialize(&mut ser)
            .context("Failed to serialize properties document")?;
        buf.push(b'\n');
        Ok(String::from_utf8(buf)?)
    }
}

/// Full merge step: defaults, then the include list for `name`.
pub fn merge(
    document: Option<PropertiesDocument>,
    name: &str,
    include_paths: Vec<String>,
) -> Result<PropertiesDocument> {
    let mut document = document.unwrap_or_default();
    document.ensure_defaults();
    document.set_include_paths(name, include_paths)?;
    Ok(document)
}

fn ensure_placeholder(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, "").with_context(|| format!("Failed to create {}", path.display()))?;
    log::info!("Created {}", path.display());
    Ok(())
}
