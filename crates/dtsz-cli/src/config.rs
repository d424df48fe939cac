//! JSON config file for bundling several entries in one run.
//!
//! ```json
//! {
//!   "entries": [
//!     { "filePath": "./src/index.d.ts", "outFile": "./dist/index.d.ts",
//!       "output": { "sortNodes": true } }
//!   ]
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use dtsz_bundler::BundleOptions;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryConfig {
    pub file_path: PathBuf,
    #[serde(default)]
    pub out_file: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Per-entry output options. Unset fields keep the defaults.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_banner: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub sort_nodes: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub export_referenced_types: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub inline_declare_globals: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub inline_declare_externals: Option<bool>,
}

impl OutputConfig {
    pub fn to_options(&self) -> BundleOptions {
        let defaults = BundleOptions::default();
        BundleOptions {
            no_banner: self.no_banner.unwrap_or(defaults.no_banner),
            sort_nodes: self.sort_nodes.unwrap_or(defaults.sort_nodes),
            export_referenced_types: self
                .export_referenced_types
                .unwrap_or(defaults.export_referenced_types),
            inline_declare_global: self
                .inline_declare_globals
                .unwrap_or(defaults.inline_declare_global),
            inline_declare_externals: self
                .inline_declare_externals
                .unwrap_or(defaults.inline_declare_externals),
        }
    }
}

pub fn parse_config(source: &str) -> Result<BundleConfig> {
    serde_json::from_str(source).context("failed to parse config JSON")
}

/// Load a config file and make its paths absolute against the file's
/// directory.
pub fn load_config(path: &Path) -> Result<BundleConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    let base_dir = path
        .parent()
        .ok_or_else(|| anyhow!("config has no parent directory"))?;

    for entry in &mut config.entries {
        entry.file_path = base_dir.join(&entry.file_path);
        if let Some(out_file) = entry.out_file.take() {
            entry.out_file = Some(base_dir.join(out_file));
        }
    }
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
