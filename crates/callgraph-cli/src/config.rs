//! Optional TOML defaults for the command line.
//!
//! A `callgraph.toml` next to the invocation (or the file named with
//! `--config`) supplies defaults; command-line flags always win. Unknown
//! fields are ignored so config files keep working across versions.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Every field mirrors a command-line flag; `None` means "not set here".
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub output: Option<String>,
    pub format: Option<String>,
    pub main: Option<String>,
    pub depth: Option<usize>,
    pub xref: Option<bool>,
    pub tree: Option<bool>,
    pub reverse: Option<bool>,
    pub number_lines: Option<bool>,
    pub print_levels: Option<bool>,
    pub tree_marks: Option<bool>,
    pub brief: Option<bool>,
    pub globals_only: Option<bool>,
    pub include_variables: Option<bool>,
    pub include_typedefs: Option<bool>,
    pub omit_undefined: Option<bool>,
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read config `{}`", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config `{}`", path.display()))
}
