//! Layered configuration for a migration run.
//!
//! Merges, lowest to highest priority: built-in defaults, `.migr8rc.json` or
//! `migr8.config.json` in the project directory, `MIGR8_*` environment
//! variables, and command-line flags.

mod loading;
mod tests;
mod validation;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file names, in lookup order
pub const CONFIG_FILES: &[&str] = &[".migr8rc.json", "migr8.config.json"];

/// Every script file migr8 knows how to rewrite
pub const DEFAULT_FILE_PATTERN: &str = "**/*.{js,jsx,ts,tsx,mjs,cjs,mts,vue,svelte}";

pub const DEFAULT_IGNORE_PATTERN: &str = "**/node_modules/**";

/// migr8 configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Migr8Config {
    /// Files to migrate, as globs relative to `cwd`
    #[serde(default = "default_file_patterns")]
    pub file_patterns: Vec<String>,

    /// Files to leave alone
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub debug: bool,

    /// SDK package override, e.g. `@sentry/react`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,

    /// SDK version override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,

    /// Project directory, relative to where migr8 was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub skip_git_checks: bool,

    /// Rule ids to run; empty means choose interactively or run all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,

    #[serde(default)]
    pub dry_run: bool,
}

pub fn default_file_patterns() -> Vec<String> {
    vec![DEFAULT_FILE_PATTERN.to_string()]
}

pub fn default_ignore_patterns() -> Vec<String> {
    vec![DEFAULT_IGNORE_PATTERN.to_string()]
}

impl Default for Migr8Config {
    fn default() -> Self {
        Self {
            file_patterns: default_file_patterns(),
            ignore_patterns: default_ignore_patterns(),
            debug: false,
            sdk: None,
            sdk_version: None,
            cwd: None,
            skip_git_checks: false,
            rules: Vec::new(),
            dry_run: false,
        }
    }
}
