use crate::cli::RunArgs;
use crate::config::{CONFIG_FILES, Migr8Config};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The flags that were actually given, so unset flags do not mask the file
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    file_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sdk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sdk_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_git_checks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
}

impl FlagOverrides {
    fn from_args(args: &RunArgs) -> Self {
        let flag = |set: bool| set.then_some(true);
        Self {
            file_patterns: (!args.patterns.is_empty()).then(|| args.patterns.clone()),
            debug: flag(args.debug),
            sdk: args.sdk.clone(),
            sdk_version: args.sdk_version.clone(),
            skip_git_checks: flag(args.skip_git_checks),
            rules: (!args.rules.is_empty()).then(|| args.rules.clone()),
            dry_run: flag(args.dry_run),
        }
    }
}

/// `SKIP_GIT_CHECKS` to `skipGitChecks`
fn env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

impl Migr8Config {
    /// The config file in `dir`, if there is one
    pub fn find_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration for a run started in `dir`.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &RunArgs, dir: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::find_file(dir) {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(
            Env::prefixed("MIGR8_")
                .lowercase(false)
                .map(|key| env_key(key.as_str()).into()),
        );
        figment = figment.merge(Serialized::defaults(FlagOverrides::from_args(args)));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: "Check .migr8rc.json and MIGR8_* variables for typos and field types"
                .to_string(),
        })?;
        // `--ignore` adds to the configured patterns instead of replacing them.
        config.ignore_patterns.extend(args.ignore.iter().cloned());

        config.validate()?;
        Ok(config)
    }

    /// The project directory for a run started in `dir`
    pub fn project_dir(&self, dir: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) => path_clean::clean(dir.join(cwd)),
            None => dir.to_path_buf(),
        }
    }
}
