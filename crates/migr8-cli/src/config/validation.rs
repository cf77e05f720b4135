use crate::config::Migr8Config;
use crate::error::{ConfigError, Result};
use globset::Glob;

impl Migr8Config {
    /// Check values the types alone do not rule out
    pub fn validate(&self) -> Result<()> {
        if self.file_patterns.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filePatterns".to_string(),
                value: "[]".to_string(),
                hint: "Give at least one pattern, e.g. \"src/**/*.ts\"".to_string(),
            }
            .into());
        }

        for pattern in self.file_patterns.iter().chain(&self.ignore_patterns) {
            Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
        }

        if let Some(sdk) = &self.sdk {
            if !sdk.starts_with("@sentry/") {
                return Err(ConfigError::InvalidValue {
                    field: "sdk".to_string(),
                    value: sdk.clone(),
                    hint: "Use the package name, e.g. @sentry/react".to_string(),
                }
                .into());
            }
        }

        for id in &self.rules {
            if migr8_core::find(id).is_none() {
                return Err(ConfigError::UnknownRule(id.clone()).into());
            }
        }
        Ok(())
    }
}
