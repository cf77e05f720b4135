#[cfg(test)]
mod tests {
    use crate::cli::RunArgs;
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(Migr8Config::default()).unwrap();
        assert_eq!(json["filePatterns"][0], DEFAULT_FILE_PATTERN);
        assert_eq!(json["ignorePatterns"][0], DEFAULT_IGNORE_PATTERN);
        assert!(json.get("skipGitChecks").is_some());
        assert!(json.get("skip_git_checks").is_none());
        assert!(json.get("sdk").is_none());
        assert!(json.get("rules").is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<Migr8Config, _> = serde_json::from_str(r#"{ "filePattern": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        assert!(Migr8Config::default().validate().is_ok());

        let empty = Migr8Config {
            file_patterns: vec![],
            ..Migr8Config::default()
        };
        assert!(empty.validate().is_err());

        let bad_glob = Migr8Config {
            ignore_patterns: vec!["src/[".to_string()],
            ..Migr8Config::default()
        };
        assert!(matches!(
            bad_glob.validate(),
            Err(CliError::Config(ConfigError::InvalidPattern { .. }))
        ));

        let bad_sdk = Migr8Config {
            sdk: Some("react".to_string()),
            ..Migr8Config::default()
        };
        assert!(bad_sdk.validate().is_err());

        let bad_rule = Migr8Config {
            rules: vec!["hub".to_string(), "nope".to_string()],
            ..Migr8Config::default()
        };
        assert!(matches!(
            bad_rule.validate(),
            Err(CliError::Config(ConfigError::UnknownRule(id))) if id == "nope"
        ));
    }

    #[test]
    #[serial]
    fn test_file_then_env_then_flags() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".migr8rc.json"),
            r#"{ "sdk": "@sentry/vue", "debug": true, "ignorePatterns": ["**/legacy/**"] }"#,
        )
        .unwrap();

        unsafe { std::env::set_var("MIGR8_SKIP_GIT_CHECKS", "true") };
        let args = RunArgs {
            sdk: Some("@sentry/react".to_string()),
            ignore: vec!["**/*.min.js".to_string()],
            ..RunArgs::default()
        };
        let config = Migr8Config::load(&args, temp.path());
        unsafe { std::env::remove_var("MIGR8_SKIP_GIT_CHECKS") };
        let config = config.unwrap();

        assert_eq!(config.sdk.as_deref(), Some("@sentry/react"));
        assert!(config.debug);
        assert!(config.skip_git_checks);
        assert!(!config.dry_run);
        assert_eq!(config.file_patterns, default_file_patterns());
        assert_eq!(config.ignore_patterns, ["**/legacy/**", "**/*.min.js"]);
    }

    #[test]
    #[serial]
    fn test_alternate_file_name_and_bad_contents() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("migr8.config.json"), r#"{ "dryRun": true }"#).unwrap();
        let config = Migr8Config::load(&RunArgs::default(), temp.path()).unwrap();
        assert!(config.dry_run);

        fs::write(temp.path().join(".migr8rc.json"), r#"{ "dryRun": "maybe" }"#).unwrap();
        let err = Migr8Config::load(&RunArgs::default(), temp.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid value for 'configuration'"));
    }
}
