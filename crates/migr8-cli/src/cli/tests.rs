#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_bare_invocation_runs() {
        let cli = Cli::try_parse_from(["migr8", "src/**/*.ts", "--sdk", "@sentry/react", "--all"])
            .unwrap();
        let Command::Run(args) = cli.into_command() else {
            panic!("expected run");
        };
        assert_eq!(args.patterns, ["src/**/*.ts"]);
        assert_eq!(args.sdk.as_deref(), Some("@sentry/react"));
        assert!(args.all);
    }

    #[test]
    fn test_explicit_run() {
        let cli = Cli::try_parse_from([
            "migr8",
            "run",
            "--rule",
            "hub",
            "--rule",
            "tracing-config",
            "--ignore",
            "legacy/**",
            "--cwd",
            "app",
            "--dry-run",
            "--yes",
        ])
        .unwrap();
        assert!(cli.run_args().is_some());
        let Command::Run(args) = cli.into_command() else {
            panic!("expected run");
        };
        assert_eq!(args.rules, ["hub", "tracing-config"]);
        assert_eq!(args.ignore, ["legacy/**"]);
        assert_eq!(args.cwd, Some(PathBuf::from("app")));
        assert!(args.dry_run && args.yes);
    }

    #[test]
    fn test_list() {
        let cli = Cli::try_parse_from(["migr8", "list", "--no-color"]).unwrap();
        assert!(cli.no_color);
        assert!(cli.run_args().is_none());
        assert!(matches!(cli.into_command(), Command::List));
    }

    #[test]
    fn test_conflicts() {
        assert!(Cli::try_parse_from(["migr8", "-v", "-q"]).is_err());
        assert!(Cli::try_parse_from(["migr8", "--rule", "hub", "--all"]).is_err());
    }

    #[test]
    fn test_debug_flag_counts_as_verbose() {
        let cli = Cli::try_parse_from(["migr8", "--debug"]).unwrap();
        assert!(cli.run_args().is_some_and(|r| r.debug));
    }
}
