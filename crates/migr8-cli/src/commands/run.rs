//! `migr8 run`: the migration itself.
//!
//! Loads configuration, runs the preflight checks, detects the SDK, picks the
//! rules, finds the files, and runs the rules one after another. A failing
//! rule does not stop the others; the exit code reports it afterwards.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use inquire::MultiSelect;
use migr8_core::{
    DetectedSdk, PackageJson, RuleOutcome, Transformer, TransformerOptions, detect_sdk, discover,
    run_rule,
};

use crate::cli::RunArgs;
use crate::config::Migr8Config;
use crate::discovery::discover_files;
use crate::error::{CliError, Result, ResultExt};
use crate::{preflight, ui};

pub const CANCELLED_MESSAGE: &str = "Migr8 run cancelled, see you next time :)";

/// Where the run starts: `--cwd` if given, else the current directory
fn start_dir(args: &RunArgs) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match &args.cwd {
        Some(dir) => path_clean::clean(current.join(dir)),
        None => current,
    })
}

/// The SDK to migrate: the configured one, else the first one in package.json
fn resolve_sdk(config: &Migr8Config, root: &Path) -> Result<Option<DetectedSdk>> {
    let manifest_path = root.join("package.json");
    let manifest = if manifest_path.is_file() {
        Some(PackageJson::from_path(&manifest_path).with_hint("Fix package.json or pass --sdk")?)
    } else {
        None
    };

    let detected = match &config.sdk {
        Some(package) => {
            let version = manifest
                .as_ref()
                .and_then(|m| m.package_version(package))
                .map(str::to_string);
            Some(DetectedSdk::new(package.clone(), version))
        }
        None => manifest.as_ref().and_then(detect_sdk),
    };

    Ok(detected.map(|mut sdk| {
        if let Some(version) = &config.sdk_version {
            sdk.version = Some(version.clone());
        }
        sdk
    }))
}

/// Rules to run, always in catalogue order
fn select_rules(config: &Migr8Config, all: bool) -> Result<Vec<Box<dyn Transformer>>> {
    let catalogue = discover();
    if !config.rules.is_empty() {
        return Ok(catalogue
            .into_iter()
            .filter(|r| config.rules.iter().any(|k| k == r.id() || k == r.name()))
            .collect());
    }
    if all || !preflight::is_interactive() {
        return Ok(catalogue);
    }

    let names: Vec<&'static str> = catalogue.iter().map(|r| r.name()).collect();
    let chosen = MultiSelect::new("Which migrations do you want to run?", names)
        .with_all_selected_by_default()
        .prompt()?;
    Ok(catalogue
        .into_iter()
        .filter(|r| chosen.contains(&r.name()))
        .collect())
}

fn run_rules(
    rules: &[Box<dyn Transformer>],
    files: &[PathBuf],
    options: &TransformerOptions,
) -> Vec<RuleOutcome> {
    rules
        .iter()
        .map(|rule| {
            let spinner = ui::Spinner::new(rule.name());
            let outcome = run_rule(rule.as_ref(), files, options);
            if outcome.is_ok() {
                spinner.finish(rule.name());
            } else {
                spinner.fail(rule.name());
            }
            outcome
        })
        .collect()
}

/// Execute `migr8 run`
pub fn execute(args: RunArgs) -> Result<ExitCode> {
    let started = Instant::now();
    let start = start_dir(&args)?;
    let config = Migr8Config::load(&args, &start)?;
    let root = config.project_dir(&start);
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }

    preflight::check_git(&root, config.skip_git_checks, args.yes)?;

    let sdk = resolve_sdk(&config, &root)?;
    match &sdk {
        Some(sdk) => {
            ui::info(&format!(
                "Migrating {} {}",
                sdk.package,
                sdk.version.as_deref().unwrap_or("(unknown version)")
            ));
            preflight::check_version(sdk, args.yes)?;
        }
        None => ui::warning(
            "No Sentry SDK found in package.json. Rules that need one will skip; pass --sdk to choose one.",
        ),
    }

    let rules = select_rules(&config, args.all)?;
    if rules.is_empty() {
        ui::warning("No rules selected, nothing to do.");
        return Ok(ExitCode::SUCCESS);
    }

    let files = discover_files(&root, &config.file_patterns, &config.ignore_patterns)?;
    if files.is_empty() {
        ui::warning("No files matched the file patterns.");
    }
    tracing::debug!(files = files.len(), rules = rules.len(), "starting run");

    let options = TransformerOptions {
        sdk: sdk.as_ref().map(|s| s.package.clone()),
        sdk_version: sdk.and_then(|s| s.version),
        cwd: root.clone(),
        debug: config.debug,
        dry_run: config.dry_run,
    };
    let outcomes = run_rules(&rules, &files, &options);
    ui::print_summary(&outcomes, &root, config.dry_run);

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        ui::error(&format!(
            "{failed} of {} rules failed. Files changed by the other rules were kept.",
            outcomes.len()
        ));
        return Ok(ExitCode::FAILURE);
    }

    let elapsed = ui::format_duration(started.elapsed());
    if config.dry_run {
        ui::success(&format!("Dry run finished in {elapsed}, no files were written."));
    } else {
        ui::success(&format!(
            "Migration finished in {elapsed}. Review the changes and search for `{}` comments.",
            migr8_core::MARKER_PREFIX
        ));
    }
    Ok(ExitCode::SUCCESS)
}
