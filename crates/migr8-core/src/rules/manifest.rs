//! Rules that change dependencies through the package manager

use std::path::PathBuf;

use crate::error::Result;
use crate::sdk::{DEPRECATED_PACKAGES, PackageJson, PackageManager, run_command};
use crate::transform::{TransformReport, Transformer, TransformerOptions};

/// Run the project's package manager, or only record the command in a dry run
///
/// Failures are logged and noted but never abort the run.
pub(crate) fn run_package_manager(
    options: &TransformerOptions,
    args: Vec<String>,
    report: &mut TransformReport,
) {
    let manager = PackageManager::detect(&options.cwd);
    let command = format!("{} {}", manager.program(), args.join(" "));
    if options.dry_run {
        tracing::info!("dry run, skipping `{command}`");
        report.notes.push(format!("would run `{command}`"));
        return;
    }
    match run_command(manager, &args, &options.cwd) {
        Ok(()) => report.notes.push(format!("ran `{command}`")),
        Err(err) => {
            tracing::warn!("{err}");
            report.notes.push(format!("`{command}` failed, run it manually"));
        }
    }
}

/// The project manifest, unless it is missing or a workspace root
pub(crate) fn editable_manifest(options: &TransformerOptions) -> Result<Option<PackageJson>> {
    let path = options.cwd.join("package.json");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no package.json, skipping");
        return Ok(None);
    }
    let manifest = PackageJson::from_path(&path)?;
    if manifest.is_workspace_root() {
        tracing::warn!(
            "It seems you are in a workspace, cannot update dependencies. Try to run this command in the subpackages themselves."
        );
        return Ok(None);
    }
    Ok(Some(manifest))
}

fn deprecated_in(manifest: &PackageJson) -> Vec<&'static str> {
    DEPRECATED_PACKAGES
        .iter()
        .copied()
        .filter(|p| manifest.has_package(p))
        .collect()
}

/// Uninstalls `@sentry/tracing`, `@sentry/replay`, `@sentry/hub` and
/// `@sentry/integrations`
pub struct RemoveDeprecatedPackages;

impl Transformer for RemoveDeprecatedPackages {
    fn id(&self) -> &'static str {
        "remove-deprecated-packages"
    }

    fn name(&self) -> &'static str {
        "Remove deprecated packages"
    }

    fn transform(&self, _files: &[PathBuf], options: &TransformerOptions) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        let Some(manifest) = editable_manifest(options)? else {
            return Ok(report);
        };

        let remove = deprecated_in(&manifest);
        if remove.is_empty() {
            tracing::debug!("no deprecated package found");
            return Ok(report);
        }
        let args = PackageManager::detect(&options.cwd).remove_args(&remove);
        run_package_manager(options, args, &mut report);
        Ok(report)
    }
}

/// Installs the latest release of the SDK, dropping deprecated packages first
pub struct SdkLatestVersion;

impl Transformer for SdkLatestVersion {
    fn id(&self) -> &'static str {
        "sdk-latest-version"
    }

    fn name(&self) -> &'static str {
        "Update SDK to latest version"
    }

    fn transform(&self, _files: &[PathBuf], options: &TransformerOptions) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        let Some(manifest) = editable_manifest(options)? else {
            return Ok(report);
        };
        let has_sentry = manifest
            .dependencies
            .keys()
            .chain(manifest.dev_dependencies.keys())
            .any(|dep| dep.starts_with("@sentry/"));
        if !has_sentry {
            return Ok(report);
        }

        let manager = PackageManager::detect(&options.cwd);
        let remove = deprecated_in(&manifest);
        if !remove.is_empty() {
            run_package_manager(options, manager.remove_args(&remove), &mut report);
        }
        if let Some(sdk) = options.sdk() {
            let latest = format!("{sdk}@latest");
            let args = manager.add_args(&[latest.as_str()], manifest.is_dev_dependency(sdk));
            run_package_manager(options, args, &mut report);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(manifest: &str) -> (TempDir, TransformerOptions) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), manifest).unwrap();
        let options = TransformerOptions::new(dir.path()).with_dry_run(true);
        (dir, options)
    }

    #[test]
    fn plans_removal_of_listed_deprecated_packages() {
        let (dir, options) = project(
            r#"{ "dependencies": { "@sentry/browser": "^7.1.0", "@sentry/tracing": "^7.1.0" }, "devDependencies": { "@sentry/hub": "7.1.0" } }"#,
        );
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        let report = RemoveDeprecatedPackages.transform(&[], &options).unwrap();
        assert_eq!(report.notes, ["would run `yarn remove @sentry/tracing @sentry/hub`"]);
    }

    #[test]
    fn nothing_to_remove() {
        let (_dir, options) = project(r#"{ "dependencies": { "@sentry/node": "^7.1.0" } }"#);
        assert!(RemoveDeprecatedPackages.transform(&[], &options).unwrap().is_noop());
    }

    #[test]
    fn workspaces_and_missing_manifests_are_skipped() {
        let (_dir, options) = project(
            r#"{ "workspaces": ["packages/*"], "dependencies": { "@sentry/tracing": "^7.1.0" } }"#,
        );
        assert!(RemoveDeprecatedPackages.transform(&[], &options).unwrap().is_noop());

        let empty = TempDir::new().unwrap();
        let options = TransformerOptions::new(empty.path()).with_sdk("@sentry/node");
        assert!(SdkLatestVersion.transform(&[], &options).unwrap().is_noop());
    }

    #[test]
    fn installs_latest_sdk_with_dev_flag() {
        let (_dir, options) = project(
            r#"{ "devDependencies": { "@sentry/vue": "^7.100.0", "@sentry/replay": "^7.100.0" } }"#,
        );
        let options = options.with_sdk("@sentry/vue");
        let report = SdkLatestVersion.transform(&[], &options).unwrap();
        assert_eq!(
            report.notes,
            [
                "would run `npm uninstall @sentry/replay`",
                "would run `npm install @sentry/vue@latest --caret --save-dev`",
            ]
        );
    }

    #[test]
    fn invalid_manifest_is_an_error() {
        let (_dir, options) = project("{ not json");
        assert!(SdkLatestVersion.transform(&[], &options).is_err());
    }
}
