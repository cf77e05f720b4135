//! SDK and version detection from `package.json`

mod package_manager;

pub use package_manager::{PackageManager, run_command};

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Maximum accepted size of a `package.json` (10 MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// SDK packages in detection priority order
///
/// Framework SDKs that build on other SDKs come first so a Next.js project
/// that also lists `@sentry/react` is detected as Next.js.
pub const SDK_PACKAGES: &[&str] = &[
    "@sentry/gatsby",
    "@sentry/nextjs",
    "@sentry/remix",
    "@sentry/sveltekit",
    "@sentry/angular",
    "@sentry/angular-ivy",
    "@sentry/ember",
    "@sentry/react",
    "@sentry/svelte",
    "@sentry/vue",
    "@sentry/serverless",
    "@sentry/browser",
    "@sentry/node",
];

/// SDKs running on a server, where browser-only packages never apply
const SERVER_SDKS: &[&str] = &[
    "@sentry/node",
    "@sentry/serverless",
    "@sentry/nextjs",
    "@sentry/remix",
    "@sentry/sveltekit",
    "@sentry/gatsby",
];

/// Packages folded into the SDKs in v8
pub const DEPRECATED_PACKAGES: &[&str] = &[
    "@sentry/tracing",
    "@sentry/replay",
    "@sentry/hub",
    "@sentry/integrations",
];

/// The parts of `package.json` migr8 reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,
    /// Present in workspace roots; its shape varies between package managers
    #[serde(default)]
    pub workspaces: Option<serde_json::Value>,
    /// File this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

impl PackageJson {
    /// Load and parse a `package.json`
    ///
    /// Files larger than 10 MB are rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| MigrateError::io(path, e))?;
        if metadata.len() > MAX_PACKAGE_JSON_SIZE {
            return Err(MigrateError::manifest(
                path,
                format!(
                    "file exceeds maximum size of {}MB",
                    MAX_PACKAGE_JSON_SIZE / 1024 / 1024
                ),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
        let mut pkg: PackageJson = serde_json::from_str(&content)
            .map_err(|e| MigrateError::manifest(path, format!("invalid JSON: {e}")))?;
        pkg.path = path.to_path_buf();
        Ok(pkg)
    }

    /// Load `package.json` from a project directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_path(&dir.join("package.json"))
    }

    /// Version range of a dependency or dev dependency
    pub fn package_version(&self, package: &str) -> Option<&str> {
        self.dependencies
            .get(package)
            .or_else(|| self.dev_dependencies.get(package))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.package_version(package).is_some()
    }

    /// Whether the package is only listed under `devDependencies`
    pub fn is_dev_dependency(&self, package: &str) -> bool {
        !self.dependencies.contains_key(package) && self.dev_dependencies.contains_key(package)
    }

    pub fn is_workspace_root(&self) -> bool {
        self.workspaces.is_some()
    }
}

/// The SDK package a project uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedSdk {
    pub package: String,
    /// Version range as written in `package.json`
    pub version: Option<String>,
}

impl DetectedSdk {
    pub fn new(package: impl Into<String>, version: Option<String>) -> Self {
        Self {
            package: package.into(),
            version,
        }
    }

    /// Major version of the range, e.g. 7 for `^7.100.0`
    pub fn major_version(&self) -> Option<u64> {
        self.version.as_deref().and_then(major_version)
    }

    pub fn is_server(&self) -> bool {
        is_server_sdk(&self.package)
    }

    /// Whether the project already uses v8 or later
    pub fn is_migrated(&self) -> bool {
        self.major_version().is_some_and(|major| major >= 8)
    }
}

/// First known SDK package listed in the manifest
pub fn detect_sdk(manifest: &PackageJson) -> Option<DetectedSdk> {
    SDK_PACKAGES.iter().find_map(|package| {
        manifest
            .package_version(package)
            .map(|version| DetectedSdk::new(*package, Some(version.to_string())))
    })
}

pub fn is_server_sdk(package: &str) -> bool {
    SERVER_SDKS.contains(&package)
}

/// Major component of a semver range such as `^7.100.0`, `~7.1`, `>=7.0.0 <8`
/// or `7.x`
pub fn major_version(range: &str) -> Option<u64> {
    let start = range.find(|c: char| c.is_ascii_digit())?;
    let digits: String = range[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(json: &str) -> PackageJson {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn detects_framework_sdk_before_base_sdk() {
        let pkg = manifest(
            r#"{ "dependencies": { "@sentry/react": "^7.0.0" }, "devDependencies": { "@sentry/nextjs": "7.100.1" } }"#,
        );
        let sdk = detect_sdk(&pkg).unwrap();
        assert_eq!(sdk.package, "@sentry/nextjs");
        assert_eq!(sdk.major_version(), Some(7));
        assert!(sdk.is_server());
        assert!(!sdk.is_migrated());
    }

    #[test]
    fn no_sdk_without_known_package() {
        let pkg = manifest(r#"{ "dependencies": { "@sentry/utils": "^7.0.0" } }"#);
        assert_eq!(detect_sdk(&pkg), None);
    }

    #[test]
    fn parses_major_versions() {
        assert_eq!(major_version("^7.100.0"), Some(7));
        assert_eq!(major_version("~8.0.0-beta.1"), Some(8));
        assert_eq!(major_version(">=7.0.0 <8"), Some(7));
        assert_eq!(major_version("7.x"), Some(7));
        assert_eq!(major_version("latest"), None);
        assert!(DetectedSdk::new("@sentry/vue", Some("^8.1.0".into())).is_migrated());
    }

    #[test]
    fn server_sdks() {
        assert!(is_server_sdk("@sentry/node"));
        assert!(is_server_sdk("@sentry/sveltekit"));
        assert!(!is_server_sdk("@sentry/browser"));
        assert!(!is_server_sdk("@sentry/vue"));
    }

    #[test]
    fn loads_manifest_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "app", "workspaces": ["packages/*"], "devDependencies": { "@sentry/node": "^7.1.0" } }"#,
        )
        .unwrap();
        let pkg = PackageJson::from_dir(dir.path()).unwrap();
        assert_eq!(pkg.name.as_deref(), Some("app"));
        assert!(pkg.is_workspace_root());
        assert!(pkg.is_dev_dependency("@sentry/node"));
        assert_eq!(pkg.path, dir.path().join("package.json"));
    }

    #[test]
    fn rejects_malformed_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let err = PackageJson::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::Manifest { .. }));
    }
}
