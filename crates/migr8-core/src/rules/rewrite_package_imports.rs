//! Imports of packages folded into the SDKs, pointed at the SDK

use std::path::Path;

use crate::error::Result;
use crate::imports::{dedupe, has_package_import, retarget};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

/// Retarget `from` to `sdk`, then fold the retargeted imports into the
/// SDK's existing ones
///
/// Requires are retargeted but never merged.
fn relocate(unit: &SourceUnit<'_>, from: &str, sdk: &str) -> Result<Option<String>> {
    if !has_package_import(unit.source, from) {
        return Ok(None);
    }

    let (output, handles) = rewrite_pass(unit.source, unit.parse_options, |module| {
        Ok(retarget(module, from, sdk))
    })?;
    let output = if handles.is_empty() {
        output
    } else {
        edit_pass(&output, unit.parse_options, |module| {
            dedupe(module, sdk, Some(&handles))
        })?
    };
    tracing::debug!(path = %unit.path.display(), from, to = sdk, "relocated imports");
    Ok(changed(unit.source, output))
}

/// `@sentry/tracing` to the SDK package
pub struct RewriteTracingImports;

impl SourceRule for RewriteTracingImports {
    fn id(&self) -> &'static str {
        "rewrite-tracing-imports"
    }

    fn name(&self) -> &'static str {
        "Remove `@sentry/tracing` imports"
    }

    fn applies_to(&self, _path: &Path, options: &TransformerOptions) -> bool {
        options.sdk().is_some()
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        match options.sdk() {
            Some(sdk) => relocate(unit, "@sentry/tracing", sdk),
            None => Ok(None),
        }
    }
}

/// `@sentry/replay` to the SDK package, browser SDKs only
pub struct RewriteReplayImports;

impl SourceRule for RewriteReplayImports {
    fn id(&self) -> &'static str {
        "rewrite-replay-imports"
    }

    fn name(&self) -> &'static str {
        "Remove `@sentry/replay` imports"
    }

    fn applies_to(&self, _path: &Path, options: &TransformerOptions) -> bool {
        options.sdk().is_some() && !options.is_server_sdk()
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        match options.sdk() {
            Some(sdk) if !options.is_server_sdk() => relocate(unit, "@sentry/replay", sdk),
            _ => Ok(None),
        }
    }
}

/// `@sentry/integrations` to the SDK package
pub struct RewriteIntegrationsImports;

impl SourceRule for RewriteIntegrationsImports {
    fn id(&self) -> &'static str {
        "rewrite-integrations-imports"
    }

    fn name(&self) -> &'static str {
        "Remove `@sentry/integrations` imports"
    }

    fn applies_to(&self, _path: &Path, options: &TransformerOptions) -> bool {
        options.sdk().is_some()
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        match options.sdk() {
            Some(sdk) => relocate(unit, "@sentry/integrations", sdk),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply, assert_rewrite, assert_unchanged, sdk};

    #[test]
    fn tracing_namespace_folds_into_sdk_namespace() {
        assert_rewrite(
            &RewriteTracingImports,
            &sdk("@sentry/node"),
            r#"import * as Sentry from '@sentry/node';
import * as Tracing from '@sentry/tracing';

Tracing.addExtensionMethods();

function local() {
  const Tracing = { addExtensionMethods() {} };
  Tracing.addExtensionMethods();
}
"#,
            r#"import * as Sentry from '@sentry/node';

Sentry.addExtensionMethods();

function local() {
  const Tracing = { addExtensionMethods() {} };
  Tracing.addExtensionMethods();
}
"#,
        );
    }

    #[test]
    fn tracing_import_stays_named_under_shadowed_namespace() {
        assert_rewrite(
            &RewriteTracingImports,
            &sdk("@sentry/browser"),
            r#"import * as Sentry from '@sentry/browser';
import { BrowserTracing } from '@sentry/tracing';

function setup(Sentry) {
  return new BrowserTracing();
}
"#,
            r#"import * as Sentry from '@sentry/browser';
import { BrowserTracing } from '@sentry/browser';

function setup(Sentry) {
  return new BrowserTracing();
}
"#,
        );
    }

    #[test]
    fn tracing_named_imports_merge() {
        assert_rewrite(
            &RewriteTracingImports,
            &sdk("@sentry/react"),
            "import { init } from '@sentry/react';\nimport { BrowserTracing } from '@sentry/tracing';\nconst t = require('@sentry/tracing');\n",
            "import { init, BrowserTracing } from '@sentry/react';\nconst t = require('@sentry/react');\n",
        );
    }

    #[test]
    fn tracing_needs_an_sdk() {
        assert_unchanged(
            &RewriteTracingImports,
            &TransformerOptions::default(),
            "import { BrowserTracing } from '@sentry/tracing';\n",
        );
        assert!(!RewriteTracingImports.applies_to(Path::new("a.js"), &TransformerOptions::default()));
    }

    #[test]
    fn replay_moves_to_browser_sdks_only() {
        let source = "import { Replay } from '@sentry/replay';\nimport * as Sentry from '@sentry/vue';\n";
        assert_rewrite(
            &RewriteReplayImports,
            &sdk("@sentry/vue"),
            source,
            "import * as Sentry from '@sentry/vue';\n",
        );
        assert!(!RewriteReplayImports.applies_to(Path::new("a.js"), &sdk("@sentry/nextjs")));
        assert_eq!(
            apply(&RewriteReplayImports, "a.js", source, &sdk("@sentry/node")).unwrap(),
            None
        );
    }

    #[test]
    fn integrations_package_moves_to_sdk() {
        assert_rewrite(
            &RewriteIntegrationsImports,
            &sdk("@sentry/browser"),
            "import { init } from \"@sentry/browser\";\nimport { captureConsoleIntegration } from \"@sentry/integrations\";\n",
            "import { init, captureConsoleIntegration } from \"@sentry/browser\";\n",
        );
    }
}
