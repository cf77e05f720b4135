//! The migration rules
//!
//! Each rule lives in its own module. Source rules implement
//! [`SourceRule`](crate::transform::SourceRule) and follow the same shape:
//! a cheap text check that skips files without a relevant import, a rewrite
//! pass over the parsed unit, and an import fixup pass over the rewritten
//! text.

mod add_migration_comments;
mod configure_scope;
mod convert_enums;
mod hub;
mod integrations;
mod manifest;
mod nextjs_wrapper_methods;
mod node_exports;
mod node_instrument_file;
mod replay_config;
mod rewrite_hub_imports;
mod rewrite_package_imports;
mod rewrite_svelte_config;
mod tracing_config;
mod util_exports;

pub use add_migration_comments::AddMigrationComments;
pub use configure_scope::ConfigureScope;
pub use convert_enums::ConvertEnums;
pub use hub::Hub;
pub use integrations::Integrations;
pub use manifest::{RemoveDeprecatedPackages, SdkLatestVersion};
pub use nextjs_wrapper_methods::NextjsWrapperMethods;
pub use node_exports::NodeExports;
pub use node_instrument_file::NodeInstrumentFile;
pub use replay_config::ReplayConfig;
pub use rewrite_hub_imports::RewriteHubImports;
pub use rewrite_package_imports::{
    RewriteIntegrationsImports, RewriteReplayImports, RewriteTracingImports,
};
pub use rewrite_svelte_config::RewriteSvelteConfig;
pub use tracing_config::TracingConfig;
pub use util_exports::UtilExports;

use crate::imports::imports_package;
use crate::parser::Module;
use crate::sdk::SDK_PACKAGES;
use crate::transform::TransformerOptions;

/// The SDK package import fixups target
///
/// The configured SDK wins; otherwise the first known SDK the module
/// already imports.
pub(crate) fn target_sdk(options: &TransformerOptions, module: &Module<'_, '_>) -> Option<String> {
    if let Some(sdk) = options.sdk() {
        return Some(sdk.to_string());
    }
    SDK_PACKAGES
        .iter()
        .find(|package| imports_package(module, package))
        .map(|package| package.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::error::Result;
    use crate::transform::{SourceRule, TransformerOptions};
    use crate::wrapper::{SourceUnit, wrap};

    /// Run a rule over `source` as if it were a file named `file_name`
    pub fn apply(
        rule: &dyn SourceRule,
        file_name: &str,
        source: &str,
        options: &TransformerOptions,
    ) -> Result<Option<String>> {
        wrap(Path::new(file_name), source, |unit: &SourceUnit<'_>| {
            rule.rewrite(unit, options)
        })
    }

    /// Rewrite once, check the output, and check a second run changes nothing
    #[track_caller]
    pub fn assert_rewrite(
        rule: &dyn SourceRule,
        options: &TransformerOptions,
        input: &str,
        expected: &str,
    ) {
        let output = apply(rule, "test.ts", input, options)
            .unwrap()
            .unwrap_or_else(|| input.to_string());
        assert_eq!(output, expected);
        assert_eq!(
            apply(rule, "test.ts", &output, options).unwrap(),
            None,
            "second run changed the output"
        );
    }

    #[track_caller]
    pub fn assert_unchanged(rule: &dyn SourceRule, options: &TransformerOptions, input: &str) {
        assert_eq!(apply(rule, "test.ts", input, options).unwrap(), None);
    }

    pub fn sdk(package: &str) -> TransformerOptions {
        TransformerOptions::new(".").with_sdk(package)
    }
}
