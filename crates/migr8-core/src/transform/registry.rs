//! The rule catalogue
//!
//! An explicit list in a stable order: the CLI shows rules in this order and
//! the runner applies them in it. Removing deprecated packages has to come
//! before updating the SDK.

use crate::rules::{
    AddMigrationComments, ConfigureScope, ConvertEnums, Hub, Integrations, NextjsWrapperMethods,
    NodeExports, NodeInstrumentFile, RemoveDeprecatedPackages, ReplayConfig, RewriteHubImports,
    RewriteIntegrationsImports, RewriteReplayImports, RewriteSvelteConfig, RewriteTracingImports,
    SdkLatestVersion, TracingConfig, UtilExports,
};

use super::{SourceTransformer, Transformer};

/// Every available rule
pub fn discover() -> Vec<Box<dyn Transformer>> {
    vec![
        Box::new(SourceTransformer(AddMigrationComments)),
        Box::new(SourceTransformer(ConfigureScope)),
        Box::new(SourceTransformer(ConvertEnums)),
        Box::new(SourceTransformer(Hub)),
        Box::new(SourceTransformer(Integrations)),
        Box::new(SourceTransformer(NextjsWrapperMethods)),
        Box::new(SourceTransformer(NodeExports)),
        Box::new(NodeInstrumentFile),
        Box::new(RemoveDeprecatedPackages),
        Box::new(SourceTransformer(ReplayConfig)),
        Box::new(RewriteHubImports),
        Box::new(SourceTransformer(RewriteIntegrationsImports)),
        Box::new(SourceTransformer(RewriteReplayImports)),
        Box::new(SourceTransformer(RewriteSvelteConfig)),
        Box::new(SourceTransformer(RewriteTracingImports)),
        Box::new(SdkLatestVersion),
        Box::new(SourceTransformer(TracingConfig)),
        Box::new(SourceTransformer(UtilExports)),
    ]
}

/// Look a rule up by id or by display name
pub fn find(key: &str) -> Option<Box<dyn Transformer>> {
    discover()
        .into_iter()
        .find(|rule| rule.id() == key || rule.name() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn catalogue_order_is_stable() {
        let ids: Vec<_> = discover().iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            [
                "add-migration-comments",
                "configure-scope",
                "convert-enums",
                "hub",
                "integrations",
                "nextjs-wrapper-methods",
                "node-exports",
                "node-instrument-file",
                "remove-deprecated-packages",
                "replay-config",
                "rewrite-hub-imports",
                "rewrite-integrations-imports",
                "rewrite-replay-imports",
                "rewrite-svelte-config",
                "rewrite-tracing-imports",
                "sdk-latest-version",
                "tracing-config",
                "util-exports",
            ]
        );
    }

    #[test]
    fn ids_and_names_are_unique() {
        let rules = discover();
        let ids: FxHashSet<_> = rules.iter().map(|r| r.id()).collect();
        let names: FxHashSet<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(ids.len(), rules.len());
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn find_by_id_or_name() {
        assert_eq!(find("tracing-config").unwrap().name(), "Tracing Config v7>v8");
        assert_eq!(
            find("Update SDK to latest version").unwrap().id(),
            "sdk-latest-version"
        );
        assert!(find("nope").is_none());
    }
}
