//! # migr8-core
//!
//! Transformer engine that migrates code using the Sentry JavaScript SDK
//! from v7 to v8 APIs.
//!
//! Each migration is a [`Transformer`] run over a set of files. Source rules
//! parse with OXC, record span edits against the original text and apply
//! them in one pass, so everything a rule does not touch stays byte-for-byte
//! the same. Import fixups (retarget, dedupe, rename, prune) run as a second
//! pass over the rewritten text.
//!
//! ```no_run
//! use std::path::PathBuf;
//! use migr8_core::{TransformerOptions, discover, run_all};
//!
//! let files = vec![PathBuf::from("src/app.ts")];
//! let options = TransformerOptions::new(".").with_sdk("@sentry/browser");
//! let rules = discover();
//! let outcomes = run_all(rules.iter().map(|r| r.as_ref()), &files, &options, |_| {});
//! assert!(outcomes.iter().all(|o| o.is_ok()));
//! ```

pub mod edit;
pub mod error;
pub mod extract;
pub mod imports;
pub mod marker;
pub mod matchers;
pub mod parser;
pub mod rules;
pub mod sdk;
pub mod text;
pub mod transform;
pub mod wrapper;

pub use edit::{Edit, EditSet};
pub use error::{MigrateError, Result};
pub use marker::MARKER_PREFIX;
pub use parser::{Module, ParseOptions, with_module};
pub use sdk::{DetectedSdk, PackageJson, PackageManager, detect_sdk};
pub use transform::{
    RuleOutcome, SourceRule, SourceTransformer, TransformReport, Transformer, TransformerOptions,
    discover, find, run_all, run_rule,
};
pub use wrapper::{SourceUnit, wrap};
