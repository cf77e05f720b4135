//! Next.js `withSentry*` wrappers to `wrap*WithSentry`

use crate::error::Result;
use crate::imports::{has_package_import, replace_function_calls, replace_imported};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass};
use crate::wrapper::SourceUnit;

const NEXTJS_PACKAGE: &str = "@sentry/nextjs";

const WRAPPERS: &[(&str, &str)] = &[
    ("withSentryAPI", "wrapApiHandlerWithSentry"),
    ("withSentryServerSideGetInitialProps", "wrapGetInitialPropsWithSentry"),
    ("withSentryServerSideAppGetInitialProps", "wrapAppGetInitialPropsWithSentry"),
    ("withSentryServerSideDocumentGetInitialProps", "wrapDocumentGetInitialPropsWithSentry"),
    ("withSentryServerSideErrorGetInitialProps", "wrapErrorGetInitialPropsWithSentry"),
    ("withSentryGetServerSideProps", "wrapGetServerSidePropsWithSentry"),
    ("withSentryGetStaticProps", "wrapGetStaticPropsWithSentry"),
    ("withSentry", "wrapApiWithSentry"),
];

pub struct NextjsWrapperMethods;

impl SourceRule for NextjsWrapperMethods {
    fn id(&self) -> &'static str {
        "nextjs-wrapper-methods"
    }

    fn name(&self) -> &'static str {
        "Next.js Wrapper Methods v7>v8"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !has_package_import(unit.source, NEXTJS_PACKAGE) {
            return Ok(None);
        }

        let output = edit_pass(unit.source, unit.parse_options, |module| {
            replace_function_calls(module, NEXTJS_PACKAGE, WRAPPERS)
        })?;
        let output = edit_pass(&output, unit.parse_options, |module| {
            replace_imported(module, NEXTJS_PACKAGE, WRAPPERS)
        })?;
        Ok(changed(unit.source, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_rewrite, assert_unchanged};

    #[test]
    fn renames_named_wrappers() {
        assert_rewrite(
            &NextjsWrapperMethods,
            &TransformerOptions::default(),
            r#"import { withSentryAPI, withSentryGetServerSideProps as gssp } from '@sentry/nextjs';

export const getServerSideProps = gssp(async () => ({ props: {} }));
export default withSentryAPI(handler, '/api/hello');
"#,
            r#"import { wrapApiHandlerWithSentry, wrapGetServerSidePropsWithSentry as gssp } from '@sentry/nextjs';

export const getServerSideProps = gssp(async () => ({ props: {} }));
export default wrapApiHandlerWithSentry(handler, '/api/hello');
"#,
        );
    }

    #[test]
    fn renames_namespace_calls() {
        assert_rewrite(
            &NextjsWrapperMethods,
            &TransformerOptions::default(),
            "const Sentry = require('@sentry/nextjs');\nmodule.exports = Sentry.withSentry(handler);\n",
            "const Sentry = require('@sentry/nextjs');\nmodule.exports = Sentry.wrapApiWithSentry(handler);\n",
        );
    }

    #[test]
    fn ignores_other_packages() {
        assert_unchanged(
            &NextjsWrapperMethods,
            &TransformerOptions::default(),
            "import { withSentry } from './sentry';\nexport default withSentry(handler);\n",
        );
    }
}
