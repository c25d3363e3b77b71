//! Module resolution (C3, §4.3): `@use`/`@forward`/`@import` loading,
//! the per-compilation module cache, cycle detection, and the importer
//! trait consumed from outside this core (§6).

mod builtins;
mod importer;
mod loader;
mod module;

pub use builtins::{is_builtin_url, BUILTIN_MODULE_URLS};
pub use importer::{ImportedSource, Importer};
pub use loader::{LoadOutcome, ModuleLoader};
pub use module::Module;

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::{SourceFile, Span};
    use sass_env::Configuration;
    use std::rc::Rc;
    use url::Url;

    struct FixedImporter {
        base: Url,
        text: String,
    }

    impl Importer for FixedImporter {
        fn canonicalize(&self, url: &str, _base_url: Option<&Url>, _for_import: bool) -> Option<Url> {
            if url == "foo" {
                Some(self.base.clone())
            } else {
                None
            }
        }

        fn import_canonical(&self, canonical_url: &Url) -> sass_diagnostics::SassResult<Option<ImportedSource>> {
            if *canonical_url == self.base {
                Ok(Some(ImportedSource {
                    text: self.text.clone(),
                    syntax: sass_ast::Syntax::Scss,
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    #[test]
    fn reloading_an_active_module_is_a_loop() {
        let importer: Rc<dyn Importer> = Rc::new(FixedImporter {
            base: Url::parse("file:///foo.scss").unwrap(),
            text: String::new(),
        });
        let mut loader = ModuleLoader::new(importer, Vec::new());
        let url = Url::parse("file:///foo.scss").unwrap();
        let config = Configuration::new();
        assert!(matches!(
            loader.start_load(&url, &span(), &config).unwrap(),
            LoadOutcome::NeedsEvaluation
        ));
        assert!(loader.start_load(&url, &span(), &config).is_err());
    }

    #[test]
    fn builtin_urls_reject_configuration() {
        let importer: Rc<dyn Importer> = Rc::new(FixedImporter {
            base: Url::parse("file:///foo.scss").unwrap(),
            text: String::new(),
        });
        let mut loader = ModuleLoader::new(importer, Vec::new());
        let url = Url::parse("sass:math").unwrap();
        assert!(matches!(
            loader.start_load(&url, &span(), &Configuration::new()).unwrap(),
            LoadOutcome::BuiltIn
        ));
    }
}
