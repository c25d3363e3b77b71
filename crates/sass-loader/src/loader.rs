use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use sass_diagnostics::{SassError, SassResult, Span};
use sass_env::Configuration;
use url::Url;

use crate::builtins::is_builtin_url;
use crate::importer::{ImportedSource, Importer};
use crate::module::Module;

/// What the caller (the evaluator) should do after calling
/// [`ModuleLoader::start_load`] (§4.3 steps 2-4).
pub enum LoadOutcome {
    /// A built-in module URL; the caller supplies its pre-built members.
    BuiltIn,
    /// Already evaluated with a structurally-equal configuration (or none
    /// at all): reuse the cached module, no evaluation needed.
    Cached(Rc<Module>),
    /// Not yet loaded (or being re-loaded with fresh configuration): the
    /// caller must canonicalize, parse, evaluate, and call
    /// [`ModuleLoader::finish_load`].
    NeedsEvaluation,
}

/// Resolves, caches and tracks the active/completed state of every module
/// reached by a compilation (C3, §4.3). One instance lives for exactly one
/// compilation (§5: "no shared mutable state across compilations").
pub struct ModuleLoader {
    importers: Vec<Rc<dyn Importer>>,
    cache: HashMap<Url, Rc<Module>>,
    active: HashSet<Url>,
    loaded_urls: HashSet<Url>,
    configs_used: HashMap<Url, Configuration>,
}

impl ModuleLoader {
    /// `root_importer` resolves the entry stylesheet's own relative loads;
    /// `additional_importers` are tried, in order, for URLs the root
    /// importer doesn't recognize (§6 `additional_importers`).
    pub fn new(root_importer: Rc<dyn Importer>, additional_importers: Vec<Rc<dyn Importer>>) -> Self {
        let mut importers = vec![root_importer];
        importers.extend(additional_importers);
        Self {
            importers,
            cache: HashMap::new(),
            active: HashSet::new(),
            loaded_urls: HashSet::new(),
            configs_used: HashMap::new(),
        }
    }

    /// Canonicalizes `url` against `base_url` by asking each importer in
    /// turn, preferring the importer that resolved the current file (if
    /// it's in the list and recognizes this URL) before falling through to
    /// the rest (§6 `canonicalize`).
    pub fn canonicalize(
        &self,
        url: &str,
        preferred: Option<&Rc<dyn Importer>>,
        base_url: Option<&Url>,
        for_import: bool,
    ) -> Option<(Rc<dyn Importer>, Url)> {
        if let Some(importer) = preferred {
            if let Some(canonical) = importer.canonicalize(url, base_url, for_import) {
                return Some((importer.clone(), canonical));
            }
        }
        for importer in &self.importers {
            if let Some(canonical) = importer.canonicalize(url, base_url, for_import) {
                return Some((importer.clone(), canonical));
            }
        }
        None
    }

    pub fn import(&self, importer: &Rc<dyn Importer>, canonical: &Url) -> SassResult<Option<ImportedSource>> {
        importer.import_canonical(canonical)
    }

    pub fn humanize(&self, importer: &Rc<dyn Importer>, canonical: &Url) -> String {
        importer.humanize(canonical)
    }

    /// §4.3 algorithm steps 1-4: records `canonical` as loaded regardless
    /// of outcome (so a watcher can re-trigger on it later even if this
    /// load fails), rejects circular loads, and decides whether a cached
    /// module can be reused given `configuration`.
    pub fn start_load(
        &mut self,
        canonical: &Url,
        span: &Span,
        configuration: &Configuration,
    ) -> SassResult<LoadOutcome> {
        self.loaded_urls.insert(canonical.clone());

        if is_builtin_url(canonical.as_str()) {
            if !configuration.is_empty() {
                return Err(SassError::BuiltInConfigured { span: span.clone() });
            }
            return Ok(LoadOutcome::BuiltIn);
        }

        if self.active.contains(canonical) {
            return Err(SassError::ModuleLoop {
                url: canonical.to_string(),
                span: span.clone(),
            });
        }

        if let Some(module) = self.cache.get(canonical) {
            if !configuration.is_empty() {
                let prior = self.configs_used.get(canonical).cloned().unwrap_or_default();
                if !prior.structurally_equals(configuration) {
                    return Err(SassError::AlreadyLoaded {
                        url: canonical.to_string(),
                        span: span.clone(),
                    });
                }
            }
            return Ok(LoadOutcome::Cached(module.clone()));
        }

        self.active.insert(canonical.clone());
        if !configuration.is_empty() {
            self.configs_used.insert(canonical.clone(), configuration.clone());
        }
        Ok(LoadOutcome::NeedsEvaluation)
    }

    pub fn finish_load(&mut self, canonical: &Url, module: Rc<Module>) {
        self.active.remove(canonical);
        self.cache.insert(canonical.clone(), module);
    }

    /// Called when evaluation of `canonical` raised an error, so the URL
    /// no longer appears "active" (letting a *different* later load of the
    /// same URL proceed, e.g. after the top-level `compile` call reports
    /// the error and a caller retries).
    pub fn fail_load(&mut self, canonical: &Url) {
        self.active.remove(canonical);
    }

    pub fn loaded_urls(&self) -> impl Iterator<Item = &Url> {
        self.loaded_urls.iter()
    }

    pub fn is_evaluated(&self, canonical: &Url) -> bool {
        self.cache.contains_key(canonical)
    }
}
