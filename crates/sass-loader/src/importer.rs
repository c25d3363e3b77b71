use sass_ast::Syntax;
use sass_diagnostics::SassResult;
use url::Url;

/// The text an importer hands back for a canonical URL it previously
/// resolved (§6 "Importer interface").
#[derive(Debug, Clone)]
pub struct ImportedSource {
    pub text: String,
    pub syntax: Syntax,
}

/// The file-I/O and URL-canonicalization boundary (§1, §6): everything
/// this core needs from "the filesystem" goes through here, so the
/// evaluator and loader stay synchronous and allocation-free of any real
/// I/O concern.
pub trait Importer {
    /// Resolves `url` (written at `base_url`, if any) to a canonical URL
    /// this importer claims ownership of, or `None` if it doesn't
    /// recognize it. `for_import` distinguishes a legacy `@import` load,
    /// which some importers resolve slightly differently (e.g. allowing a
    /// plain-CSS `.css` extension to stay literal).
    fn canonicalize(&self, url: &str, base_url: Option<&Url>, for_import: bool) -> Option<Url>;

    /// Loads the stylesheet text this importer previously canonicalized.
    /// Returning `Ok(None)` for a URL this importer did canonicalize is an
    /// internal error in the importer; callers treat it as "not found".
    fn import_canonical(&self, canonical_url: &Url) -> SassResult<Option<ImportedSource>>;

    /// A human-friendly rendering of `canonical_url` for diagnostics.
    fn humanize(&self, canonical_url: &Url) -> String {
        canonical_url.to_string()
    }
}
