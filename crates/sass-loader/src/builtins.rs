/// The canonical URLs of the built-in modules (§4.3 step 1). Their
/// function/mixin bodies are an external collaborator (§1); this crate
/// only needs to recognize the URLs so it can reject configuration
/// (`BuiltInConfigured`) and skip the loader pipeline for them.
pub const BUILTIN_MODULE_URLS: &[&str] = &[
    "sass:math",
    "sass:color",
    "sass:list",
    "sass:map",
    "sass:meta",
    "sass:string",
    "sass:selector",
];

pub fn is_builtin_url(url: &str) -> bool {
    BUILTIN_MODULE_URLS.contains(&url)
}
