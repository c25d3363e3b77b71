use sass_css::MediaQuery;
use sass_diagnostics::Span;
use sass_selectors::{SelectorList, SimpleSelector};

/// One `@extend` registration: `extender { @extend target }` (§4.5, §3
/// "Extender state" — the append-only extension list).
#[derive(Debug, Clone)]
pub struct Extension {
    pub target: SimpleSelector,
    pub extender: SelectorList,
    pub span: Span,
    pub media: Vec<MediaQuery>,
    /// Suppresses `UnsatisfiedExtension` when the target never matches.
    pub optional: bool,
}

/// Whether `ext_media` may extend a rule registered under `target_media`.
/// An extension only applies where its media context is at least as broad
/// as the target's: an unconditional extend (`ext_media` empty) reaches
/// everywhere, but an extend scoped to `@media` can't reach an
/// unconditionally-emitted rule, and two differently-scoped media contexts
/// are treated as disjoint rather than attempting the full feature-query
/// partial order — an unrepresentable merge is a drop, per the source's
/// documented behaviour.
pub fn media_permits(ext_media: &[MediaQuery], target_media: &[MediaQuery]) -> bool {
    if ext_media.is_empty() {
        return true;
    }
    if target_media.is_empty() {
        return false;
    }
    ext_media == target_media
}
