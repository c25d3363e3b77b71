use sass_css::MediaQuery;
use sass_diagnostics::{SassError, SassResult, Span};
use sass_selectors::{ComplexComponent, ComplexSelector, SelectorList};

use crate::extension::{media_permits, Extension};
use crate::weave::weave;

/// Handle to a selector list registered with an [`ExtensionStore`], returned
/// by [`ExtensionStore::add_selector`] so the evaluator can later read back
/// the (possibly rewritten) list for the style rule it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorHandle(usize);

struct RegisteredSelector {
    list: SelectorList,
    media: Vec<MediaQuery>,
}

/// Per-module `@extend` state: the append-only extension list plus the
/// style-rule selectors registered against it (§3 "Extender state", §4.5).
#[derive(Default)]
pub struct ExtensionStore {
    extensions: Vec<Extension>,
    selectors: Vec<RegisteredSelector>,
}

impl ExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a style rule's resolved selector list so future
    /// extensions can rewrite it in place.
    pub fn add_selector(&mut self, list: SelectorList, active_media: Vec<MediaQuery>) -> SelectorHandle {
        let handle = SelectorHandle(self.selectors.len());
        self.selectors.push(RegisteredSelector {
            list,
            media: active_media,
        });
        handle
    }

    pub fn selector(&self, handle: SelectorHandle) -> &SelectorList {
        &self.selectors[handle.0].list
    }

    /// Registers `extender { @extend target }` and immediately rewrites
    /// every already-registered selector it applies to (§4.5).
    pub fn add_extension(
        &mut self,
        extender: SelectorList,
        target: sass_selectors::SimpleSelector,
        source_span: Span,
        media: Vec<MediaQuery>,
        optional: bool,
    ) {
        let extension = Extension {
            target,
            extender,
            span: source_span,
            media,
            optional,
        };
        self.rewrite_with(&extension);
        self.extensions.push(extension);
    }

    /// Absorbs another module's extensions — used when a `@forward`ed or
    /// `@use`d module's extends must also apply to this module's rules —
    /// then re-runs the rewrite against this store's own selectors.
    pub fn add_extensions(&mut self, other: ExtensionStore) {
        for extension in other.extensions {
            self.rewrite_with(&extension);
            self.extensions.push(extension);
        }
    }

    /// Same as [`Self::add_extensions`] but takes its source by reference,
    /// for absorbing a `@use`d module's extensions out of the `Rc` the
    /// module cache hands back to every dependent.
    pub fn absorb(&mut self, other: &ExtensionStore) {
        for extension in &other.extensions {
            self.rewrite_with(extension);
            self.extensions.push(extension.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    fn rewrite_with(&mut self, extension: &Extension) {
        for entry in &mut self.selectors {
            if !media_permits(&extension.media, &entry.media) {
                continue;
            }
            entry.list = rewrite_list(&entry.list, extension);
        }
    }

    /// Validates every non-optional extension actually matched something,
    /// per the `UnsatisfiedExtension` rule (§4.5, §5).
    pub fn check_unsatisfied(&self) -> SassResult<()> {
        for extension in &self.extensions {
            if extension.optional {
                continue;
            }
            let matched = self
                .selectors
                .iter()
                .any(|entry| selector_contains(&entry.list, &extension.target));
            if !matched {
                return Err(SassError::ExtendTarget {
                    message: format!("\"{}\" failed to extend anything", extension.target),
                    span: extension.span.clone(),
                });
            }
        }
        Ok(())
    }
}

fn selector_contains(list: &SelectorList, target: &sass_selectors::SimpleSelector) -> bool {
    list.complexes
        .iter()
        .flat_map(|c| c.compounds())
        .any(|compound| compound.contains(target))
}

/// Rewrites every complex selector in `list` that contains `extension`'s
/// target, adding one alternative branch per extender complex selector
/// while keeping the original branch (extension is additive, §8 property 4).
fn rewrite_list(list: &SelectorList, extension: &Extension) -> SelectorList {
    let mut complexes = Vec::with_capacity(list.complexes.len());
    for complex in &list.complexes {
        complexes.push(complex.clone());
        for woven in woven_alternatives(complex, extension) {
            if !complexes.contains(&woven) {
                complexes.push(woven);
            }
        }
    }
    SelectorList::new(complexes)
}

fn woven_alternatives(complex: &ComplexSelector, extension: &Extension) -> Vec<ComplexSelector> {
    let mut out = Vec::new();
    for (index, component) in complex.components.iter().enumerate() {
        let ComplexComponent::Compound(compound) = component else {
            continue;
        };
        if !compound.contains(&extension.target) {
            continue;
        }
        let remainder = compound.without(&extension.target);
        for extender in &extension.extender.complexes {
            if extender.contains_parent() {
                continue;
            }
            let woven = weave(&remainder, extender);
            let mut components = complex.components[..index].to_vec();
            components.extend(woven.components.iter().cloned());
            components.extend(complex.components[index + 1..].iter().cloned());
            out.push(ComplexSelector::new(components));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_diagnostics::SourceFile;
    use sass_selectors::{CompoundSelector, SimpleSelector};

    fn span() -> Span {
        Span::point(SourceFile::new(None, ""), 0)
    }

    fn single(name: &str) -> SelectorList {
        SelectorList::new(vec![ComplexSelector::new(vec![ComplexComponent::Compound(
            CompoundSelector::new(vec![SimpleSelector::Class(name.to_string())]),
        )])])
    }

    #[test]
    fn extending_adds_an_alternative_branch_and_keeps_the_original() {
        let mut store = ExtensionStore::new();
        let handle = store.add_selector(single("a"), Vec::new());
        store.add_extension(single("b"), SimpleSelector::Class("a".to_string()), span(), Vec::new(), false);

        let rewritten = store.selector(handle);
        assert_eq!(rewritten.complexes.len(), 2);
        assert_eq!(rewritten.complexes[0].to_string(), ".a");
        assert_eq!(rewritten.complexes[1].to_string(), ".b");
    }

    #[test]
    fn extending_a_compound_with_other_simples_merges_into_the_remainder() {
        let mut store = ExtensionStore::new();
        let target_list = SelectorList::new(vec![ComplexSelector::new(vec![ComplexComponent::Compound(
            CompoundSelector::new(vec![
                SimpleSelector::Class("a".to_string()),
                SimpleSelector::Class("c".to_string()),
            ]),
        )])]);
        let handle = store.add_selector(target_list, Vec::new());
        store.add_extension(single("b"), SimpleSelector::Class("a".to_string()), span(), Vec::new(), false);

        let rewritten = store.selector(handle);
        assert_eq!(rewritten.complexes.len(), 2);
        assert_eq!(rewritten.complexes[1].to_string(), ".c.b");
    }

    #[test]
    fn unsatisfied_non_optional_extension_is_an_error() {
        let mut store = ExtensionStore::new();
        store.add_selector(single("z"), Vec::new());
        store.add_extension(single("b"), SimpleSelector::Class("never-present".to_string()), span(), Vec::new(), false);
        assert!(store.check_unsatisfied().is_err());
    }

    #[test]
    fn optional_extension_does_not_require_a_match() {
        let mut store = ExtensionStore::new();
        store.add_selector(single("z"), Vec::new());
        store.add_extension(single("b"), SimpleSelector::Class("never-present".to_string()), span(), Vec::new(), true);
        assert!(store.check_unsatisfied().is_ok());
    }
}
