use sass_selectors::{ComplexComponent, ComplexSelector, CompoundSelector, SimpleSelector};

/// Interleaves `remainder` (a compound selector with the extension target
/// already removed) into `extender`, producing the compound sequence that
/// replaces the woven compound in the output selector (§4.5).
///
/// The target simple selector is always exactly one entry of a single
/// compound — `@extend` forbids complex and multi-simple targets — so
/// `remainder` is always a single compound and there is exactly one valid
/// combinator interleaving, unlike the general weave of two arbitrary
/// complex selectors. This is a deliberate narrowing of dart-sass's weave,
/// which returns a set of orderings only when both operands carry their
/// own internal combinators.
pub fn weave(remainder: &CompoundSelector, extender: &ComplexSelector) -> ComplexSelector {
    if extender.components.is_empty() {
        return ComplexSelector::new(vec![ComplexComponent::Compound(remainder.clone())]);
    }

    let mut components = extender.components.clone();
    let last_index = components
        .iter()
        .rposition(|c| matches!(c, ComplexComponent::Compound(_)))
        .expect("a non-empty complex selector always ends in a compound");

    if let ComplexComponent::Compound(last) = &components[last_index] {
        components[last_index] = ComplexComponent::Compound(merge_compounds(last, remainder));
    }

    ComplexSelector::new(components)
}

/// Unions two compounds' simple selectors, preserving `base`'s order and
/// appending anything from `addition` not already present.
fn merge_compounds(base: &CompoundSelector, addition: &CompoundSelector) -> CompoundSelector {
    let mut simples: Vec<SimpleSelector> = base.simples.clone();
    for simple in &addition.simples {
        if !simples.contains(simple) {
            simples.push(simple.clone());
        }
    }
    CompoundSelector::new(simples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_selectors::{Combinator, SimpleSelector};

    fn compound(simples: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector::new(simples)
    }

    #[test]
    fn weaving_into_an_empty_remainder_reuses_the_extender_unchanged() {
        let extender = ComplexSelector::new(vec![ComplexComponent::Compound(compound(vec![
            SimpleSelector::Class("b".to_string()),
        ]))]);
        let woven = weave(&compound(vec![]), &extender);
        assert_eq!(woven, extender);
    }

    #[test]
    fn weaving_merges_into_the_extenders_last_compound() {
        let extender = ComplexSelector::new(vec![
            ComplexComponent::Compound(compound(vec![SimpleSelector::Class("x".to_string())])),
            ComplexComponent::Combinator(Combinator::Descendant),
            ComplexComponent::Compound(compound(vec![SimpleSelector::Class("b".to_string())])),
        ]);
        let remainder = compound(vec![SimpleSelector::Class("c".to_string())]);
        let woven = weave(&remainder, &extender);

        let last = woven.compounds().last().unwrap();
        assert!(last.simples.contains(&SimpleSelector::Class("b".to_string())));
        assert!(last.simples.contains(&SimpleSelector::Class("c".to_string())));
        assert_eq!(woven.compounds().count(), 2);
    }
}
