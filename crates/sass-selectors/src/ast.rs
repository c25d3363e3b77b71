use std::fmt;

/// One of `>`, `+`, `~`, or the descendant combinator (plain whitespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    FollowingSibling,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::NextSibling => "+",
            Combinator::FollowingSibling => "~",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute-selector operator, `[name op value]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    Equal,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl AttributeOperator {
    fn as_str(self) -> &'static str {
        match self {
            AttributeOperator::Equal => "=",
            AttributeOperator::Includes => "~=",
            AttributeOperator::DashMatch => "|=",
            AttributeOperator::Prefix => "^=",
            AttributeOperator::Suffix => "$=",
            AttributeOperator::Substring => "*=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub namespace: Option<String>,
    pub name: String,
    /// `None` for a bare `[name]` existence check.
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
    /// `i` or `s` modifier, e.g. `[attr=val i]`.
    pub modifier: Option<char>,
}

/// A single simple selector, the atoms a [`CompoundSelector`] is built from
/// (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Class(String),
    Id(String),
    Attribute(AttributeSelector),
    /// `%name`, never emitted — only ever an `@extend` target.
    Placeholder(String),
    /// `:name`, `:name(argument)`, or `::name` when `is_element` is set. The
    /// nested selector list covers functional pseudo-classes like `:is(...)`
    /// and `:not(...)` whose argument is itself a selector list.
    Pseudo {
        name: String,
        is_element: bool,
        argument: Option<String>,
        selector: Option<SelectorList>,
    },
    /// `&`, optionally with a directly-appended suffix such as `&-foo`.
    Parent(Option<String>),
}

impl SimpleSelector {
    pub fn is_invisible(&self) -> bool {
        match self {
            SimpleSelector::Placeholder(_) => true,
            SimpleSelector::Pseudo {
                selector: Some(list),
                ..
            } => list.is_invisible(),
            _ => false,
        }
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Universal => f.write_str("*"),
            SimpleSelector::Type(name) => f.write_str(name),
            SimpleSelector::Class(name) => write!(f, ".{name}"),
            SimpleSelector::Id(name) => write!(f, "#{name}"),
            SimpleSelector::Placeholder(name) => write!(f, "%{name}"),
            SimpleSelector::Parent(suffix) => {
                f.write_str("&")?;
                if let Some(s) = suffix {
                    f.write_str(s)?;
                }
                Ok(())
            }
            SimpleSelector::Attribute(attr) => {
                f.write_str("[")?;
                if let Some(ns) = &attr.namespace {
                    write!(f, "{ns}|")?;
                }
                f.write_str(&attr.name)?;
                if let (Some(op), Some(value)) = (attr.operator, &attr.value) {
                    write!(f, "{}\"{}\"", op.as_str(), value)?;
                }
                if let Some(m) = attr.modifier {
                    write!(f, " {m}")?;
                }
                f.write_str("]")
            }
            SimpleSelector::Pseudo {
                name,
                is_element,
                argument,
                selector,
            } => {
                f.write_str(if *is_element { "::" } else { ":" })?;
                f.write_str(name)?;
                if let Some(list) = selector {
                    write!(f, "({list})")?;
                } else if let Some(arg) = argument {
                    write!(f, "({arg})")?;
                }
                Ok(())
            }
        }
    }
}

/// An ordered list of simple selectors with no combinator between them,
/// e.g. `a.foo#bar`. An empty compound renders as `*` (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn new(simples: Vec<SimpleSelector>) -> Self {
        Self { simples }
    }

    pub fn contains(&self, simple: &SimpleSelector) -> bool {
        self.simples.contains(simple)
    }

    pub fn is_invisible(&self) -> bool {
        self.simples.iter().any(SimpleSelector::is_invisible)
    }

    /// Swaps every occurrence of `target` for the simples of `replacement`,
    /// preserving the position and interleaving the rest of the compound.
    pub fn replacing(&self, target: &SimpleSelector, replacement: &[SimpleSelector]) -> CompoundSelector {
        let mut simples = Vec::with_capacity(self.simples.len());
        for s in &self.simples {
            if s == target {
                simples.extend(replacement.iter().cloned());
            } else {
                simples.push(s.clone());
            }
        }
        CompoundSelector::new(simples)
    }

    /// This compound with `target` removed, used as the basis for weaving an
    /// extender in (§4.5: `weave(K\{t}, E)`).
    pub fn without(&self, target: &SimpleSelector) -> CompoundSelector {
        CompoundSelector::new(self.simples.iter().filter(|s| *s != target).cloned().collect())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.simples.is_empty() {
            return f.write_str("*");
        }
        for s in &self.simples {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// One element of a [`ComplexSelector`]'s sequence: either a compound
/// selector or a combinator joining it to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexComponent {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A sequence of compounds and combinators, e.g. `a.foo > b ~ c` (§3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub components: Vec<ComplexComponent>,
}

impl ComplexSelector {
    pub fn new(components: Vec<ComplexComponent>) -> Self {
        Self { components }
    }

    pub fn compound_at(&self, index: usize) -> Option<&CompoundSelector> {
        match self.components.get(index) {
            Some(ComplexComponent::Compound(c)) => Some(c),
            _ => None,
        }
    }

    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        self.components.iter().filter_map(|c| match c {
            ComplexComponent::Compound(compound) => Some(compound),
            ComplexComponent::Combinator(_) => None,
        })
    }

    pub fn contains_parent(&self) -> bool {
        self.compounds()
            .any(|c| c.simples.iter().any(|s| matches!(s, SimpleSelector::Parent(_))))
    }

    pub fn is_invisible(&self) -> bool {
        self.compounds().any(CompoundSelector::is_invisible)
    }

    /// Replaces every `&` in this selector with `parent`, per the parent
    /// resolution rule (§4.4 style-rule handling). A `&` with a suffix
    /// (e.g. `&-foo`) is resolved against each trailing compound of
    /// `parent` by appending the suffix to its last simple selector; a bare
    /// `&` splices `parent`'s whole component sequence in place.
    pub fn resolve_parent(&self, parent: &ComplexSelector) -> Vec<ComplexSelector> {
        if !self.contains_parent() {
            let mut joined = parent.components.clone();
            joined.push(ComplexComponent::Combinator(Combinator::Descendant));
            joined.extend(self.components.iter().cloned());
            return vec![ComplexSelector::new(joined)];
        }

        let mut components = Vec::new();
        for component in &self.components {
            match component {
                ComplexComponent::Combinator(c) => components.push(ComplexComponent::Combinator(*c)),
                ComplexComponent::Compound(compound) => {
                    let has_parent = compound
                        .simples
                        .iter()
                        .any(|s| matches!(s, SimpleSelector::Parent(_)));
                    if !has_parent {
                        components.push(ComplexComponent::Compound(compound.clone()));
                        continue;
                    }
                    let mut expanded = Vec::new();
                    for simple in &compound.simples {
                        match simple {
                            SimpleSelector::Parent(suffix) => {
                                expanded.extend(Self::splice_parent(parent, suffix.as_deref()));
                            }
                            other => expanded.push(other.clone()),
                        }
                    }
                    components.extend(expanded.into_iter().map(ComplexComponent::Compound));
                }
            }
        }
        vec![ComplexSelector::new(components)]
    }

    fn splice_parent(parent: &ComplexSelector, suffix: Option<&str>) -> Vec<CompoundSelector> {
        let mut compounds: Vec<CompoundSelector> = parent.compounds().cloned().collect();
        if let Some(suffix) = suffix {
            if let Some(last) = compounds.last_mut() {
                if let Some(SimpleSelector::Type(name) | SimpleSelector::Class(name)) =
                    last.simples.last_mut()
                {
                    name.push_str(suffix);
                } else {
                    last.simples.push(SimpleSelector::Type(suffix.to_string()));
                }
            } else {
                compounds.push(CompoundSelector::new(vec![SimpleSelector::Type(suffix.to_string())]));
            }
        }
        compounds
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            match component {
                ComplexComponent::Compound(c) => write!(f, "{c}")?,
                ComplexComponent::Combinator(Combinator::Descendant) => {
                    if i != 0 {
                        f.write_str(" ")?;
                    }
                }
                ComplexComponent::Combinator(c) => write!(f, " {c} ")?,
            }
        }
        Ok(())
    }
}

/// A comma-separated list of complex selectors, the root selector type
/// parsed from a style rule's header (§3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub complexes: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn new(complexes: Vec<ComplexSelector>) -> Self {
        Self { complexes }
    }

    pub fn is_invisible(&self) -> bool {
        !self.complexes.is_empty() && self.complexes.iter().all(ComplexSelector::is_invisible)
    }

    /// Resolves every `&` in every branch of this list against `parent`,
    /// producing the cross product of resolutions.
    pub fn resolve_parent(&self, parent: &SelectorList) -> SelectorList {
        let mut complexes = Vec::new();
        for complex in &self.complexes {
            if parent.complexes.is_empty() {
                complexes.push(complex.clone());
                continue;
            }
            for p in &parent.complexes {
                complexes.extend(complex.resolve_parent(p));
            }
        }
        SelectorList::new(complexes)
    }

    /// Per the `@extend` rule (§4.4): the target selector must be a single
    /// simple selector, i.e. exactly one complex selector containing
    /// exactly one compound containing exactly one simple.
    pub fn as_single_simple(&self) -> Option<&SimpleSelector> {
        if self.complexes.len() != 1 {
            return None;
        }
        let complex = &self.complexes[0];
        if complex.components.len() != 1 {
            return None;
        }
        let compound = complex.compound_at(0)?;
        if compound.simples.len() != 1 {
            return None;
        }
        Some(&compound.simples[0])
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.complexes.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}
