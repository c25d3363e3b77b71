use sass_diagnostics::Span;

use crate::expression::{ArgumentDeclaration, CallArguments, Expression};
use crate::interpolation::Interpolation;

/// Flags on a `$name: value` assignment (§9 supplement C.5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableFlags {
    pub default: bool,
    pub global: bool,
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub namespace: Option<String>,
    pub value: Expression,
    pub flags: VariableFlags,
    pub span: Span,
}

/// `name: value` inside a style rule or at the top of a module (a "plain
/// CSS" declaration once evaluated). Nested declarations (`x: { y: z }`)
/// are represented as a `Declaration` whose `children` is non-empty.
#[derive(Debug, Clone)]
pub struct DeclarationStmt {
    pub name: Interpolation,
    pub value: Option<Expression>,
    pub important: bool,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StyleRuleStmt {
    pub selector: Interpolation,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MediaRuleStmt {
    pub query: Interpolation,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SupportsRuleStmt {
    pub condition: Interpolation,
    pub children: Vec<Statement>,
    pub span: Span,
}

/// Any at-rule this crate doesn't need to specially understand, e.g.
/// `@font-face`, `@page`, `@-webkit-keyframes` when its selectors are
/// left opaque. `@keyframes` bodies are handled by [`Statement::Keyframes`]
/// instead, which does understand its selector grammar.
#[derive(Debug, Clone)]
pub struct UnknownAtRuleStmt {
    pub name: String,
    pub value: Option<Interpolation>,
    pub children: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct KeyframesStmt {
    pub name: String,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct KeyframeBlockStmt {
    pub selector_text: String,
    pub children: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfClause {
    pub condition: Option<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub clauses: Vec<IfClause>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EachStmt {
    pub variables: Vec<String>,
    pub list: Expression,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub variable: String,
    pub from: Expression,
    pub to: Expression,
    pub inclusive: bool,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDeclStmt {
    pub name: String,
    pub arguments: ArgumentDeclaration,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MixinDeclStmt {
    pub name: String,
    pub arguments: ArgumentDeclaration,
    pub body: Vec<Statement>,
    /// Whether the body contains a `@content` statement, so `@include`
    /// can reject a content block passed to a mixin that never uses one.
    pub accepts_content: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IncludeStmt {
    pub name: String,
    pub namespace: Option<String>,
    pub arguments: CallArguments,
    pub content_arguments: Option<ArgumentDeclaration>,
    pub content_block: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExtendStmt {
    pub selector: Interpolation,
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AtRootStmt {
    pub query: Option<Interpolation>,
    pub children: Vec<Statement>,
    pub span: Span,
}

/// One `name => alias` style rename in a `@forward ... as` clause, or a
/// `show`/`hide` filter entry.
#[derive(Debug, Clone, Default)]
pub struct ForwardFilter {
    pub show: Option<Vec<String>>,
    pub hide: Option<Vec<String>>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfiguredVariable {
    pub name: String,
    pub value: Expression,
    pub guarded: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UseStmt {
    pub url: String,
    pub namespace: Option<String>,
    /// `true` for `@use "..." as *`.
    pub star_namespace: bool,
    pub configuration: Vec<ConfiguredVariable>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForwardStmt {
    pub url: String,
    pub filter: ForwardFilter,
    pub configuration: Vec<ConfiguredVariable>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportArgument {
    pub url: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub imports: Vec<ImportArgument>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LoudCommentStmt {
    pub text: Interpolation,
    pub span: Span,
}

/// A statement of the Sass source AST, as produced by the external parser
/// described in §6 and walked by the Evaluator (C1, §4.4).
#[derive(Debug, Clone)]
pub enum Statement {
    VariableDecl(VariableDecl),
    Declaration(DeclarationStmt),
    StyleRule(StyleRuleStmt),
    MediaRule(MediaRuleStmt),
    SupportsRule(SupportsRuleStmt),
    UnknownAtRule(UnknownAtRuleStmt),
    Keyframes(KeyframesStmt),
    KeyframeBlock(KeyframeBlockStmt),
    If(IfStmt),
    Each(EachStmt),
    For(ForStmt),
    While(WhileStmt),
    FunctionDecl(FunctionDeclStmt),
    MixinDecl(MixinDeclStmt),
    Include(IncludeStmt),
    Content(Span),
    Return(ReturnStmt),
    Extend(ExtendStmt),
    AtRoot(AtRootStmt),
    Use(UseStmt),
    Forward(ForwardStmt),
    Import(ImportStmt),
    Debug(Expression, Span),
    Warn(Expression, Span),
    Error(Expression, Span),
    LoudComment(LoudCommentStmt),
    SilentComment(Span),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::VariableDecl(s) => &s.span,
            Statement::Declaration(s) => &s.span,
            Statement::StyleRule(s) => &s.span,
            Statement::MediaRule(s) => &s.span,
            Statement::SupportsRule(s) => &s.span,
            Statement::UnknownAtRule(s) => &s.span,
            Statement::Keyframes(s) => &s.span,
            Statement::KeyframeBlock(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::Each(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::FunctionDecl(s) => &s.span,
            Statement::MixinDecl(s) => &s.span,
            Statement::Include(s) => &s.span,
            Statement::Content(span) => span,
            Statement::Return(s) => &s.span,
            Statement::Extend(s) => &s.span,
            Statement::AtRoot(s) => &s.span,
            Statement::Use(s) => &s.span,
            Statement::Forward(s) => &s.span,
            Statement::Import(s) => &s.span,
            Statement::Debug(_, span) | Statement::Warn(_, span) | Statement::Error(_, span) => span,
            Statement::LoudComment(s) => &s.span,
            Statement::SilentComment(span) => span,
        }
    }
}

/// The parsed form of one stylesheet, as returned by the external
/// `parse_stylesheet` function (§6). `pre_module_comments` holds loud
/// comments that precede any `@use`/`@forward` (they're hoisted ahead of
/// the module's own CSS output, per the `Module` data model in §3).
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Scss,
    Sass,
    Css,
}
