//! The Sass source statement/expression AST (§3 "Data model") plus the
//! external source-parser interface (§6). Parsing Sass syntax itself is
//! out of scope (§1) — this crate only defines the shape such a parser
//! produces, so the evaluator (`sass-eval`) can walk it.

mod expression;
mod interpolation;
mod parser_interface;
mod statement;

pub use expression::{
    ArgumentDeclaration, ArgumentSpec, BinaryOp, CallArguments, Expression, UnaryOp,
};
pub use interpolation::{EvaluatedInterpolation, Interpolation, InterpolationChunk};
pub use parser_interface::{NoopParser, SassParser};
pub use statement::{
    AtRootStmt, ConfiguredVariable, DeclarationStmt, EachStmt, ExtendStmt, ForStmt,
    ForwardFilter, ForwardStmt, FunctionDeclStmt, IfClause, IfStmt, ImportArgument, ImportStmt,
    IncludeStmt, KeyframeBlockStmt, KeyframesStmt, LoudCommentStmt, MediaRuleStmt, MixinDeclStmt,
    ReturnStmt, Statement, Stylesheet, StyleRuleStmt, SupportsRuleStmt, Syntax, UnknownAtRuleStmt,
    UseStmt, VariableDecl, VariableFlags,
};
