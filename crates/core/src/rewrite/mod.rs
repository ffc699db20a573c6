//! Conditional rewriting of a structure against an environment.
//!
//! Four marker shapes are recognised:
//!
//! - `[%%IFDEF X]` / `[%%ELSE]` / `[%%END]` items open, flip and close a
//!   block; items inside a block whose condition fails become placeholders
//!   ([`items`]).
//! - `[%GETENV X]` expressions become the string value of `X` ([`expr`]).
//! - `[@IFDEF X]` / `[@IFNDEF X]` on variant constructors keep or drop the
//!   constructor ([`variants`]).
//! - `when [%IFDEF X]` guards keep a match case unconditionally or drop it
//!   ([`expr`]).
//!
//! A key counts as defined when its resolved value is non-empty.

mod expr;
mod items;
mod keys;
mod variants;

use crate::ast::{Expr, ExprKind, Loc, Structure};
use crate::env::{self, Environment};
use crate::error::{Error, Result};
use crate::stack::UnterminatedPolicy;
use serde::{Deserialize, Serialize};

pub use keys::referenced_keys;

pub const IFDEF: &str = "IFDEF";
pub const IFNDEF: &str = "IFNDEF";
pub const ELSE: &str = "ELSE";
pub const END: &str = "END";
pub const GETENV: &str = "GETENV";

/// Knobs for a rewrite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteOptions {
    /// What to do with an `IFDEF` that is still open when its structure ends.
    pub unterminated: UnterminatedPolicy,
    /// Keep the `Empty` placeholders that stand in for directives and
    /// suppressed items. When false they are removed from every structure.
    pub keep_placeholders: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            unterminated: UnterminatedPolicy::Error,
            keep_placeholders: true,
        }
    }
}

/// One rewrite run. Holds only borrowed, read-only context; all
/// conditional state is threaded through the traversal explicitly.
pub struct Rewriter<'e> {
    env: &'e dyn Environment,
    options: RewriteOptions,
}

impl<'e> Rewriter<'e> {
    pub fn new(env: &'e dyn Environment, options: RewriteOptions) -> Self {
        Rewriter { env, options }
    }

    /// The key named by a marker payload; `directive` and `loc` identify the
    /// marker for diagnostics.
    fn key<'p>(&self, payload: Option<&'p Expr>, directive: &str, loc: &Loc) -> Result<&'p str> {
        bare_identifier(payload).ok_or_else(|| Error::MalformedArgument {
            loc: loc.clone(),
            directive: directive.to_owned(),
        })
    }

    fn resolve(&self, payload: Option<&Expr>, directive: &str, loc: &Loc) -> Result<String> {
        let key = self.key(payload, directive, loc)?;
        let value = env::resolve(self.env, key);
        log::trace!("{}: {} {} resolved to {:?}", loc, directive, key, value);
        Ok(value)
    }

    fn is_defined(&self, payload: Option<&Expr>, directive: &str, loc: &Loc) -> Result<bool> {
        let key = self.key(payload, directive, loc)?;
        let defined = env::is_defined(self.env, key);
        log::trace!("{}: {} {} defined: {}", loc, directive, key, defined);
        Ok(defined)
    }
}

/// The environment key named by a directive argument: a single unqualified
/// identifier with nothing applied to it.
pub(crate) fn bare_identifier(payload: Option<&Expr>) -> Option<&str> {
    let name = match &payload?.kind {
        ExprKind::Ident(name) => name,
        ExprKind::Construct { name, arg: None } => name,
        _ => return None,
    };
    if name.is_empty() || name.contains('.') {
        return None;
    }
    Some(name)
}

/// Rewrite a whole structure.
pub fn rewrite_structure(
    items: Structure,
    env: &dyn Environment,
    options: &RewriteOptions,
) -> Result<Structure> {
    Rewriter::new(env, options.clone()).structure(items)
}

/// Rewrite a single expression: `GETENV` substitution and guard filtering.
pub fn rewrite_expr(expr: Expr, env: &dyn Environment) -> Result<Expr> {
    Rewriter::new(env, RewriteOptions::default()).expr(expr)
}
