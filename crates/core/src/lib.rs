#![allow(clippy::result_large_err)]
//! envcond-core: environment-driven conditional rewriting of syntax trees.
//!
//! Source text is lexed and parsed into a [`Structure`], rewritten against an
//! [`Environment`], and printed back as source or serialized as interchange
//! JSON.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`rewrite_structure()`] -- rewrite a parsed tree
//! - [`rewrite_source()`] / [`rewrite_file()`] -- parse and rewrite in one call
//! - [`Environment`], [`ProcessEnvironment`], [`MapEnvironment`],
//!   [`LayeredEnvironment`] -- where key values come from
//! - [`RewriteOptions`] -- unterminated-block policy and placeholder handling
//! - [`Error`] -- every failure, with location and exit status
//! - AST types: [`Item`], [`ItemKind`], [`Expr`], [`ExprKind`], [`Loc`]

pub mod ast;
pub mod env;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod printer;
pub mod rewrite;
pub mod stack;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Expr, ExprKind, Item, ItemKind, Loc, Structure};
pub use env::{Environment, LayeredEnvironment, MapEnvironment, ProcessEnvironment};
pub use error::Error;
pub use rewrite::RewriteOptions;
pub use stack::{CondStack, UnterminatedPolicy};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use pipeline::{load_tree, parse_source, rewrite_file, rewrite_source};
pub use printer::print_structure;
pub use rewrite::{referenced_keys, rewrite_expr, rewrite_structure};
