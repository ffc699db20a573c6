//! Read -> parse -> rewrite, in one call.
//!
//! Thin orchestration over [`crate::lexer`], [`crate::parser`] and
//! [`crate::rewrite`]. Files ending in `.json` are decoded as interchange
//! trees instead of being parsed.

use crate::ast::Structure;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::lexer;
use crate::parser;
use crate::rewrite::{self, RewriteOptions};
use std::path::Path;

/// Lex and parse surface syntax.
pub fn parse_source(src: &str, filename: &str) -> Result<Structure> {
    let tokens = lexer::lex(src, filename)?;
    parser::parse(&tokens, filename)
}

/// Decode an interchange JSON tree.
pub fn decode_json(src: &str, filename: &str) -> Result<Structure> {
    serde_json::from_str(src).map_err(|source| Error::Json {
        path: filename.to_owned(),
        source,
    })
}

pub fn is_json_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

/// Load a tree from disk, choosing the decoder by file extension.
pub fn load_tree(path: &Path) -> Result<Structure> {
    let filename = path.to_string_lossy();
    let src = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: filename.to_string(),
        source,
    })?;
    log::debug!("loaded {} ({} bytes)", filename, src.len());
    if is_json_path(path) {
        decode_json(&src, &filename)
    } else {
        parse_source(&src, &filename)
    }
}

pub fn rewrite_source(
    src: &str,
    filename: &str,
    env: &dyn Environment,
    options: &RewriteOptions,
) -> Result<Structure> {
    let items = parse_source(src, filename)?;
    rewrite::rewrite_structure(items, env, options)
}

/// Load `path` and rewrite it; what `envcond rewrite` runs.
pub fn rewrite_file(
    path: &Path,
    env: &dyn Environment,
    options: &RewriteOptions,
) -> Result<Structure> {
    let items = load_tree(path)?;
    rewrite::rewrite_structure(items, env, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ItemKind;
    use crate::env::MapEnvironment;
    use crate::ast::without_locs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn json_and_source_load_to_the_same_tree() {
        let tmp = TempDir::new().unwrap();
        let src = "let x = [%GETENV HOME]\n";
        let ml = tmp.path().join("m.ml");
        fs::write(&ml, src).unwrap();
        let json = tmp.path().join("m.json");
        fs::write(&json, serde_json::to_string(&load_tree(&ml).unwrap()).unwrap()).unwrap();

        let a = load_tree(&ml).unwrap();
        let b = load_tree(&json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rewrite_file_reads_and_rewrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.ml");
        fs::write(&path, "[%%IFDEF FAST]\nlet speed = 2\n[%%ELSE]\nlet speed = 1\n[%%END]\n").unwrap();
        let options = RewriteOptions {
            keep_placeholders: false,
            ..RewriteOptions::default()
        };
        let env = MapEnvironment::new().with("FAST", "yes");
        let out = rewrite_file(&path, &env, &options).unwrap();
        let want = parse_source("let speed = 2", "want.ml").unwrap();
        assert_eq!(without_locs(&out), without_locs(&want));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_tree(&tmp.path().join("nope.ml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn bad_json_is_reported_with_path() {
        let err = decode_json("{\"not\": \"a tree\"}", "t.json").unwrap_err();
        assert!(err.to_string().starts_with("t.json: invalid tree"));
    }

    #[test]
    fn rewrite_source_end_to_end() {
        let env = MapEnvironment::new().with("USER", "ada");
        let out = rewrite_source(
            "let u = [%GETENV USER]",
            "u.ml",
            &env,
            &RewriteOptions::default(),
        )
        .unwrap();
        match &out[0].kind {
            ItemKind::Let { body, .. } => {
                assert_eq!(body.kind, crate::ast::ExprKind::Str("ada".into()))
            }
            other => panic!("expected let, got {:?}", other),
        }
    }
}
