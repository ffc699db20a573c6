//! Environment lookup abstraction.
//!
//! The [`Environment`] trait is the only way the rewriter learns about the
//! outside world. [`ProcessEnvironment`] reads real environment variables;
//! [`MapEnvironment`] and [`LayeredEnvironment`] let tests and the CLI
//! control what is defined without touching the process.

use std::collections::BTreeMap;

/// A key→value lookup. `None` means the key is absent.
pub trait Environment {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Resolve `key`, collapsing absence to the empty string.
///
/// Downstream predicates cannot tell "unset" from "set to empty": a key is
/// defined exactly when this returns a non-empty string.
pub fn resolve(env: &dyn Environment, key: &str) -> String {
    env.lookup(key).unwrap_or_default()
}

pub fn is_defined(env: &dyn Environment, key: &str) -> bool {
    !resolve(env, key).is_empty()
}

/// Reads `std::env`. Values that are not valid unicode count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: BTreeMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MapEnvironment {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Explicit defines and undefines layered over a base environment.
///
/// An override of `Some(value)` defines the key, `None` hides it; keys
/// without an override fall through to the base.
pub struct LayeredEnvironment<'a> {
    overrides: BTreeMap<String, Option<String>>,
    base: &'a dyn Environment,
}

impl<'a> LayeredEnvironment<'a> {
    pub fn new(base: &'a dyn Environment) -> Self {
        LayeredEnvironment {
            overrides: BTreeMap::new(),
            base,
        }
    }

    pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(key.into(), Some(value.into()));
    }

    pub fn undefine(&mut self, key: impl Into<String>) {
        self.overrides.insert(key.into(), None);
    }
}

impl Environment for LayeredEnvironment<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        match self.overrides.get(key) {
            Some(value) => value.clone(),
            None => self.base.lookup(key),
        }
    }
}
