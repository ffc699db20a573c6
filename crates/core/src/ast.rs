//! Syntax tree consumed and produced by the rewriter.
//!
//! These types are produced by the parser (or decoded from interchange
//! JSON) and handed to [`crate::rewrite`]. Every node that can be the
//! subject of a diagnostic carries a [`Loc`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// Location
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loc {
    pub file: String,
    pub line: u32,
}

impl Loc {
    pub fn new(file: &str, line: u32) -> Self {
        Loc {
            file: file.to_owned(),
            line,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ──────────────────────────────────────────────
// Markers
// ──────────────────────────────────────────────

/// An extension node, `[%name payload]` in expression position or
/// `[%%name payload]` in item position. Directives and inline
/// substitutions are extensions with a recognised name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<Expr>>,
    pub loc: Loc,
}

/// `[@name payload]` attached to a variant constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Expr>,
    pub loc: Loc,
}

// ──────────────────────────────────────────────
// Items
// ──────────────────────────────────────────────

pub type Structure = Vec<Item>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Placeholder left where a directive or a suppressed item used to be.
    Empty,
    Let {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<String>,
        body: Expr,
    },
    Type {
        name: String,
        constructors: Vec<Constructor>,
    },
    Module {
        name: String,
        items: Structure,
    },
    Extension(Extension),
}

impl Item {
    pub fn empty(loc: Loc) -> Self {
        Item {
            kind: ItemKind::Empty,
            loc,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ItemKind::Empty)
    }
}

/// One alternative of a variant type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub name: String,
    /// Argument type after `of`, kept as normalised source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub loc: Loc,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Value path; segments joined with `.` (`List.map`).
    Ident(String),
    Int(i64),
    Str(String),
    Unit,
    Construct {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg: Option<Box<Expr>>,
    },
    Apply {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    Fun {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        cases: Vec<Case>,
    },
    Extension(Extension),
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Loc) -> Self {
        Expr { kind, loc }
    }

    pub fn string(value: impl Into<String>, loc: Loc) -> Self {
        Expr::new(ExprKind::Str(value.into()), loc)
    }

    /// The extension called `name`, if this expression is exactly that marker.
    pub fn as_extension(&self, name: &str) -> Option<&Extension> {
        match &self.kind {
            ExprKind::Extension(ext) if ext.name == name => Some(ext),
            _ => None,
        }
    }
}

/// One branch of a `match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Wildcard,
    Var(String),
    Int(i64),
    Str(String),
    Construct {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg: Option<Box<Pattern>>,
    },
    Tuple(Vec<Pattern>),
}

// ──────────────────────────────────────────────
// Structural comparison
// ──────────────────────────────────────────────

/// Strip every location in a structure. Trees that differ only in where
/// their nodes came from compare equal afterwards.
pub fn without_locs(items: &[Item]) -> Structure {
    items.iter().map(item_without_locs).collect()
}

fn item_without_locs(item: &Item) -> Item {
    let kind = match &item.kind {
        ItemKind::Empty => ItemKind::Empty,
        ItemKind::Let { name, params, body } => ItemKind::Let {
            name: name.clone(),
            params: params.clone(),
            body: expr_without_locs(body),
        },
        ItemKind::Type { name, constructors } => ItemKind::Type {
            name: name.clone(),
            constructors: constructors
                .iter()
                .map(|c| Constructor {
                    name: c.name.clone(),
                    arg: c.arg.clone(),
                    attributes: c
                        .attributes
                        .iter()
                        .map(|a| Attribute {
                            name: a.name.clone(),
                            payload: a.payload.as_ref().map(expr_without_locs),
                            loc: Loc::default(),
                        })
                        .collect(),
                    loc: Loc::default(),
                })
                .collect(),
        },
        ItemKind::Module { name, items } => ItemKind::Module {
            name: name.clone(),
            items: without_locs(items),
        },
        ItemKind::Extension(ext) => ItemKind::Extension(extension_without_locs(ext)),
    };
    Item {
        kind,
        loc: Loc::default(),
    }
}

fn extension_without_locs(ext: &Extension) -> Extension {
    Extension {
        name: ext.name.clone(),
        payload: ext
            .payload
            .as_ref()
            .map(|p| Box::new(expr_without_locs(p))),
        loc: Loc::default(),
    }
}

pub fn expr_without_locs(expr: &Expr) -> Expr {
    let boxed = |e: &Expr| Box::new(expr_without_locs(e));
    let kind = match &expr.kind {
        ExprKind::Ident(_) | ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Unit => {
            expr.kind.clone()
        }
        ExprKind::Construct { name, arg } => ExprKind::Construct {
            name: name.clone(),
            arg: arg.as_deref().map(boxed),
        },
        ExprKind::Apply { func, args } => ExprKind::Apply {
            func: boxed(func),
            args: args.iter().map(expr_without_locs).collect(),
        },
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op: op.clone(),
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        },
        ExprKind::Tuple(es) => ExprKind::Tuple(es.iter().map(expr_without_locs).collect()),
        ExprKind::List(es) => ExprKind::List(es.iter().map(expr_without_locs).collect()),
        ExprKind::Let { name, value, body } => ExprKind::Let {
            name: name.clone(),
            value: boxed(value),
            body: boxed(body),
        },
        ExprKind::Fun { params, body } => ExprKind::Fun {
            params: params.clone(),
            body: boxed(body),
        },
        ExprKind::Match { scrutinee, cases } => ExprKind::Match {
            scrutinee: boxed(scrutinee),
            cases: cases
                .iter()
                .map(|c| Case {
                    pattern: c.pattern.clone(),
                    guard: c.guard.as_ref().map(expr_without_locs),
                    body: expr_without_locs(&c.body),
                })
                .collect(),
        },
        ExprKind::Extension(ext) => ExprKind::Extension(extension_without_locs(ext)),
    };
    Expr {
        kind,
        loc: Loc::default(),
    }
}
