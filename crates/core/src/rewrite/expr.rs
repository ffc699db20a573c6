use super::{Rewriter, GETENV, IFDEF};
use crate::ast::{Case, Expr, ExprKind, Extension};
use crate::error::Result;

impl Rewriter<'_> {
    /// Rewrite an expression: `GETENV` markers become string literals and
    /// `match` cases guarded by `IFDEF` are kept or dropped. Everything else
    /// is rebuilt unchanged around its rewritten children.
    pub fn expr(&self, e: Expr) -> Result<Expr> {
        let loc = e.loc;
        let kind = match e.kind {
            ExprKind::Extension(ext) if ext.name == GETENV => {
                let value = self.resolve(ext.payload.as_deref(), GETENV, &ext.loc)?;
                log::debug!("{}: GETENV substituted {:?}", loc, value);
                ExprKind::Str(value)
            }
            ExprKind::Extension(ext) => ExprKind::Extension(self.extension(ext)?),
            ExprKind::Match { scrutinee, cases } => ExprKind::Match {
                scrutinee: self.boxed(*scrutinee)?,
                cases: self.cases(cases)?,
            },
            ExprKind::Construct { name, arg } => ExprKind::Construct {
                name,
                arg: match arg {
                    Some(a) => Some(self.boxed(*a)?),
                    None => None,
                },
            },
            ExprKind::Apply { func, args } => ExprKind::Apply {
                func: self.boxed(*func)?,
                args: self.exprs(args)?,
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: self.boxed(*lhs)?,
                rhs: self.boxed(*rhs)?,
            },
            ExprKind::Tuple(elems) => ExprKind::Tuple(self.exprs(elems)?),
            ExprKind::List(elems) => ExprKind::List(self.exprs(elems)?),
            ExprKind::Let { name, value, body } => ExprKind::Let {
                name,
                value: self.boxed(*value)?,
                body: self.boxed(*body)?,
            },
            ExprKind::Fun { params, body } => ExprKind::Fun {
                params,
                body: self.boxed(*body)?,
            },
            leaf @ (ExprKind::Ident(_) | ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Unit) => {
                leaf
            }
        };
        Ok(Expr { kind, loc })
    }

    fn boxed(&self, e: Expr) -> Result<Box<Expr>> {
        Ok(Box::new(self.expr(e)?))
    }

    fn exprs(&self, es: Vec<Expr>) -> Result<Vec<Expr>> {
        es.into_iter().map(|e| self.expr(e)).collect()
    }

    /// Extensions other than `GETENV` keep their name; only the payload is
    /// rewritten.
    pub(super) fn extension(&self, ext: Extension) -> Result<Extension> {
        let payload = match ext.payload {
            Some(p) => Some(self.boxed(*p)?),
            None => None,
        };
        Ok(Extension {
            name: ext.name,
            payload,
            loc: ext.loc,
        })
    }

    /// Cases guarded by exactly `[%IFDEF X]` lose the guard when `X` is
    /// defined and disappear otherwise. Order is preserved.
    fn cases(&self, cases: Vec<Case>) -> Result<Vec<Case>> {
        let mut out = Vec::with_capacity(cases.len());
        for case in cases {
            let guard = match case.guard {
                Some(g) => match g.as_extension(IFDEF) {
                    Some(ext) => {
                        if !self.is_defined(ext.payload.as_deref(), IFDEF, &ext.loc)? {
                            log::debug!("{}: match case dropped", g.loc);
                            continue;
                        }
                        None
                    }
                    None => Some(self.expr(g)?),
                },
                None => None,
            };
            out.push(Case {
                pattern: case.pattern,
                guard,
                body: self.expr(case.body)?,
            });
        }
        Ok(out)
    }
}
