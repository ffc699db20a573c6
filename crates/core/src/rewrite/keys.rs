use super::{bare_identifier, GETENV, IFDEF, IFNDEF};
use crate::ast::{Expr, ExprKind, Item, ItemKind};
use std::collections::BTreeSet;

/// Every environment key a structure consults, suppressed regions included.
/// Markers with malformed arguments are skipped; the rewrite reports them.
pub fn referenced_keys(items: &[Item]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_items(items, &mut keys);
    keys
}

fn collect_items(items: &[Item], keys: &mut BTreeSet<String>) {
    for item in items {
        match &item.kind {
            ItemKind::Empty => {}
            ItemKind::Let { body, .. } => collect_expr(body, keys),
            ItemKind::Type { constructors, .. } => {
                for attr in constructors.iter().flat_map(|c| &c.attributes) {
                    if attr.name == IFDEF || attr.name == IFNDEF {
                        add(bare_identifier(attr.payload.as_ref()), keys);
                    }
                }
            }
            ItemKind::Module { items, .. } => collect_items(items, keys),
            ItemKind::Extension(ext) if ext.name == IFDEF => {
                add(bare_identifier(ext.payload.as_deref()), keys);
            }
            ItemKind::Extension(ext) => {
                if let Some(p) = &ext.payload {
                    collect_expr(p, keys);
                }
            }
        }
    }
}

fn collect_expr(e: &Expr, keys: &mut BTreeSet<String>) {
    match &e.kind {
        ExprKind::Extension(ext) if ext.name == GETENV => {
            add(bare_identifier(ext.payload.as_deref()), keys);
        }
        ExprKind::Extension(ext) => {
            if let Some(p) = &ext.payload {
                collect_expr(p, keys);
            }
        }
        ExprKind::Match { scrutinee, cases } => {
            collect_expr(scrutinee, keys);
            for case in cases {
                match case.guard.as_ref() {
                    Some(g) => match g.as_extension(IFDEF) {
                        Some(ext) => add(bare_identifier(ext.payload.as_deref()), keys),
                        None => collect_expr(g, keys),
                    },
                    None => {}
                }
                collect_expr(&case.body, keys);
            }
        }
        ExprKind::Construct { arg, .. } => {
            if let Some(a) = arg {
                collect_expr(a, keys);
            }
        }
        ExprKind::Apply { func, args } => {
            collect_expr(func, keys);
            args.iter().for_each(|a| collect_expr(a, keys));
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_expr(lhs, keys);
            collect_expr(rhs, keys);
        }
        ExprKind::Tuple(elems) | ExprKind::List(elems) => {
            elems.iter().for_each(|x| collect_expr(x, keys));
        }
        ExprKind::Let { value, body, .. } => {
            collect_expr(value, keys);
            collect_expr(body, keys);
        }
        ExprKind::Fun { body, .. } => collect_expr(body, keys),
        ExprKind::Ident(_) | ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Unit => {}
    }
}

fn add(key: Option<&str>, keys: &mut BTreeSet<String>) {
    if let Some(k) = key {
        keys.insert(k.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser;

    #[test]
    fn keys_from_every_marker_kind() {
        let src = r#"
[%%IFDEF BLOCK]
let a = [%GETENV INLINE]
[%%ELSE]
let b = match v with | _ when [%IFDEF GUARD] -> 1 | _ -> 2
[%%END]
type t = A [@IFNDEF ATTR] | B [@deprecated]
module M = struct
  let c = f [%GETENV NESTED] [%GETENV Bad.path]
end
"#;
        let tokens = lexer::lex(src, "k.ml").unwrap();
        let items = parser::parse(&tokens, "k.ml").unwrap();
        let keys: Vec<_> = referenced_keys(&items).into_iter().collect();
        assert_eq!(keys, vec!["ATTR", "BLOCK", "GUARD", "INLINE", "NESTED"]);
    }
}
