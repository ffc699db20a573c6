//! Surface syntax writer -- the inverse of the parser.
//!
//! Re-parsing printed output yields the same tree up to locations.
//! `Empty` placeholders print nothing. Sub-expressions that would not
//! survive re-parsing in place are parenthesised.

use crate::ast::*;

const INDENT: usize = 2;

pub fn print_structure(items: &[Item]) -> String {
    let mut out = String::new();
    print_items(items, 0, &mut out);
    out
}

fn print_items(items: &[Item], indent: usize, out: &mut String) {
    for item in items {
        if let Some(text) = print_item(item, indent) {
            out.push_str(&" ".repeat(indent));
            out.push_str(&text);
            out.push('\n');
        }
    }
}

fn print_item(item: &Item, indent: usize) -> Option<String> {
    let text = match &item.kind {
        ItemKind::Empty => return None,
        ItemKind::Let { name, params, body } => {
            let mut head = format!("let {}", name);
            for p in params {
                head.push(' ');
                head.push_str(p);
            }
            format!("{} = {}", head, print_expr(body, indent))
        }
        ItemKind::Type { name, constructors } => {
            let mut s = format!("type {} =", name);
            if constructors.is_empty() {
                s.push_str(" |");
            }
            for c in constructors {
                s.push('\n');
                s.push_str(&" ".repeat(indent + INDENT));
                s.push_str("| ");
                s.push_str(&print_constructor(c, indent + INDENT));
            }
            s
        }
        ItemKind::Module { name, items } => {
            let mut s = format!("module {} = struct\n", name);
            print_items(items, indent + INDENT, &mut s);
            s.push_str(&" ".repeat(indent));
            s.push_str("end");
            s
        }
        ItemKind::Extension(ext) => print_extension("[%%", ext, indent),
    };
    Some(text)
}

fn print_constructor(c: &Constructor, indent: usize) -> String {
    let mut s = c.name.clone();
    if let Some(arg) = &c.arg {
        s.push_str(" of ");
        s.push_str(arg);
    }
    for attr in &c.attributes {
        s.push_str(" [@");
        s.push_str(&attr.name);
        if let Some(payload) = &attr.payload {
            s.push(' ');
            s.push_str(&print_expr(payload, indent));
        }
        s.push(']');
    }
    s
}

fn print_extension(opener: &str, ext: &Extension, indent: usize) -> String {
    match &ext.payload {
        Some(payload) => format!("{}{} {}]", opener, ext.name, print_expr(payload, indent)),
        None => format!("{}{}]", opener, ext.name),
    }
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

pub fn print_expr(e: &Expr, indent: usize) -> String {
    match &e.kind {
        ExprKind::Tuple(elems) => elems
            .iter()
            .map(|x| tuple_elem(x, indent))
            .collect::<Vec<_>>()
            .join(", "),
        ExprKind::Binary { op, lhs, rhs } => format!(
            "{} {} {}",
            operand(lhs, indent),
            op,
            operand(rhs, indent)
        ),
        ExprKind::Let { name, value, body } => format!(
            "let {} = {} in {}",
            name,
            guarded(value, indent),
            print_expr(body, indent)
        ),
        ExprKind::Fun { params, body } => {
            format!("fun {} -> {}", params.join(" "), print_expr(body, indent))
        }
        ExprKind::Match { scrutinee, cases } => {
            let pad = " ".repeat(indent + INDENT);
            let mut s = format!("match {} with", guarded(scrutinee, indent));
            for case in cases {
                s.push('\n');
                s.push_str(&pad);
                s.push_str("| ");
                s.push_str(&print_pattern(&case.pattern));
                if let Some(guard) = &case.guard {
                    s.push_str(" when ");
                    s.push_str(&guarded(guard, indent + INDENT));
                }
                s.push_str(" -> ");
                s.push_str(&guarded(&case.body, indent + INDENT));
            }
            s
        }
        _ => app_level(e, indent),
    }
}

/// Application, constructor application or anything tighter.
fn app_level(e: &Expr, indent: usize) -> String {
    match &e.kind {
        ExprKind::Apply { func, args } => {
            let mut s = atom(func, indent);
            for a in args {
                s.push(' ');
                s.push_str(&atom(a, indent));
            }
            s
        }
        ExprKind::Construct {
            name,
            arg: Some(arg),
        } => format!("{} {}", name, atom(arg, indent)),
        _ => atom(e, indent),
    }
}

fn atom(e: &Expr, indent: usize) -> String {
    match &e.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Int(n) if *n >= 0 => n.to_string(),
        ExprKind::Int(n) => format!("({})", n),
        ExprKind::Str(s) => quote(s),
        ExprKind::Unit => "()".to_owned(),
        ExprKind::Construct { name, arg: None } => name.clone(),
        ExprKind::List(elems) => format!(
            "[{}]",
            elems
                .iter()
                .map(|x| guarded(x, indent))
                .collect::<Vec<_>>()
                .join("; ")
        ),
        ExprKind::Extension(ext) => print_extension("[%", ext, indent),
        _ => format!("({})", print_expr(e, indent)),
    }
}

fn operand(e: &Expr, indent: usize) -> String {
    app_level(e, indent)
}

fn tuple_elem(e: &Expr, indent: usize) -> String {
    match &e.kind {
        ExprKind::Binary { .. } => print_expr(e, indent),
        _ => app_level(e, indent),
    }
}

/// Positions followed by more syntax (`in`, `with`, `|`, `;`): an open
/// `match`, `let` or `fun` there would swallow what comes after it.
fn guarded(e: &Expr, indent: usize) -> String {
    match &e.kind {
        ExprKind::Match { .. } | ExprKind::Let { .. } | ExprKind::Fun { .. } => {
            format!("({})", print_expr(e, indent))
        }
        _ => print_expr(e, indent),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

// ──────────────────────────────────────────────
// Patterns
// ──────────────────────────────────────────────

pub fn print_pattern(p: &Pattern) -> String {
    match p {
        Pattern::Tuple(elems) => elems
            .iter()
            .map(pattern_app)
            .collect::<Vec<_>>()
            .join(", "),
        _ => pattern_app(p),
    }
}

fn pattern_app(p: &Pattern) -> String {
    match p {
        Pattern::Construct {
            name,
            arg: Some(arg),
        } => format!("{} {}", name, pattern_atom(arg)),
        _ => pattern_atom(p),
    }
}

fn pattern_atom(p: &Pattern) -> String {
    match p {
        Pattern::Wildcard => "_".to_owned(),
        Pattern::Var(v) => v.clone(),
        Pattern::Int(n) if *n >= 0 => n.to_string(),
        Pattern::Int(n) => format!("({})", n),
        Pattern::Str(s) => quote(s),
        Pattern::Construct { name, arg: None } => name.clone(),
        _ => format!("({})", print_pattern(p)),
    }
}
