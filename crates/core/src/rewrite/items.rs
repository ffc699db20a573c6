use super::{Rewriter, ELSE, END, IFDEF};
use crate::ast::{Extension, Item, ItemKind, Structure};
use crate::error::Result;
use crate::stack::CondStack;

impl Rewriter<'_> {
    /// Rewrite a top-level structure with a fresh conditional-state stack,
    /// then check that every block opened during the pass was closed.
    pub fn structure(&self, items: Structure) -> Result<Structure> {
        let (stack, items) = self.items(CondStack::new(), items)?;
        stack.finish(self.options.unterminated)?;
        Ok(items)
    }

    /// Walk `items` left to right, threading `stack` through. Live module
    /// bodies continue with the same stack, so a block may open on one side
    /// of a module boundary and close on the other.
    pub fn items(&self, stack: CondStack, items: Structure) -> Result<(CondStack, Structure)> {
        let mut stack = stack;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let (next, item) = self.item(stack, item)?;
            stack = next;
            if self.options.keep_placeholders || !item.is_empty() {
                out.push(item);
            }
        }
        Ok((stack, out))
    }

    fn item(&self, mut stack: CondStack, item: Item) -> Result<(CondStack, Item)> {
        let loc = item.loc.clone();
        if let Some(ext) = directive(&item) {
            match ext.name.as_str() {
                IFDEF => {
                    let defined = self.is_defined(ext.payload.as_deref(), IFDEF, &ext.loc)?;
                    stack.push(defined, &loc);
                    log::debug!(
                        "{}: IFDEF opens block at depth {} (live: {})",
                        loc,
                        stack.depth(),
                        stack.is_live()
                    );
                }
                ELSE => {
                    stack.negate_top(&loc)?;
                    log::debug!("{}: ELSE at depth {} (live: {})", loc, stack.depth(), stack.is_live());
                }
                _ => {
                    stack.pop(&loc)?;
                    log::debug!("{}: END, depth now {}", loc, stack.depth());
                }
            }
            return Ok((stack, Item::empty(loc)));
        }

        if stack.is_live() {
            self.live_item(stack, item)
        } else {
            log::debug!("{}: item suppressed", loc);
            Ok((stack, Item::empty(loc)))
        }
    }

    /// Rewrite the contents of an item that is kept.
    fn live_item(&self, stack: CondStack, item: Item) -> Result<(CondStack, Item)> {
        let mut stack = stack;
        let kind = match item.kind {
            ItemKind::Empty => ItemKind::Empty,
            ItemKind::Let { name, params, body } => ItemKind::Let {
                name,
                params,
                body: self.expr(body)?,
            },
            ItemKind::Type { name, constructors } => ItemKind::Type {
                constructors: self.constructors(&name, constructors)?,
                name,
            },
            ItemKind::Module { name, items } => {
                let (next, items) = self.items(stack, items)?;
                stack = next;
                ItemKind::Module { name, items }
            }
            ItemKind::Extension(ext) => ItemKind::Extension(self.extension(ext)?),
        };
        Ok((
            stack,
            Item {
                kind,
                loc: item.loc,
            },
        ))
    }
}

/// The block directive an item consists of, if any.
fn directive(item: &Item) -> Option<&Extension> {
    match &item.kind {
        ItemKind::Extension(ext) if matches!(ext.name.as_str(), IFDEF | ELSE | END) => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::env::MapEnvironment;
    use crate::error::Error;
    use crate::rewrite::{RewriteOptions, Rewriter};
    use crate::stack::{CondStack, UnterminatedPolicy};

    fn loc(line: u32) -> Loc {
        Loc::new("t.ml", line)
    }

    fn directive(name: &str, key: Option<&str>, line: u32) -> Item {
        Item {
            kind: ItemKind::Extension(Extension {
                name: name.into(),
                payload: key.map(|k| {
                    Box::new(Expr::new(
                        ExprKind::Construct {
                            name: k.into(),
                            arg: None,
                        },
                        loc(line),
                    ))
                }),
                loc: loc(line),
            }),
            loc: loc(line),
        }
    }

    fn value(name: &str, line: u32) -> Item {
        Item {
            kind: ItemKind::Let {
                name: name.into(),
                params: vec![],
                body: Expr::new(ExprKind::Int(line as i64), loc(line)),
            },
            loc: loc(line),
        }
    }

    fn names(items: &[Item]) -> Vec<String> {
        items
            .iter()
            .filter_map(|i| match &i.kind {
                ItemKind::Let { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn directives_become_placeholders_in_place() {
        let env = MapEnvironment::new().with("A", "1");
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let out = rw
            .structure(vec![
                directive("IFDEF", Some("A"), 1),
                value("a", 2),
                directive("END", None, 3),
            ])
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[0].is_empty());
        assert_eq!(names(&out), vec!["a"]);
        assert!(out[2].is_empty());
    }

    #[test]
    fn stack_is_threaded_and_returned() {
        let env = MapEnvironment::new();
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let (stack, out) = rw
            .items(
                CondStack::new(),
                vec![directive("IFDEF", Some("A"), 1), value("a", 2)],
            )
            .unwrap();
        assert_eq!(stack.depth(), 1);
        assert!(!stack.is_live());
        assert!(out[1].is_empty());

        let (stack, out) = rw
            .items(stack, vec![directive("ELSE", None, 3), value("b", 4)])
            .unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(names(&out), vec!["b"]);
    }

    #[test]
    fn compact_mode_drops_placeholders() {
        let env = MapEnvironment::new();
        let options = RewriteOptions {
            keep_placeholders: false,
            ..RewriteOptions::default()
        };
        let rw = Rewriter::new(&env, options);
        let out = rw
            .structure(vec![
                value("x", 1),
                directive("IFDEF", Some("A"), 2),
                value("a", 3),
                directive("END", None, 4),
            ])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(names(&out), vec!["x"]);
    }

    #[test]
    fn unterminated_block_follows_policy() {
        let env = MapEnvironment::new();
        let items = vec![directive("IFDEF", Some("A"), 1), value("a", 2)];

        let strict = Rewriter::new(&env, RewriteOptions::default());
        let err = strict.structure(items.clone()).unwrap_err();
        assert!(matches!(err, Error::UnterminatedBlock { ref loc, depth: 1 } if loc.line == 1));

        let lenient = Rewriter::new(
            &env,
            RewriteOptions {
                unterminated: UnterminatedPolicy::Allow,
                ..RewriteOptions::default()
            },
        );
        let out = lenient.structure(items).unwrap();
        assert!(names(&out).is_empty());
    }

    #[test]
    fn module_body_continues_the_enclosing_stack() {
        let env = MapEnvironment::new();
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let module = Item {
            kind: ItemKind::Module {
                name: "M".into(),
                items: vec![value("b", 2), directive("END", None, 3), value("c", 4)],
            },
            loc: loc(1),
        };
        let out = rw
            .structure(vec![directive("IFDEF", Some("A"), 0), directive("ELSE", None, 0), module])
            .unwrap();
        let ItemKind::Module { items, .. } = &out[2].kind else {
            panic!("expected module, got {:?}", out[2].kind);
        };
        assert_eq!(names(items), vec!["b", "c"]);
    }

    #[test]
    fn end_inside_module_without_open_block_is_unmatched() {
        let env = MapEnvironment::new();
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let module = Item {
            kind: ItemKind::Module {
                name: "M".into(),
                items: vec![directive("END", None, 2)],
            },
            loc: loc(1),
        };
        let err = rw.structure(vec![module]).unwrap_err();
        assert!(
            matches!(err, Error::UnmatchedDirective { ref loc, .. } if loc.line == 2),
            "got {:?}",
            err
        );
    }

    #[test]
    fn block_left_open_in_module_is_unterminated() {
        let env = MapEnvironment::new().with("A", "1");
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let module = Item {
            kind: ItemKind::Module {
                name: "M".into(),
                items: vec![directive("IFDEF", Some("A"), 2), value("a", 3)],
            },
            loc: loc(1),
        };
        let err = rw.structure(vec![module]).unwrap_err();
        assert!(matches!(err, Error::UnterminatedBlock { ref loc, depth: 1 } if loc.line == 2));
    }

    #[test]
    fn directive_payload_on_else_is_ignored() {
        let env = MapEnvironment::new();
        let rw = Rewriter::new(&env, RewriteOptions::default());
        let out = rw
            .structure(vec![
                directive("IFDEF", Some("A"), 1),
                directive("ELSE", Some("A"), 2),
                value("b", 3),
                directive("END", Some("A"), 4),
            ])
            .unwrap();
        assert_eq!(names(&out), vec!["b"]);
    }
}
