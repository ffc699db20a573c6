use super::Parser;
use crate::ast::{Attribute, Constructor, Extension, Item, ItemKind, Loc, Structure};
use crate::error::Error;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Structures ---------------------------------------------

    /// Items up to end of input or a closing `end`, which is left for the caller.
    pub(super) fn parse_structure(&mut self) -> Result<Structure, Error> {
        let mut items = Vec::new();
        while self.peek() != &Token::Eof && !self.is_word("end") {
            items.push(self.parse_item()?);
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> Result<Item, Error> {
        let loc = self.loc();
        let kind = match self.peek().clone() {
            Token::ItemExt => {
                self.advance();
                ItemKind::Extension(self.parse_extension_body(loc.clone())?)
            }
            Token::Word(w) => match w.as_str() {
                "let" => self.parse_let_item()?,
                "type" => self.parse_type_item()?,
                "module" => self.parse_module_item()?,
                _ => return Err(self.err(format!("unexpected token '{}'", w))),
            },
            other => return Err(self.err(format!("expected item, got {:?}", other))),
        };
        Ok(Item { kind, loc })
    }

    fn parse_let_item(&mut self) -> Result<ItemKind, Error> {
        self.expect_word("let")?;
        let name = self.take_lident()?;
        let mut params = Vec::new();
        while self.peek() != &Token::Eq {
            params.push(self.take_lident()?);
        }
        self.advance();
        let body = self.parse_expr()?;
        Ok(ItemKind::Let { name, params, body })
    }

    fn parse_module_item(&mut self) -> Result<ItemKind, Error> {
        self.expect_word("module")?;
        let name = self.take_uident()?;
        self.expect(Token::Eq, "=")?;
        self.expect_word("struct")?;
        let items = self.parse_structure()?;
        self.expect_word("end")?;
        Ok(ItemKind::Module { name, items })
    }

    // -- Variant types ------------------------------------------

    fn parse_type_item(&mut self) -> Result<ItemKind, Error> {
        self.expect_word("type")?;
        let name = self.take_lident()?;
        self.expect(Token::Eq, "=")?;
        if self.peek() == &Token::Bar {
            self.advance();
            // `type t = |` has no constructors
            if !matches!(self.peek(), Token::Word(w) if super::is_uident(w)) {
                return Ok(ItemKind::Type {
                    name,
                    constructors: Vec::new(),
                });
            }
        }
        let mut constructors = vec![self.parse_constructor()?];
        while self.peek() == &Token::Bar {
            self.advance();
            constructors.push(self.parse_constructor()?);
        }
        Ok(ItemKind::Type { name, constructors })
    }

    fn parse_constructor(&mut self) -> Result<Constructor, Error> {
        let loc = self.loc();
        let name = self.take_uident()?;
        let arg = if self.is_word("of") {
            self.advance();
            Some(self.parse_type_text()?)
        } else {
            None
        };
        let mut attributes = Vec::new();
        while self.peek() == &Token::Attr {
            attributes.push(self.parse_attribute()?);
        }
        Ok(Constructor {
            name,
            arg,
            attributes,
            loc,
        })
    }

    /// Argument type of a constructor, normalised to single-spaced text.
    fn parse_type_text(&mut self) -> Result<String, Error> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            let piece = match self.peek() {
                Token::Word(w) if w == "of" => break,
                Token::Word(_) if self.is_keyword() => break,
                Token::Word(w) => w.clone(),
                Token::Op(op) if op == "*" => "*".to_owned(),
                Token::Arrow => "->".to_owned(),
                Token::Comma => ",".to_owned(),
                Token::Dot => ".".to_owned(),
                Token::LParen => {
                    depth += 1;
                    "(".to_owned()
                }
                Token::RParen if depth > 0 => {
                    depth -= 1;
                    ")".to_owned()
                }
                _ => break,
            };
            let glue = text.is_empty()
                || text.ends_with('(')
                || text.ends_with('.')
                || matches!(piece.as_str(), ")" | "," | ".");
            if !glue {
                text.push(' ');
            }
            text.push_str(&piece);
            self.advance();
        }
        if text.is_empty() {
            return Err(self.err(format!("expected type after 'of', got {:?}", self.peek())));
        }
        if depth != 0 {
            return Err(self.err("unbalanced parentheses in constructor argument"));
        }
        Ok(text)
    }

    // -- Markers ------------------------------------------------

    fn parse_attribute(&mut self) -> Result<Attribute, Error> {
        let loc = self.loc();
        self.expect(Token::Attr, "[@")?;
        let name = self.take_marker_name()?;
        let payload = if self.peek() == &Token::RBracket {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::RBracket, "]")?;
        Ok(Attribute {
            name,
            payload,
            loc,
        })
    }

    /// Name, optional payload and closing bracket of `[%%...]` or `[%...]`;
    /// the opener has already been consumed.
    pub(super) fn parse_extension_body(
        &mut self,
        loc: Loc,
    ) -> Result<Extension, Error> {
        let name = self.take_marker_name()?;
        let payload = if self.peek() == &Token::RBracket {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect(Token::RBracket, "]")?;
        Ok(Extension { name, payload, loc })
    }
}
