use super::{is_uident, Parser};
use crate::ast::Pattern;
use crate::error::Error;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    pub(super) fn parse_pattern(&mut self) -> Result<Pattern, Error> {
        let first = self.parse_pattern_app()?;
        if self.peek() != &Token::Comma {
            return Ok(first);
        }
        let mut elems = vec![first];
        while self.peek() == &Token::Comma {
            self.advance();
            elems.push(self.parse_pattern_app()?);
        }
        Ok(Pattern::Tuple(elems))
    }

    fn starts_pattern_atom(&self) -> bool {
        match self.peek() {
            Token::Word(_) => !self.is_keyword(),
            Token::Int(_) | Token::Str(_) | Token::LParen => true,
            _ => false,
        }
    }

    fn parse_pattern_app(&mut self) -> Result<Pattern, Error> {
        let head = self.parse_pattern_atom()?;
        match head {
            Pattern::Construct { name, arg: None } if self.starts_pattern_atom() => {
                let arg = self.parse_pattern_atom()?;
                Ok(Pattern::Construct {
                    name,
                    arg: Some(Box::new(arg)),
                })
            }
            other => Ok(other),
        }
    }

    fn parse_pattern_atom(&mut self) -> Result<Pattern, Error> {
        match self.peek().clone() {
            Token::Word(w) if w == "_" => {
                self.advance();
                Ok(Pattern::Wildcard)
            }
            Token::Word(_) if !self.is_keyword() => {
                let mut name = self.take_word()?;
                if !is_uident(&name) {
                    return Ok(Pattern::Var(name));
                }
                while self.peek() == &Token::Dot && matches!(self.peek_ahead(1), Token::Word(_)) {
                    self.advance();
                    name.push('.');
                    name.push_str(&self.take_uident()?);
                }
                Ok(Pattern::Construct { name, arg: None })
            }
            Token::Int(n) => {
                self.advance();
                Ok(Pattern::Int(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Pattern::Str(s))
            }
            Token::LParen => {
                self.advance();
                if self.peek() == &Token::RParen {
                    self.advance();
                    return Ok(Pattern::Construct {
                        name: "()".to_owned(),
                        arg: None,
                    });
                }
                let inner = self.parse_pattern()?;
                self.expect(Token::RParen, ")")?;
                Ok(inner)
            }
            other => Err(self.err(format!("expected pattern, got {:?}", other))),
        }
    }
}
