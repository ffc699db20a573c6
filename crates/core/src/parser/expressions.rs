use super::{is_uident, Parser};
use crate::ast::{Case, Expr, ExprKind};
use crate::error::Error;
use crate::lexer::Token;

/// Binding power and right-associativity of an infix operator.
fn infix(op: &str) -> Option<(u8, bool)> {
    match op {
        "||" => Some((1, true)),
        "&&" => Some((2, true)),
        "=" | "<>" | "<" | ">" | "<=" | ">=" => Some((3, false)),
        "^" | "@" => Some((4, true)),
        "+" | "-" => Some((5, false)),
        "*" | "/" => Some((6, false)),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------

    pub(super) fn parse_expr(&mut self) -> Result<Expr, Error> {
        let loc = self.loc();
        if self.is_word("match") {
            self.advance();
            let scrutinee = self.parse_expr()?;
            self.expect_word("with")?;
            let cases = self.parse_cases()?;
            return Ok(Expr::new(
                ExprKind::Match {
                    scrutinee: Box::new(scrutinee),
                    cases,
                },
                loc,
            ));
        }
        if self.is_word("let") {
            self.advance();
            let name = self.take_lident()?;
            let mut params = Vec::new();
            while self.peek() != &Token::Eq {
                params.push(self.take_lident()?);
            }
            self.advance();
            let value_loc = self.loc();
            let mut value = self.parse_expr()?;
            if !params.is_empty() {
                value = Expr::new(
                    ExprKind::Fun {
                        params,
                        body: Box::new(value),
                    },
                    value_loc,
                );
            }
            self.expect_word("in")?;
            let body = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::Let {
                    name,
                    value: Box::new(value),
                    body: Box::new(body),
                },
                loc,
            ));
        }
        if self.is_word("fun") {
            self.advance();
            let mut params = vec![self.take_lident()?];
            while self.peek() != &Token::Arrow {
                params.push(self.take_lident()?);
            }
            self.advance();
            let body = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::Fun {
                    params,
                    body: Box::new(body),
                },
                loc,
            ));
        }
        self.parse_tuple()
    }

    fn parse_tuple(&mut self) -> Result<Expr, Error> {
        let loc = self.loc();
        let first = self.parse_binary(0)?;
        if self.peek() != &Token::Comma {
            return Ok(first);
        }
        let mut elems = vec![first];
        while self.peek() == &Token::Comma {
            self.advance();
            elems.push(self.parse_binary(0)?);
        }
        Ok(Expr::new(ExprKind::Tuple(elems), loc))
    }

    fn peek_infix(&self) -> Option<(String, u8, bool)> {
        let op = match self.peek() {
            Token::Eq => "=".to_owned(),
            Token::Op(op) => op.clone(),
            _ => return None,
        };
        infix(&op).map(|(prec, right)| (op, prec, right))
    }

    /// Precedence climbing over the infix operators.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Error> {
        let mut lhs = self.parse_app()?;
        while let Some((op, prec, right)) = self.peek_infix() {
            if prec < min_prec {
                break;
            }
            self.advance();
            let next_min = if right { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min)?;
            let loc = lhs.loc.clone();
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                loc,
            );
        }
        Ok(lhs)
    }

    fn starts_atom(&self) -> bool {
        match self.peek() {
            Token::Word(_) => !self.is_keyword(),
            Token::Int(_)
            | Token::Str(_)
            | Token::LParen
            | Token::LBracket
            | Token::ExprExt => true,
            _ => false,
        }
    }

    fn parse_app(&mut self) -> Result<Expr, Error> {
        let head = self.parse_atom()?;
        if !self.starts_atom() {
            return Ok(head);
        }
        let loc = head.loc.clone();
        if let ExprKind::Construct { name, arg: None } = &head.kind {
            let arg = self.parse_atom()?;
            return Ok(Expr::new(
                ExprKind::Construct {
                    name: name.clone(),
                    arg: Some(Box::new(arg)),
                },
                loc,
            ));
        }
        let mut args = Vec::new();
        while self.starts_atom() {
            args.push(self.parse_atom()?);
        }
        Ok(Expr::new(
            ExprKind::Apply {
                func: Box::new(head),
                args,
            },
            loc,
        ))
    }

    fn parse_atom(&mut self) -> Result<Expr, Error> {
        let loc = self.loc();
        match self.peek().clone() {
            Token::Word(_) if !self.is_keyword() => {
                let mut path = self.take_word()?;
                while self.peek() == &Token::Dot && matches!(self.peek_ahead(1), Token::Word(_)) {
                    self.advance();
                    path.push('.');
                    path.push_str(&self.take_word()?);
                }
                let last = path.rsplit('.').next().unwrap_or(&path);
                let kind = if is_uident(last) {
                    ExprKind::Construct {
                        name: path,
                        arg: None,
                    }
                } else {
                    ExprKind::Ident(path)
                };
                Ok(Expr::new(kind, loc))
            }
            Token::Int(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::Int(n), loc))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::Str(s), loc))
            }
            Token::LParen => {
                self.advance();
                if self.peek() == &Token::RParen {
                    self.advance();
                    return Ok(Expr::new(ExprKind::Unit, loc));
                }
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, ")")?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                while self.peek() != &Token::RBracket {
                    elems.push(self.parse_expr()?);
                    if self.peek() == &Token::Semi {
                        self.advance();
                    } else {
                        break;
                    }
                }
                self.expect(Token::RBracket, "]")?;
                Ok(Expr::new(ExprKind::List(elems), loc))
            }
            Token::ExprExt => {
                self.advance();
                let ext = self.parse_extension_body(loc.clone())?;
                Ok(Expr::new(ExprKind::Extension(ext), loc))
            }
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }

    // -- Match cases ---------------------------------------------

    fn parse_cases(&mut self) -> Result<Vec<Case>, Error> {
        if self.peek() == &Token::Bar {
            self.advance();
        }
        let mut cases = vec![self.parse_case()?];
        while self.peek() == &Token::Bar {
            self.advance();
            cases.push(self.parse_case()?);
        }
        Ok(cases)
    }

    fn parse_case(&mut self) -> Result<Case, Error> {
        let pattern = self.parse_pattern()?;
        let guard = if self.is_word("when") {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(Token::Arrow, "->")?;
        let body = self.parse_expr()?;
        Ok(Case {
            pattern,
            guard,
            body,
        })
    }
}
