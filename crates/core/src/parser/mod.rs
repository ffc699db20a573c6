/// Surface syntax reader.
/// Every item, expression, constructor and marker carries the location of
/// its first token. No directive is interpreted here -- that is the
/// rewriter's job.
use crate::ast::{Loc, Structure};
use crate::error::Error;
use crate::lexer::{Spanned, Token};

mod expressions;
mod items;
mod patterns;

/// Words that never start an atom.
const KEYWORDS: &[&str] = &[
    "let", "in", "type", "of", "module", "struct", "end", "match", "with", "when", "fun",
];

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn loc(&self) -> Loc {
        Loc::new(&self.filename, self.cur_line())
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::parse(&self.filename, self.cur_line(), msg)
    }

    fn expect(&mut self, expected: Token, shown: &str) -> Result<(), Error> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", shown, self.peek())))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<(), Error> {
        if self.is_word(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", expected, self.peek())))
        }
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn is_keyword(&self) -> bool {
        matches!(self.peek(), Token::Word(w) if KEYWORDS.contains(&w.as_str()))
    }

    fn take_word(&mut self) -> Result<String, Error> {
        match self.peek().clone() {
            Token::Word(w) if !KEYWORDS.contains(&w.as_str()) => {
                self.advance();
                Ok(w)
            }
            other => Err(self.err(format!("expected identifier, got {:?}", other))),
        }
    }

    /// Lowercase identifier (value or type name).
    fn take_lident(&mut self) -> Result<String, Error> {
        let w = self.take_word()?;
        if is_uident(&w) {
            return Err(self.err(format!("expected lowercase identifier, got '{}'", w)));
        }
        Ok(w)
    }

    /// Capitalised identifier (constructor or module name).
    fn take_uident(&mut self) -> Result<String, Error> {
        let w = self.take_word()?;
        if !is_uident(&w) {
            return Err(self.err(format!("expected capitalised identifier, got '{}'", w)));
        }
        Ok(w)
    }

    /// Name of a marker after `[%%`, `[%` or `[@`; dotted names are kept whole.
    fn take_marker_name(&mut self) -> Result<String, Error> {
        let mut name = self.take_word()?;
        while self.peek() == &Token::Dot && matches!(self.peek_ahead(1), Token::Word(_)) {
            self.advance();
            name.push('.');
            name.push_str(&self.take_word()?);
        }
        Ok(name)
    }
}

pub(crate) fn is_uident(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Parse a whole token stream into a structure. The stream must end with
/// [`Token::Eof`], as [`crate::lexer::lex`] produces it.
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<Structure, Error> {
    match tokens.last() {
        Some(last) if last.token == Token::Eof => {}
        last => {
            let line = last.map_or(1, |t| t.line);
            return Err(Error::parse(filename, line, "token stream does not end with Eof"));
        }
    }
    let mut p = Parser::new(tokens, filename);
    let items = p.parse_structure()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!("unexpected {:?} at top level", p.peek())));
    }
    Ok(items)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
