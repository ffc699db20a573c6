use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords; the parser tells them apart
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    Int(i64),
    // Marker openers
    ItemExt, // [%%
    ExprExt, // [%
    Attr,    // [@
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Bar,
    Eq,
    Arrow,
    /// Infix operator other than `=`
    Op(String),
    Eof,
}

impl Token {
    /// Tokens after which a `-` is subtraction rather than a sign.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Word(_) | Token::Str(_) | Token::Int(_) | Token::RParen | Token::RBracket
        )
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, Error> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    let at = |pos: usize, c: char| pos < chars.len() && chars[pos] == c;

    while pos < chars.len() {
        let c = chars[pos];

        // Comment, possibly nested
        if c == '(' && at(pos + 1, '*') {
            let start_line = line;
            let mut depth = 1usize;
            pos += 2;
            while depth > 0 {
                if pos >= chars.len() {
                    return Err(Error::lex(filename, start_line, "unterminated comment"));
                }
                if chars[pos] == '\n' {
                    line += 1;
                    pos += 1;
                } else if chars[pos] == '(' && at(pos + 1, '*') {
                    depth += 1;
                    pos += 2;
                } else if chars[pos] == '*' && at(pos + 1, ')') {
                    depth -= 1;
                    pos += 2;
                } else {
                    pos += 1;
                }
            }
            continue;
        }

        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;

        // String literal
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(Error::lex(filename, tok_line, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == '"' {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(Error::lex(
                            filename,
                            tok_line,
                            "unterminated escape in string",
                        ));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                if sc == '\n' {
                    line += 1;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        // Number; a leading '-' is a sign only where no operand precedes it
        let signed = c == '-'
            && pos + 1 < chars.len()
            && chars[pos + 1].is_ascii_digit()
            && !tokens.last().is_some_and(|t| t.token.ends_operand());
        if c.is_ascii_digit() || signed {
            let start = pos;
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
                pos += 1;
            }
            let s: String = chars[start..pos].iter().filter(|&&d| d != '_').collect();
            let n: i64 = s.parse().map_err(|_| {
                Error::lex(filename, tok_line, format!("invalid integer '{}'", s))
            })?;
            tokens.push(Spanned {
                token: Token::Int(n),
                line: tok_line,
            });
            continue;
        }

        // Marker openers and brackets
        if c == '[' {
            let (token, width) = if at(pos + 1, '%') && at(pos + 2, '%') {
                (Token::ItemExt, 3)
            } else if at(pos + 1, '%') {
                (Token::ExprExt, 2)
            } else if at(pos + 1, '@') {
                (Token::Attr, 2)
            } else {
                (Token::LBracket, 1)
            };
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += width;
            continue;
        }

        // Two-character operators first
        let two: String = chars[pos..(pos + 2).min(chars.len())].iter().collect();
        let two_token = match two.as_str() {
            "->" => Some(Token::Arrow),
            "<=" | ">=" | "<>" | "&&" | "||" => Some(Token::Op(two.clone())),
            _ => None,
        };
        if let Some(token) = two_token {
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += 2;
            continue;
        }

        let single = match c {
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ';' => Some(Token::Semi),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '|' => Some(Token::Bar),
            '=' => Some(Token::Eq),
            '+' | '-' | '*' | '/' | '^' | '@' | '<' | '>' => Some(Token::Op(c.to_string())),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += 1;
            continue;
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len()
                && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '\'')
            {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                line: tok_line,
            });
            continue;
        }

        return Err(Error::lex(
            filename,
            tok_line,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src, "t.ml")
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn marker_openers() {
        assert_eq!(
            kinds("[%%IFDEF X] [%GETENV Y] [@IFNDEF Z] [a]"),
            vec![
                Token::ItemExt,
                Token::Word("IFDEF".into()),
                Token::Word("X".into()),
                Token::RBracket,
                Token::ExprExt,
                Token::Word("GETENV".into()),
                Token::Word("Y".into()),
                Token::RBracket,
                Token::Attr,
                Token::Word("IFNDEF".into()),
                Token::Word("Z".into()),
                Token::RBracket,
                Token::LBracket,
                Token::Word("a".into()),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn minus_after_operand_is_subtraction() {
        assert_eq!(
            kinds("n-1"),
            vec![
                Token::Word("n".into()),
                Token::Op("-".into()),
                Token::Int(1),
                Token::Eof
            ]
        );
        assert_eq!(kinds("f (-1)")[2], Token::Int(-1));
    }

    #[test]
    fn nested_comments_are_skipped_and_lines_counted() {
        let toks = lex("(* a (* b *)\n c *) x", "t.ml").unwrap();
        assert_eq!(toks[0].token, Token::Word("x".into()));
        assert_eq!(toks[0].line, 2);
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = lex("let x = 1 (* oops", "t.ml").unwrap_err();
        assert!(err.to_string().contains("unterminated comment"));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![Token::Str("a\"b\n".into()), Token::Eof]
        );
    }

    #[test]
    fn arrow_and_comparison_operators() {
        assert_eq!(
            kinds("-> <= <> ||"),
            vec![
                Token::Arrow,
                Token::Op("<=".into()),
                Token::Op("<>".into()),
                Token::Op("||".into()),
                Token::Eof
            ]
        );
    }
}
