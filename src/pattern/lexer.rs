//! Pattern DSL lexer.
//!
//! Tokenizes pattern strings like `(member (ident :Main) :dayTime)`.

use super::PatternError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Capture,  // $
    Wildcard, // _
    Rest,     // ...
    Negation, // !
    Pipe,     // | inside alternatives
    HelperCall(String),   // #name
    SymbolLiteral(String), // :Name
    SymbolPrefix(String),  // :prefix*
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    Ident(String), // node type names: member, call, eq, ...
}

pub struct Lexer<'a> {
    input: &'a [u8],
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            source: input,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.pos < self.input.len() && pred(self.input[self.pos]) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn is_ident_char(ch: u8) -> bool {
        ch.is_ascii_alphanumeric() || ch == b'_'
    }

    fn error(&self, message: impl Into<String>) -> PatternError {
        PatternError::Syntax {
            pattern: self.source.to_string(),
            message: message.into(),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, PatternError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else { break };

            match ch {
                b'(' | b')' | b'{' | b'}' | b'[' | b']' | b'$' | b'|' | b'!' => {
                    self.advance();
                    tokens.push(match ch {
                        b'(' => Token::LParen,
                        b')' => Token::RParen,
                        b'{' => Token::LBrace,
                        b'}' => Token::RBrace,
                        b'[' => Token::LBracket,
                        b']' => Token::RBracket,
                        b'$' => Token::Capture,
                        b'|' => Token::Pipe,
                        _ => Token::Negation,
                    });
                }
                b'.' => {
                    if self.input[self.pos..].starts_with(b"...") {
                        self.pos += 3;
                        tokens.push(Token::Rest);
                    } else {
                        return Err(self.error(format!("stray '.' at offset {}", self.pos)));
                    }
                }
                b'#' => {
                    self.advance();
                    let name = self.read_while(Self::is_ident_char);
                    if name.is_empty() {
                        return Err(self.error("empty helper name after '#'"));
                    }
                    tokens.push(Token::HelperCall(name));
                }
                b':' => {
                    self.advance();
                    let name = self.read_while(Self::is_ident_char);
                    if name.is_empty() {
                        return Err(self.error("empty symbol after ':'"));
                    }
                    if self.peek() == Some(b'*') {
                        self.advance();
                        tokens.push(Token::SymbolPrefix(name));
                    } else {
                        tokens.push(Token::SymbolLiteral(name));
                    }
                }
                b'\'' | b'"' => {
                    let quote = ch;
                    self.advance();
                    let s = self.read_while(move |c| c != quote);
                    if self.advance() != Some(quote) {
                        return Err(self.error("unterminated string literal"));
                    }
                    tokens.push(Token::StringLiteral(s));
                }
                _ if ch.is_ascii_digit()
                    || (ch == b'-'
                        && self
                            .input
                            .get(self.pos + 1)
                            .is_some_and(|c| c.is_ascii_digit())) =>
                {
                    let num_str =
                        self.read_while(|c| c.is_ascii_digit() || c == b'-' || c == b'.');
                    if num_str.contains('.') {
                        let value = num_str
                            .parse::<f64>()
                            .map_err(|_| self.error(format!("invalid float {num_str}")))?;
                        tokens.push(Token::FloatLiteral(value));
                    } else {
                        let value = num_str
                            .parse::<i64>()
                            .map_err(|_| self.error(format!("invalid integer {num_str}")))?;
                        tokens.push(Token::IntLiteral(value));
                    }
                }
                _ if Self::is_ident_char(ch) => {
                    let word = self.read_while(Self::is_ident_char);
                    if word == "_" {
                        tokens.push(Token::Wildcard);
                    } else {
                        tokens.push(Token::Ident(word));
                    }
                }
                _ => {
                    return Err(self.error(format!(
                        "unexpected character '{}' at offset {}",
                        ch as char, self.pos
                    )));
                }
            }
        }

        Ok(tokens)
    }
}
