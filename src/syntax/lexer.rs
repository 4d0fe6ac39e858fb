//! Tokenizer for the C# subset.

use super::ParseError;
use super::ast::BinaryOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords, told apart by the parser.
    Word(String),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Colon,
    Question,
    /// `=` (None) or a compound assignment such as `+=`.
    Assign(Option<BinaryOp>),
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    Tilde,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    PlusPlus,
    MinusMinus,
    /// `=>`, only lexed so the parser can reject lambdas with a clear message.
    Arrow,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut line_start = true;

    while pos < chars.len() {
        let c = chars[pos];

        if c == '\n' {
            line += 1;
            line_start = true;
            pos += 1;
            continue;
        }
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Preprocessor directives (#if, #region, ...) occupy a whole line.
        if c == '#' && line_start {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        line_start = false;

        if c == '/' && chars.get(pos + 1) == Some(&'/') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        if c == '/' && chars.get(pos + 1) == Some(&'*') {
            let start_line = line;
            pos += 2;
            loop {
                if pos >= chars.len() {
                    return Err(ParseError::new(start_line, "unterminated block comment"));
                }
                if chars[pos] == '\n' {
                    line += 1;
                }
                if chars[pos] == '*' && chars.get(pos + 1) == Some(&'/') {
                    pos += 2;
                    break;
                }
                pos += 1;
            }
            continue;
        }

        let tok_line = line;
        let push = |tokens: &mut Vec<Spanned>, token: Token| {
            tokens.push(Spanned {
                token,
                line: tok_line,
            })
        };

        if c.is_ascii_digit() || (c == '.' && chars.get(pos + 1).is_some_and(char::is_ascii_digit))
        {
            let (token, next) = lex_number(&chars, pos, tok_line)?;
            push(&mut tokens, token);
            pos = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' || (c == '@' && chars.get(pos + 1) != Some(&'"')) {
            if c == '@' {
                pos += 1;
            }
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            push(&mut tokens, Token::Word(word));
            continue;
        }

        if c == '"' || (c == '@' && chars.get(pos + 1) == Some(&'"')) {
            let verbatim = c == '@';
            pos += if verbatim { 2 } else { 1 };
            let mut s = String::new();
            loop {
                let Some(&sc) = chars.get(pos) else {
                    return Err(ParseError::new(tok_line, "unterminated string literal"));
                };
                if sc == '"' {
                    if verbatim && chars.get(pos + 1) == Some(&'"') {
                        s.push('"');
                        pos += 2;
                        continue;
                    }
                    pos += 1;
                    break;
                }
                if sc == '\n' {
                    if !verbatim {
                        return Err(ParseError::new(tok_line, "unterminated string literal"));
                    }
                    line += 1;
                }
                if sc == '\\' && !verbatim {
                    let (ch, next) = lex_escape(&chars, pos, tok_line)?;
                    s.push(ch);
                    pos = next;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            push(&mut tokens, Token::Str(s));
            continue;
        }

        if c == '\'' {
            pos += 1;
            let ch = match chars.get(pos) {
                Some('\\') => {
                    let (ch, next) = lex_escape(&chars, pos, tok_line)?;
                    pos = next;
                    ch
                }
                Some(&ch) if ch != '\'' && ch != '\n' => {
                    pos += 1;
                    ch
                }
                _ => return Err(ParseError::new(tok_line, "malformed character literal")),
            };
            if chars.get(pos) != Some(&'\'') {
                return Err(ParseError::new(tok_line, "unterminated character literal"));
            }
            pos += 1;
            push(&mut tokens, Token::Char(ch));
            continue;
        }

        if c == '$' && chars.get(pos + 1) == Some(&'"') {
            return Err(ParseError::new(
                tok_line,
                "interpolated strings are not supported",
            ));
        }

        let next = chars.get(pos + 1).copied();
        let third = chars.get(pos + 2).copied();
        let (token, len) = match (c, next, third) {
            ('<', Some('<'), Some('=')) => (Token::Assign(Some(BinaryOp::Shl)), 3),
            ('>', Some('>'), Some('=')) => (Token::Assign(Some(BinaryOp::Shr)), 3),
            ('<', Some('<'), _) => (Token::Shl, 2),
            ('>', Some('>'), _) => (Token::Shr, 2),
            ('<', Some('='), _) => (Token::Le, 2),
            ('>', Some('='), _) => (Token::Ge, 2),
            ('=', Some('='), _) => (Token::EqEq, 2),
            ('=', Some('>'), _) => (Token::Arrow, 2),
            ('!', Some('='), _) => (Token::NotEq, 2),
            ('&', Some('&'), _) => (Token::AndAnd, 2),
            ('|', Some('|'), _) => (Token::OrOr, 2),
            ('+', Some('+'), _) => (Token::PlusPlus, 2),
            ('-', Some('-'), _) => (Token::MinusMinus, 2),
            ('+', Some('='), _) => (Token::Assign(Some(BinaryOp::Add)), 2),
            ('-', Some('='), _) => (Token::Assign(Some(BinaryOp::Sub)), 2),
            ('*', Some('='), _) => (Token::Assign(Some(BinaryOp::Mul)), 2),
            ('/', Some('='), _) => (Token::Assign(Some(BinaryOp::Div)), 2),
            ('%', Some('='), _) => (Token::Assign(Some(BinaryOp::Mod)), 2),
            ('&', Some('='), _) => (Token::Assign(Some(BinaryOp::BitAnd)), 2),
            ('|', Some('='), _) => (Token::Assign(Some(BinaryOp::BitOr)), 2),
            ('^', Some('='), _) => (Token::Assign(Some(BinaryOp::Xor)), 2),
            ('(', _, _) => (Token::LParen, 1),
            (')', _, _) => (Token::RParen, 1),
            ('{', _, _) => (Token::LBrace, 1),
            ('}', _, _) => (Token::RBrace, 1),
            ('[', _, _) => (Token::LBracket, 1),
            (']', _, _) => (Token::RBracket, 1),
            (';', _, _) => (Token::Semi, 1),
            (',', _, _) => (Token::Comma, 1),
            ('.', _, _) => (Token::Dot, 1),
            (':', _, _) => (Token::Colon, 1),
            ('?', _, _) => (Token::Question, 1),
            ('=', _, _) => (Token::Assign(None), 1),
            ('<', _, _) => (Token::Lt, 1),
            ('>', _, _) => (Token::Gt, 1),
            ('!', _, _) => (Token::Bang, 1),
            ('~', _, _) => (Token::Tilde, 1),
            ('+', _, _) => (Token::Plus, 1),
            ('-', _, _) => (Token::Minus, 1),
            ('*', _, _) => (Token::Star, 1),
            ('/', _, _) => (Token::Slash, 1),
            ('%', _, _) => (Token::Percent, 1),
            ('&', _, _) => (Token::Amp, 1),
            ('|', _, _) => (Token::Pipe, 1),
            ('^', _, _) => (Token::Caret, 1),
            _ => {
                return Err(ParseError::new(
                    tok_line,
                    format!("unexpected character '{c}'"),
                ));
            }
        };
        push(&mut tokens, token);
        pos += len;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

fn lex_escape(chars: &[char], pos: usize, line: u32) -> Result<(char, usize), ParseError> {
    let Some(&esc) = chars.get(pos + 1) else {
        return Err(ParseError::new(line, "unterminated escape sequence"));
    };
    let ch = match esc {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        other => {
            return Err(ParseError::new(
                line,
                format!("unsupported escape sequence '\\{other}'"),
            ));
        }
    };
    Ok((ch, pos + 2))
}

/// Lex an integer or real literal starting at `start`, returning the token
/// and the position just past it (including any type suffix).
fn lex_number(chars: &[char], start: usize, line: u32) -> Result<(Token, usize), ParseError> {
    let mut pos = start;

    if chars[pos] == '0' && matches!(chars.get(pos + 1), Some('x') | Some('X')) {
        pos += 2;
        let digits_start = pos;
        while pos < chars.len() && (chars[pos].is_ascii_hexdigit() || chars[pos] == '_') {
            pos += 1;
        }
        let digits: String = chars[digits_start..pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let value = i64::from_str_radix(&digits, 16)
            .map_err(|_| ParseError::new(line, format!("invalid hex literal 0x{digits}")))?;
        pos = skip_int_suffix(chars, pos);
        return Ok((Token::Int(value), pos));
    }

    let mut is_real = false;
    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
        pos += 1;
    }
    if chars.get(pos) == Some(&'.') && chars.get(pos + 1).is_some_and(char::is_ascii_digit) {
        is_real = true;
        pos += 1;
        while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
            pos += 1;
        }
    }
    if matches!(chars.get(pos), Some('e') | Some('E')) {
        let mut p = pos + 1;
        if matches!(chars.get(p), Some('+') | Some('-')) {
            p += 1;
        }
        if chars.get(p).is_some_and(char::is_ascii_digit) {
            is_real = true;
            pos = p;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    let text: String = chars[start..pos].iter().filter(|c| **c != '_').collect();

    if matches!(
        chars.get(pos),
        Some('f') | Some('F') | Some('d') | Some('D') | Some('m') | Some('M')
    ) {
        is_real = true;
        pos += 1;
    }

    if is_real {
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::new(line, format!("invalid real literal {text}")))?;
        Ok((Token::Float(value), pos))
    } else {
        let value: i64 = text
            .parse()
            .map_err(|_| ParseError::new(line, format!("invalid integer literal {text}")))?;
        Ok((Token::Int(value), skip_int_suffix(chars, pos)))
    }
}

fn skip_int_suffix(chars: &[char], mut pos: usize) -> usize {
    while matches!(chars.get(pos), Some('u') | Some('U') | Some('l') | Some('L')) {
        pos += 1;
    }
    pos
}
