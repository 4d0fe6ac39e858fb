//! Recursive-descent parser producing `Stmt`/`Expr` trees.
//!
//! Fail-fast: the first unexpected token aborts with a `ParseError`.

use super::ParseError;
use super::ast::{
    BinaryOp, CaseLabel, Declarator, Expr, ForInit, LocalDecl, Stmt, SwitchSection, UnaryOp,
};
use super::lexer::{Spanned, Token, lex};

const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "float",
    "double", "decimal", "char", "string", "object",
];

const RESERVED: &[&str] = &[
    "if", "else", "switch", "case", "default", "for", "foreach", "while", "do", "break",
    "continue", "return", "new", "true", "false", "null", "in", "goto", "throw", "try",
    "catch", "finally", "using", "lock", "is", "as",
];

/// Parse a procedure: either a bare statement list, or a single method
/// declaration whose body is returned.
pub fn parse_procedure(src: &str) -> Result<Vec<Stmt>, ParseError> {
    let tokens = lex(src)?;
    let mut parser = Parser::new(&tokens);
    parser.skip_attributes();
    if parser.at_method_header() {
        parser.skip_method_header()?;
        parser.expect(&Token::LBrace, "'{' to open method body")?;
        let body = parser.parse_statements_until_rbrace()?;
        parser.expect(&Token::RBrace, "'}' to close method body")?;
        parser.expect(&Token::Eof, "end of input after method body")?;
        Ok(body)
    } else {
        let mut body = Vec::new();
        while parser.peek() != &Token::Eof {
            body.push(parser.parse_statement()?);
        }
        Ok(body)
    }
}

/// Parse a single expression (the whole input must be consumed).
pub fn parse_expr(src: &str) -> Result<Expr, ParseError> {
    let tokens = lex(src)?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expr()?;
    parser.expect(&Token::Eof, "end of expression")?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &'a Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'a Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &'a Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn advance(&mut self) -> &'a Spanned {
        let t = self.cur();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.cur().line, msg)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {what}, got {:?}", self.peek())))
        }
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(s) if s == w)
    }

    fn eat_word(&mut self, w: &str) -> bool {
        if self.is_word(w) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn take_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Token::Word(w) if !RESERVED.contains(&w.as_str()) => {
                let w = w.clone();
                self.advance();
                Ok(w)
            }
            other => Err(self.err(format!("expected identifier, got {other:?}"))),
        }
    }

    // -- Method header -------------------------------------------

    fn skip_attributes(&mut self) {
        while self.peek() == &Token::LBracket {
            let mut depth = 0usize;
            loop {
                match self.advance().token {
                    Token::LBracket => depth += 1,
                    Token::RBracket => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    Token::Eof => return,
                    _ => {}
                }
            }
        }
    }

    /// A method header is a run of words (modifiers, return type, name)
    /// ending with two adjacent identifiers right before the first `(`.
    fn at_method_header(&self) -> bool {
        let mut i = self.pos;
        while let Token::Word(_) | Token::Dot | Token::LBracket | Token::RBracket =
            &self.tokens[i].token
        {
            i += 1;
        }
        i >= self.pos + 2
            && self.tokens[i].token == Token::LParen
            && matches!(&self.tokens[i - 1].token, Token::Word(_))
            && matches!(&self.tokens[i - 2].token, Token::Word(w) if !RESERVED.contains(&w.as_str()))
    }

    fn skip_method_header(&mut self) -> Result<(), ParseError> {
        while self.peek() != &Token::LParen {
            self.advance();
        }
        let mut depth = 0usize;
        loop {
            match self.advance().token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::Eof => return Err(self.err("unterminated parameter list")),
                _ => {}
            }
        }
    }

    // -- Statements ----------------------------------------------

    fn parse_statements_until_rbrace(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        while self.peek() != &Token::RBrace {
            if self.peek() == &Token::Eof {
                return Err(self.err("unexpected end of input, expected '}'"));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::LBrace, "'{'")?;
        let body = self.parse_statements_until_rbrace()?;
        self.expect(&Token::RBrace, "'}'")?;
        Ok(Stmt::Block { body })
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(&Token::LParen, "'('")?;
        let expr = self.parse_expr()?;
        self.expect(&Token::RParen, "')'")?;
        Ok(expr)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Token::LBrace => return self.parse_block(),
            Token::Semi => {
                self.advance();
                return Ok(Stmt::Empty);
            }
            _ => {}
        }

        if self.eat_word("if") {
            let cond = self.parse_paren_expr()?;
            let then = Box::new(self.parse_statement()?);
            let otherwise = if self.eat_word("else") {
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };
            return Ok(Stmt::If {
                cond,
                then,
                otherwise,
            });
        }
        if self.eat_word("switch") {
            return self.parse_switch();
        }
        if self.eat_word("for") {
            return self.parse_for();
        }
        if self.eat_word("foreach") {
            self.expect(&Token::LParen, "'(' after foreach")?;
            let ty = self.parse_type_name()?;
            let var = self.take_ident()?;
            if !self.eat_word("in") {
                return Err(self.err("expected 'in' in foreach"));
            }
            let iter = self.parse_expr()?;
            self.expect(&Token::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::Foreach {
                ty,
                var,
                iter,
                body,
            });
        }
        if self.eat_word("while") {
            let cond = self.parse_paren_expr()?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::While { cond, body });
        }
        if self.eat_word("do") {
            let body = Box::new(self.parse_statement()?);
            if !self.eat_word("while") {
                return Err(self.err("expected 'while' after do body"));
            }
            let cond = self.parse_paren_expr()?;
            self.expect(&Token::Semi, "';'")?;
            return Ok(Stmt::DoWhile { body, cond });
        }
        if self.eat_word("break") {
            self.expect(&Token::Semi, "';' after break")?;
            return Ok(Stmt::Break);
        }
        if self.eat_word("continue") {
            self.expect(&Token::Semi, "';' after continue")?;
            return Ok(Stmt::Continue);
        }
        if self.eat_word("return") {
            let value = if self.peek() == &Token::Semi {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(&Token::Semi, "';' after return")?;
            return Ok(Stmt::Return { value });
        }
        for unsupported in ["goto", "throw", "try", "using", "lock"] {
            if self.is_word(unsupported) {
                return Err(self.err(format!("'{unsupported}' statements are not supported")));
            }
        }

        if self.at_declaration() {
            let decl = self.parse_local_decl()?;
            self.expect(&Token::Semi, "';' after declaration")?;
            return Ok(Stmt::Local(decl));
        }

        let expr = self.parse_expr()?;
        self.expect(&Token::Semi, "';' after expression")?;
        Ok(Stmt::Expr { expr })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let scrutinee = self.parse_paren_expr()?;
        self.expect(&Token::LBrace, "'{' to open switch")?;
        let mut sections = Vec::new();
        while self.peek() != &Token::RBrace {
            let mut labels = Vec::new();
            loop {
                if self.eat_word("case") {
                    let value = self.parse_expr()?;
                    if self.is_word("when") {
                        return Err(self.err("case guards are not supported"));
                    }
                    self.expect(&Token::Colon, "':' after case label")?;
                    labels.push(CaseLabel::Case { value });
                } else if self.eat_word("default") {
                    self.expect(&Token::Colon, "':' after default")?;
                    labels.push(CaseLabel::Default);
                } else {
                    break;
                }
            }
            if labels.is_empty() {
                return Err(self.err(format!(
                    "expected 'case' or 'default', got {:?}",
                    self.peek()
                )));
            }
            let mut body = Vec::new();
            while !self.is_word("case") && !self.is_word("default") && self.peek() != &Token::RBrace
            {
                if self.peek() == &Token::Eof {
                    return Err(self.err("unexpected end of input in switch"));
                }
                body.push(self.parse_statement()?);
            }
            sections.push(SwitchSection { labels, body });
        }
        self.expect(&Token::RBrace, "'}' to close switch")?;
        Ok(Stmt::Switch {
            scrutinee,
            sections,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::LParen, "'(' after for")?;
        let init = if self.peek() == &Token::Semi {
            None
        } else if self.at_declaration() {
            Some(ForInit::Decl(self.parse_local_decl()?))
        } else {
            Some(ForInit::Exprs {
                exprs: self.parse_expr_list(&Token::Semi)?,
            })
        };
        self.expect(&Token::Semi, "';' after for initializer")?;
        let cond = if self.peek() == &Token::Semi {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::Semi, "';' after for condition")?;
        let step = if self.peek() == &Token::RParen {
            Vec::new()
        } else {
            self.parse_expr_list(&Token::RParen)?
        };
        self.expect(&Token::RParen, "')' to close for header")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn parse_expr_list(&mut self, close: &Token) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        if self.peek() == close {
            return Ok(exprs);
        }
        loop {
            exprs.push(self.parse_expr()?);
            if self.peek() == &Token::Comma {
                self.advance();
            } else {
                return Ok(exprs);
            }
        }
    }

    /// Lookahead: `Type name =`, `Type name;` or `Type name,` where Type is a
    /// dotted name with optional `[]` or `?` suffixes.
    fn at_declaration(&self) -> bool {
        let mut i = 0;
        match self.peek_at(i) {
            Token::Word(w) if !RESERVED.contains(&w.as_str()) => i += 1,
            _ => return false,
        }
        loop {
            match (self.peek_at(i), self.peek_at(i + 1)) {
                (Token::Dot, Token::Word(_)) => i += 2,
                (Token::LBracket, Token::RBracket) => i += 2,
                (Token::Question, _) => i += 1,
                _ => break,
            }
        }
        matches!(self.peek_at(i), Token::Word(w) if !RESERVED.contains(&w.as_str()))
            && matches!(
                self.peek_at(i + 1),
                Token::Assign(None) | Token::Semi | Token::Comma
            )
    }

    fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let mut ty = self.take_ident()?;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Token::Dot, Token::Word(w)) => {
                    ty.push('.');
                    ty.push_str(w);
                    self.advance();
                    self.advance();
                }
                (Token::LBracket, Token::RBracket) => {
                    ty.push_str("[]");
                    self.advance();
                    self.advance();
                }
                (Token::Question, _) => {
                    ty.push('?');
                    self.advance();
                }
                (Token::Lt, _) => return Err(self.err("generic types are not supported")),
                _ => return Ok(ty),
            }
        }
    }

    fn parse_local_decl(&mut self) -> Result<LocalDecl, ParseError> {
        let ty = self.parse_type_name()?;
        let mut vars = Vec::new();
        loop {
            let name = self.take_ident()?;
            let init = if self.peek() == &Token::Assign(None) {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            vars.push(Declarator { name, init });
            if self.peek() == &Token::Comma {
                self.advance();
            } else {
                return Ok(LocalDecl { ty, vars });
            }
        }
    }

    // -- Expressions ---------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_conditional()?;
        if let Token::Assign(op) = self.peek() {
            let op = *op;
            self.advance();
            let value = self.parse_expr()?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        if self.peek() == &Token::Arrow {
            return Err(self.err("lambda expressions are not supported"));
        }
        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if self.peek() != &Token::Question {
            return Ok(cond);
        }
        self.advance();
        let then = self.parse_expr()?;
        self.expect(&Token::Colon, "':' in conditional expression")?;
        let otherwise = self.parse_conditional()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek() {
            Token::OrOr => BinaryOp::Or,
            Token::AndAnd => BinaryOp::And,
            Token::Pipe => BinaryOp::BitOr,
            Token::Caret => BinaryOp::Xor,
            Token::Amp => BinaryOp::BitAnd,
            Token::EqEq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::Ne,
            Token::Lt => BinaryOp::Lt,
            Token::Le => BinaryOp::Le,
            Token::Gt => BinaryOp::Gt,
            Token::Ge => BinaryOp::Ge,
            Token::Shl => BinaryOp::Shl,
            Token::Shr => BinaryOp::Shr,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Bang => UnaryOp::Not,
            Token::Tilde => UnaryOp::BitNot,
            Token::Plus => UnaryOp::Plus,
            Token::PlusPlus => UnaryOp::PreInc,
            Token::MinusMinus => UnaryOp::PreDec,
            Token::Minus => {
                // Negative numeric literals fold into the literal itself.
                match self.peek_at(1) {
                    Token::Int(n) => {
                        let n = *n;
                        self.advance();
                        self.advance();
                        return self.parse_postfix(Expr::int(-n));
                    }
                    Token::Float(v) => {
                        let v = *v;
                        self.advance();
                        self.advance();
                        return self.parse_postfix(Expr::float(-v));
                    }
                    _ => UnaryOp::Neg,
                }
            }
            Token::LParen if self.at_cast() => {
                self.advance();
                let Token::Word(ty) = self.advance().token.clone() else {
                    return Err(self.err("expected cast type"));
                };
                self.expect(&Token::RParen, "')' after cast type")?;
                let inner = self.parse_unary()?;
                return Ok(Expr::Cast {
                    ty,
                    inner: Box::new(inner),
                });
            }
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn at_cast(&self) -> bool {
        matches!(self.peek_at(1), Token::Word(w) if PRIMITIVE_TYPES.contains(&w.as_str()))
            && self.peek_at(2) == &Token::RParen
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let Token::Word(name) = self.advance().token.clone() else {
                        return Err(self.err("expected member name after '.'"));
                    };
                    if self.peek() == &Token::Lt && self.generic_call_ahead() {
                        return Err(self.err("generic method calls are not supported"));
                    }
                    expr = Expr::member(expr, name);
                }
                Token::LParen => {
                    self.advance();
                    let args = self.parse_args(&Token::RParen)?;
                    self.expect(&Token::RParen, "')' to close argument list")?;
                    expr = Expr::call(expr, args);
                }
                Token::LBracket => {
                    self.advance();
                    let args = self.parse_args(&Token::RBracket)?;
                    self.expect(&Token::RBracket, "']' to close index")?;
                    expr = Expr::index(expr, args);
                }
                Token::PlusPlus => {
                    self.advance();
                    expr = Expr::unary(UnaryOp::PostInc, expr);
                }
                Token::MinusMinus => {
                    self.advance();
                    expr = Expr::unary(UnaryOp::PostDec, expr);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `Name<T>(` after a member name.
    fn generic_call_ahead(&self) -> bool {
        matches!(self.peek_at(1), Token::Word(_))
            && self.peek_at(2) == &Token::Gt
            && self.peek_at(3) == &Token::LParen
    }

    fn parse_args(&mut self, close: &Token) -> Result<Vec<Expr>, ParseError> {
        for modifier in ["out", "ref"] {
            if self.is_word(modifier) {
                return Err(self.err(format!("'{modifier}' arguments are not supported")));
            }
        }
        self.parse_expr_list(close)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.advance();
        match &spanned.token {
            Token::Int(value) => Ok(Expr::Int { value: *value }),
            Token::Float(value) => Ok(Expr::Float { value: *value }),
            Token::Str(value) => Ok(Expr::Str {
                value: value.clone(),
            }),
            Token::Char(value) => Ok(Expr::Char { value: *value }),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::paren(inner))
            }
            Token::Word(w) => match w.as_str() {
                "true" => Ok(Expr::Bool { value: true }),
                "false" => Ok(Expr::Bool { value: false }),
                "null" => Ok(Expr::Null),
                "new" => {
                    let ty = self.parse_type_name()?;
                    if self.peek() != &Token::LParen {
                        return Err(self.err("only 'new T(args)' creation is supported"));
                    }
                    self.advance();
                    let args = self.parse_args(&Token::RParen)?;
                    self.expect(&Token::RParen, "')' to close constructor arguments")?;
                    if self.peek() == &Token::LBrace {
                        return Err(self.err("object initializers are not supported"));
                    }
                    Ok(Expr::New { ty, args })
                }
                w if RESERVED.contains(&w) => Err(ParseError::new(
                    spanned.line,
                    format!("unexpected keyword '{w}' in expression"),
                )),
                _ => Ok(Expr::ident(w.clone())),
            },
            other => Err(ParseError::new(
                spanned.line,
                format!("unexpected token {other:?} in expression"),
            )),
        }
    }
}
