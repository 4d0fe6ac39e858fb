//! Pattern DSL parser.
//!
//! Parses a token stream into a `PatternNode` tree.

use super::PatternError;
use super::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    /// (node_type child1 child2 ...)
    NodeMatch {
        node_type: String,
        children: Vec<PatternNode>,
    },
    /// {a | b | c}
    Alternatives(Vec<PatternNode>),
    /// [a b c]
    Conjunction(Vec<PatternNode>),
    /// $pattern
    Capture(Box<PatternNode>),
    /// _
    Wildcard,
    /// ...
    Rest,
    /// !pattern
    Negation(Box<PatternNode>),
    /// #helper, replaced by the helper's pattern when compiled
    HelperCall(String),
    /// :Name
    SymbolLiteral(String),
    /// :prefix*
    SymbolPrefix(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    TrueLiteral,
    FalseLiteral,
    NullLiteral,
    /// Bare node type name, matching any node of that type
    Ident(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    source: String,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, source: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            source: source.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(tok)
    }

    fn error(&self, message: impl Into<String>) -> PatternError {
        PatternError::Syntax {
            pattern: self.source.clone(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), PatternError> {
        match self.advance() {
            Some(tok) if &tok == expected => Ok(()),
            Some(tok) => Err(self.error(format!("expected {expected:?}, got {tok:?}"))),
            None => Err(self.error(format!("expected {expected:?}, got end of pattern"))),
        }
    }

    /// Parse exactly one pattern; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<PatternNode, PatternError> {
        let node = self.parse_node()?;
        if let Some(tok) = self.peek() {
            return Err(self.error(format!("trailing token {tok:?}")));
        }
        Ok(node)
    }

    fn parse_node(&mut self) -> Result<PatternNode, PatternError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error("unexpected end of pattern"));
        };

        match tok {
            Token::LParen => self.parse_sequence(),
            Token::LBrace => self.parse_alternatives(),
            Token::LBracket => self.parse_conjunction(),
            Token::Capture => {
                self.advance();
                let inner = self.parse_node()?;
                Ok(PatternNode::Capture(Box::new(inner)))
            }
            Token::Negation => {
                self.advance();
                let inner = self.parse_node()?;
                Ok(PatternNode::Negation(Box::new(inner)))
            }
            Token::Wildcard => {
                self.advance();
                Ok(PatternNode::Wildcard)
            }
            Token::Rest => {
                self.advance();
                Ok(PatternNode::Rest)
            }
            Token::HelperCall(name) => {
                self.advance();
                Ok(PatternNode::HelperCall(name))
            }
            Token::SymbolLiteral(name) => {
                self.advance();
                Ok(PatternNode::SymbolLiteral(name))
            }
            Token::SymbolPrefix(prefix) => {
                self.advance();
                Ok(PatternNode::SymbolPrefix(prefix))
            }
            Token::IntLiteral(n) => {
                self.advance();
                Ok(PatternNode::IntLiteral(n))
            }
            Token::FloatLiteral(f) => {
                self.advance();
                Ok(PatternNode::FloatLiteral(f))
            }
            Token::StringLiteral(s) => {
                self.advance();
                Ok(PatternNode::StringLiteral(s))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(match name.as_str() {
                    "true" => PatternNode::TrueLiteral,
                    "false" => PatternNode::FalseLiteral,
                    "null" => PatternNode::NullLiteral,
                    _ => PatternNode::Ident(name),
                })
            }
            Token::RParen | Token::RBrace | Token::RBracket | Token::Pipe => {
                Err(self.error(format!("unexpected {tok:?}")))
            }
        }
    }

    fn parse_sequence(&mut self) -> Result<PatternNode, PatternError> {
        self.expect(&Token::LParen)?;

        let node_type = match self.advance() {
            Some(Token::Ident(name)) => name,
            Some(tok) => return Err(self.error(format!("expected node type, got {tok:?}"))),
            None => return Err(self.error("expected node type, got end of pattern")),
        };

        let mut children = Vec::new();
        while self.peek().is_some_and(|t| t != &Token::RParen) {
            children.push(self.parse_node()?);
        }
        self.expect(&Token::RParen)?;

        Ok(PatternNode::NodeMatch {
            node_type,
            children,
        })
    }

    fn parse_alternatives(&mut self) -> Result<PatternNode, PatternError> {
        self.expect(&Token::LBrace)?;
        let mut alts = Vec::new();

        while self.peek().is_some_and(|t| t != &Token::RBrace) {
            if self.peek() == Some(&Token::Pipe) {
                self.advance();
                continue;
            }
            alts.push(self.parse_node()?);
        }

        self.expect(&Token::RBrace)?;
        if alts.is_empty() {
            return Err(self.error("empty alternatives"));
        }
        Ok(PatternNode::Alternatives(alts))
    }

    fn parse_conjunction(&mut self) -> Result<PatternNode, PatternError> {
        self.expect(&Token::LBracket)?;
        let mut items = Vec::new();

        while self.peek().is_some_and(|t| t != &Token::RBracket) {
            items.push(self.parse_node()?);
        }

        self.expect(&Token::RBracket)?;
        Ok(PatternNode::Conjunction(items))
    }
}

/// Render a pattern node back to DSL text (helpers already expanded show
/// their bodies inline).
pub fn pattern_summary(node: &PatternNode) -> String {
    match node {
        PatternNode::NodeMatch {
            node_type,
            children,
        } => {
            if children.is_empty() {
                return format!("({node_type})");
            }
            let child_summaries: Vec<String> = children.iter().map(pattern_summary).collect();
            format!("({node_type} {})", child_summaries.join(" "))
        }
        PatternNode::Wildcard => "_".to_string(),
        PatternNode::Rest => "...".to_string(),
        PatternNode::TrueLiteral => "true".to_string(),
        PatternNode::FalseLiteral => "false".to_string(),
        PatternNode::NullLiteral => "null".to_string(),
        PatternNode::SymbolLiteral(s) => format!(":{s}"),
        PatternNode::SymbolPrefix(s) => format!(":{s}*"),
        PatternNode::IntLiteral(n) => n.to_string(),
        PatternNode::FloatLiteral(f) => format!("{f:?}"),
        PatternNode::StringLiteral(s) => format!("'{s}'"),
        PatternNode::Capture(inner) => format!("${}", pattern_summary(inner)),
        PatternNode::Alternatives(alts) => {
            let inner: Vec<String> = alts.iter().map(pattern_summary).collect();
            format!("{{{}}}", inner.join(" "))
        }
        PatternNode::Conjunction(items) => {
            let inner: Vec<String> = items.iter().map(pattern_summary).collect();
            format!("[{}]", inner.join(" "))
        }
        PatternNode::Negation(inner) => format!("!{}", pattern_summary(inner)),
        PatternNode::HelperCall(name) => format!("#{name}"),
        PatternNode::Ident(name) => name.clone(),
    }
}
