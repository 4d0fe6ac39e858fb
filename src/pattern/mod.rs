//! Structural pattern DSL over `Expr` trees: lexer, parser, helper
//! expansion and interpreter.

pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use interpreter::{Captured, is_known_node_type, node_type};
pub use lexer::{Lexer, Token};
pub use parser::{Parser, PatternNode, pattern_summary};

use crate::syntax::Expr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {message}")]
    Syntax { pattern: String, message: String },
    #[error("unknown helper #{0}")]
    UnknownHelper(String),
    #[error("helper #{0} refers to itself")]
    HelperCycle(String),
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),
}

/// Named sub-patterns, referenced as `#name` and expanded at compile time.
pub type Helpers<'h> = &'h [(&'h str, &'h str)];

/// A compiled pattern with all helper references expanded.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    root: PatternNode,
}

impl Pattern {
    pub fn compile(src: &str) -> Result<Pattern, PatternError> {
        Self::compile_with(src, &[])
    }

    pub fn compile_with(src: &str, helpers: Helpers<'_>) -> Result<Pattern, PatternError> {
        let mut active = Vec::new();
        let root = parse_expanded(src, helpers, &mut active)?;
        Ok(Pattern {
            source: src.to_string(),
            root,
        })
    }

    /// The pattern text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern text with helpers inlined.
    pub fn expanded(&self) -> String {
        pattern_summary(&self.root)
    }

    /// Captures in pattern order, or `None` when the pattern does not match.
    pub fn matches<'a>(&self, expr: &'a Expr) -> Option<Vec<Captured<'a>>> {
        let mut captures = Vec::new();
        interpreter::match_node(&self.root, expr, &mut captures).then_some(captures)
    }

    pub fn is_match(&self, expr: &Expr) -> bool {
        self.matches(expr).is_some()
    }
}

fn parse_expanded(
    src: &str,
    helpers: Helpers<'_>,
    active: &mut Vec<String>,
) -> Result<PatternNode, PatternError> {
    let tokens = Lexer::new(src).tokenize()?;
    let node = Parser::new(tokens, src).parse()?;
    expand(node, helpers, active)
}

fn expand(
    node: PatternNode,
    helpers: Helpers<'_>,
    active: &mut Vec<String>,
) -> Result<PatternNode, PatternError> {
    let expand_all = |nodes: Vec<PatternNode>, active: &mut Vec<String>| {
        nodes
            .into_iter()
            .map(|n| expand(n, helpers, active))
            .collect::<Result<Vec<_>, _>>()
    };

    Ok(match node {
        PatternNode::HelperCall(name) => {
            if active.contains(&name) {
                return Err(PatternError::HelperCycle(name));
            }
            let Some((_, body)) = helpers.iter().find(|(n, _)| *n == name) else {
                return Err(PatternError::UnknownHelper(name));
            };
            active.push(name);
            let expanded = parse_expanded(body, helpers, active);
            active.pop();
            expanded?
        }
        PatternNode::NodeMatch {
            node_type,
            children,
        } => {
            if !is_known_node_type(&node_type) {
                return Err(PatternError::UnknownNodeType(node_type));
            }
            PatternNode::NodeMatch {
                node_type,
                children: expand_all(children, active)?,
            }
        }
        PatternNode::Ident(name) => {
            if !is_known_node_type(&name) {
                return Err(PatternError::UnknownNodeType(name));
            }
            PatternNode::Ident(name)
        }
        PatternNode::Alternatives(alts) => PatternNode::Alternatives(expand_all(alts, active)?),
        PatternNode::Conjunction(items) => PatternNode::Conjunction(expand_all(items, active)?),
        PatternNode::Capture(inner) => {
            PatternNode::Capture(Box::new(expand(*inner, helpers, active)?))
        }
        PatternNode::Negation(inner) => {
            PatternNode::Negation(Box::new(expand(*inner, helpers, active)?))
        }
        leaf => leaf,
    })
}
