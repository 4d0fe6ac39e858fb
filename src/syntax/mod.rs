//! Syntax tree and front end for shop setup procedures.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{
    BinaryOp, CaseLabel, Declarator, Expr, ForInit, LocalDecl, Stmt, SwitchSection, UnaryOp,
};
pub use parser::{parse_expr, parse_procedure};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
