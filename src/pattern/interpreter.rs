//! Pattern interpreter: evaluation of compiled patterns against `Expr` nodes.
//!
//! Every node type exposes a positional child list. Child lists are matched
//! strictly (same arity) unless the pattern ends in `...`.
//!
//! | node type          | children                   |
//! |--------------------|----------------------------|
//! | `ident`            | `:Name`                    |
//! | `member`           | target, `:Name`            |
//! | `index`, `call`    | target/callee, args...     |
//! | unary (`not`, ...) | operand                    |
//! | binary (`eq`, ...) | left, right                |
//! | `paren`            | inner                      |
//! | `cast`             | `:type`, inner             |
//! | `assign`           | target, value              |
//! | `opassign`         | `:op`, target, value       |
//! | `cond`             | cond, then, otherwise      |
//! | `new`              | `:Type`, args...           |
//!
//! Value nodes (`int`, `float`, `str`, `char`) take a single child which is
//! matched against the node itself, so `(int 5)`, `(int _)` and `(int $_)`
//! all work.

use super::parser::PatternNode;
use crate::syntax::{BinaryOp, Expr, UnaryOp};

/// A value bound by a `$` capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Captured<'a> {
    Node(&'a Expr),
    Name(&'a str),
}

impl<'a> Captured<'a> {
    pub fn as_node(&self) -> Option<&'a Expr> {
        match self {
            Captured::Node(e) => Some(e),
            Captured::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&'a str> {
        match self {
            Captured::Name(n) => Some(n),
            Captured::Node(_) => None,
        }
    }
}

#[derive(Debug)]
enum MatchChild<'a> {
    Node(&'a Expr),
    Name(&'a str),
}

const VALUE_TYPES: &[&str] = &["int", "float", "str", "char"];

const STRUCTURAL_TYPES: &[&str] = &[
    "ident", "member", "index", "call", "paren", "cast", "assign", "opassign", "cond", "new",
    "true", "false", "null",
];

/// Whether `name` is a node type the interpreter knows about.
pub fn is_known_node_type(name: &str) -> bool {
    VALUE_TYPES.contains(&name)
        || STRUCTURAL_TYPES.contains(&name)
        || UnaryOp::from_name(name).is_some()
        || BinaryOp::from_name(name).is_some()
}

/// Node type name of an expression.
pub fn node_type(expr: &Expr) -> &'static str {
    match expr {
        Expr::Ident { .. } => "ident",
        Expr::Int { .. } => "int",
        Expr::Float { .. } => "float",
        Expr::Str { .. } => "str",
        Expr::Char { .. } => "char",
        Expr::Bool { value: true } => "true",
        Expr::Bool { value: false } => "false",
        Expr::Null => "null",
        Expr::Member { .. } => "member",
        Expr::Index { .. } => "index",
        Expr::Call { .. } => "call",
        Expr::Unary { op, .. } => op.name(),
        Expr::Binary { op, .. } => op.name(),
        Expr::Paren { .. } => "paren",
        Expr::Cast { .. } => "cast",
        Expr::Assign { op: None, .. } => "assign",
        Expr::Assign { op: Some(_), .. } => "opassign",
        Expr::Conditional { .. } => "cond",
        Expr::New { .. } => "new",
    }
}

fn get_children(expr: &Expr) -> Vec<MatchChild<'_>> {
    match expr {
        Expr::Ident { name } => vec![MatchChild::Name(name)],
        Expr::Member { target, name } => vec![MatchChild::Node(target), MatchChild::Name(name)],
        Expr::Index { target: head, args } | Expr::Call { callee: head, args } => {
            std::iter::once(MatchChild::Node(head))
                .chain(args.iter().map(MatchChild::Node))
                .collect()
        }
        Expr::Unary { operand, .. } => vec![MatchChild::Node(operand)],
        Expr::Binary { left, right, .. } => vec![MatchChild::Node(left), MatchChild::Node(right)],
        Expr::Paren { inner } => vec![MatchChild::Node(inner)],
        Expr::Cast { ty, inner } => vec![MatchChild::Name(ty), MatchChild::Node(inner)],
        Expr::Assign {
            op: None,
            target,
            value,
        } => vec![MatchChild::Node(target), MatchChild::Node(value)],
        Expr::Assign {
            op: Some(op),
            target,
            value,
        } => vec![
            MatchChild::Name(op.name()),
            MatchChild::Node(target),
            MatchChild::Node(value),
        ],
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => vec![
            MatchChild::Node(cond),
            MatchChild::Node(then),
            MatchChild::Node(otherwise),
        ],
        Expr::New { ty, args } => std::iter::once(MatchChild::Name(ty))
            .chain(args.iter().map(MatchChild::Node))
            .collect(),
        Expr::Int { .. }
        | Expr::Float { .. }
        | Expr::Str { .. }
        | Expr::Char { .. }
        | Expr::Bool { .. }
        | Expr::Null => Vec::new(),
    }
}

/// Match `pattern` against `expr`, appending captures in pattern order.
///
/// On failure `captures` is left exactly as it was on entry.
pub fn match_node<'a>(
    pattern: &PatternNode,
    expr: &'a Expr,
    captures: &mut Vec<Captured<'a>>,
) -> bool {
    let mark = captures.len();
    let ok = match_node_inner(pattern, expr, captures);
    if !ok {
        captures.truncate(mark);
    }
    ok
}

fn match_node_inner<'a>(
    pattern: &PatternNode,
    expr: &'a Expr,
    captures: &mut Vec<Captured<'a>>,
) -> bool {
    match pattern {
        PatternNode::Wildcard | PatternNode::Rest => true,

        PatternNode::IntLiteral(n) => matches!(expr, Expr::Int { value } if value == n),
        // Single precision: C# `0.35f` and pattern `0.35` agree.
        PatternNode::FloatLiteral(f) => {
            matches!(expr, Expr::Float { value } if (*value as f32) == (*f as f32))
        }
        PatternNode::StringLiteral(s) => matches!(expr, Expr::Str { value } if value == s),
        PatternNode::TrueLiteral => matches!(expr, Expr::Bool { value: true }),
        PatternNode::FalseLiteral => matches!(expr, Expr::Bool { value: false }),
        PatternNode::NullLiteral => matches!(expr, Expr::Null),

        PatternNode::Ident(name) => node_type(expr) == name,

        PatternNode::NodeMatch {
            node_type: wanted,
            children,
        } => {
            if node_type(expr) != wanted {
                return false;
            }
            if VALUE_TYPES.contains(&wanted.as_str()) {
                return match children.as_slice() {
                    [] => true,
                    [only] => match_node(only, expr, captures),
                    _ => false,
                };
            }
            matches_children_list(children, &get_children(expr), captures)
        }

        PatternNode::Alternatives(alts) => alts.iter().any(|alt| match_node(alt, expr, captures)),
        PatternNode::Conjunction(items) => {
            items.iter().all(|item| match_node(item, expr, captures))
        }
        PatternNode::Negation(inner) => {
            let mut scratch = Vec::new();
            !match_node(inner, expr, &mut scratch)
        }
        PatternNode::Capture(inner) => {
            let slot = captures.len();
            captures.push(Captured::Node(expr));
            if match_node(inner, expr, captures) {
                true
            } else {
                captures.truncate(slot);
                false
            }
        }

        // Names only match name slots; helpers are expanded at compile time.
        PatternNode::SymbolLiteral(_) | PatternNode::SymbolPrefix(_) => false,
        PatternNode::HelperCall(_) => false,
    }
}

/// Match a pattern against a name slot (identifier, member name, cast type).
fn matches_name<'a>(pattern: &PatternNode, name: &'a str, captures: &mut Vec<Captured<'a>>) -> bool {
    match pattern {
        PatternNode::Wildcard | PatternNode::Rest => true,
        PatternNode::SymbolLiteral(sym) => name == sym,
        PatternNode::SymbolPrefix(prefix) => name.starts_with(prefix.as_str()),
        PatternNode::Alternatives(alts) => {
            let mark = captures.len();
            for alt in alts {
                if matches_name(alt, name, captures) {
                    return true;
                }
                captures.truncate(mark);
            }
            false
        }
        PatternNode::Conjunction(items) => {
            let mark = captures.len();
            let ok = items.iter().all(|item| matches_name(item, name, captures));
            if !ok {
                captures.truncate(mark);
            }
            ok
        }
        PatternNode::Negation(inner) => !matches_name(inner, name, &mut Vec::new()),
        PatternNode::Capture(inner) => {
            let slot = captures.len();
            captures.push(Captured::Name(name));
            if matches_name(inner, name, captures) {
                true
            } else {
                captures.truncate(slot);
                false
            }
        }
        _ => false,
    }
}

fn matches_child<'a>(
    pattern: &PatternNode,
    child: &MatchChild<'a>,
    captures: &mut Vec<Captured<'a>>,
) -> bool {
    match child {
        MatchChild::Node(node) => match_node(pattern, node, captures),
        MatchChild::Name(name) => matches_name(pattern, name, captures),
    }
}

/// Walk patterns and actuals in parallel. `Rest` consumes everything that
/// remains; without it, the lengths must agree.
fn matches_children_list<'a>(
    patterns: &[PatternNode],
    actuals: &[MatchChild<'a>],
    captures: &mut Vec<Captured<'a>>,
) -> bool {
    let mut ai = 0;

    for pattern in patterns {
        if matches!(pattern, PatternNode::Rest) {
            return true;
        }
        let Some(actual) = actuals.get(ai) else {
            return false;
        };
        if !matches_child(pattern, actual, captures) {
            return false;
        }
        ai += 1;
    }

    ai == actuals.len()
}
