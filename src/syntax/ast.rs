//! Syntax tree for the C# statement/expression subset used by shop setup
//! procedures.
//!
//! Both `Expr` and `Stmt` serialize internally tagged by `kind`, so a front
//! end written in another toolchain can hand over a JSON tree instead of
//! source text.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 8] = [
        UnaryOp::Not,
        UnaryOp::Neg,
        UnaryOp::Plus,
        UnaryOp::BitNot,
        UnaryOp::PreInc,
        UnaryOp::PreDec,
        UnaryOp::PostInc,
        UnaryOp::PostDec,
    ];

    /// Node type name used by the pattern DSL (`(not _)`, `(postinc _)`).
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "neg",
            UnaryOp::Plus => "plus",
            UnaryOp::BitNot => "bitnot",
            UnaryOp::PreInc => "preinc",
            UnaryOp::PreDec => "predec",
            UnaryOp::PostInc => "postinc",
            UnaryOp::PostDec => "postdec",
        }
    }

    pub fn from_name(name: &str) -> Option<UnaryOp> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    Xor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 18] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::BitOr,
        BinaryOp::Xor,
        BinaryOp::BitAnd,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
    ];

    /// Node type name used by the pattern DSL (`(eq _ _)`, `(and _ _)`).
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::BitOr => "bitor",
            BinaryOp::Xor => "xor",
            BinaryOp::BitAnd => "bitand",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        }
    }

    pub fn from_name(name: &str) -> Option<BinaryOp> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::Xor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// C# binding strength; higher binds tighter. All levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::Xor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
    },
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Str {
        value: String,
    },
    Char {
        value: char,
    },
    Bool {
        value: bool,
    },
    Null,
    /// `target.name`
    Member {
        target: Box<Expr>,
        name: String,
    },
    /// `target[args]`
    Index {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `callee(args)`; a method call has a `Member` callee.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Paren {
        inner: Box<Expr>,
    },
    Cast {
        ty: String,
        inner: Box<Expr>,
    },
    /// `target = value`, or a compound assignment such as `target += value`.
    Assign {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    New {
        ty: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident { name: name.into() }
    }

    pub fn int(value: i64) -> Expr {
        Expr::Int { value }
    }

    pub fn float(value: f64) -> Expr {
        Expr::Float { value }
    }

    pub fn member(target: Expr, name: impl Into<String>) -> Expr {
        Expr::Member {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn index(target: Expr, args: Vec<Expr>) -> Expr {
        Expr::Index {
            target: Box::new(target),
            args,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn paren(inner: Expr) -> Expr {
        Expr::Paren {
            inner: Box::new(inner),
        }
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::unary(UnaryOp::Not, operand)
    }

    /// Integer value of an `Int` literal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expr::Int { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident { name } => Some(name),
            _ => None,
        }
    }

    /// Peel any number of redundant parentheses.
    pub fn strip_parens(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { inner } = expr {
            expr = inner;
        }
        expr
    }

    /// Direct sub-expressions in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Ident { .. }
            | Expr::Int { .. }
            | Expr::Float { .. }
            | Expr::Str { .. }
            | Expr::Char { .. }
            | Expr::Bool { .. }
            | Expr::Null => Vec::new(),
            Expr::Member { target, .. } => vec![target],
            Expr::Index { target, args } => std::iter::once(&**target).chain(args).collect(),
            Expr::Call { callee, args } => std::iter::once(&**callee).chain(args).collect(),
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Paren { inner } | Expr::Cast { inner, .. } => vec![inner],
            Expr::Assign { target, value, .. } => vec![target, value],
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => vec![cond, then, otherwise],
            Expr::New { args, .. } => args.iter().collect(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident { name } => f.write_str(name),
            Expr::Int { value } => write!(f, "{value}"),
            Expr::Float { value } => {
                if value.is_finite() && value.fract() == 0.0 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            Expr::Str { value } => write!(f, "{value:?}"),
            Expr::Char { value } => write!(f, "'{}'", value.escape_default()),
            Expr::Bool { value } => write!(f, "{value}"),
            Expr::Null => f.write_str("null"),
            Expr::Member { target, name } => write!(f, "{target}.{name}"),
            Expr::Index { target, args } => {
                write!(f, "{target}[")?;
                write_list(f, args)?;
                f.write_str("]")
            }
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Unary { op, operand } => {
                if op.is_postfix() {
                    write!(f, "{operand}{}", op.symbol())
                } else {
                    write!(f, "{}{operand}", op.symbol())
                }
            }
            Expr::Binary { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::Paren { inner } => write!(f, "({inner})"),
            Expr::Cast { ty, inner } => write!(f, "({ty}){inner}"),
            Expr::Assign { op, target, value } => match op {
                Some(op) => write!(f, "{target} {}= {value}", op.symbol()),
                None => write!(f, "{target} = {value}"),
            },
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => write!(f, "{cond} ? {then} : {otherwise}"),
            Expr::New { ty, args } => {
                write!(f, "new {ty}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

/// `int a = 1, b;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub ty: String,
    pub vars: Vec<Declarator>,
}

impl fmt::Display for LocalDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.ty)?;
        for (i, var) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &var.init {
                Some(init) => write!(f, "{} = {init}", var.name)?,
                None => f.write_str(&var.name)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForInit {
    Decl(LocalDecl),
    Exprs { exprs: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseLabel {
    Case { value: Expr },
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSection {
    pub labels: Vec<CaseLabel>,
    pub body: Vec<Stmt>,
}

impl SwitchSection {
    /// Values of the `case` labels, skipping `default`.
    pub fn case_values(&self) -> impl Iterator<Item = &Expr> {
        self.labels.iter().filter_map(|label| match label {
            CaseLabel::Case { value } => Some(value),
            CaseLabel::Default => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Block {
        body: Vec<Stmt>,
    },
    Local(LocalDecl),
    Expr {
        expr: Expr,
    },
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Stmt>>,
    },
    Switch {
        scrutinee: Expr,
        sections: Vec<SwitchSection>,
    },
    For {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<ForInit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cond: Option<Expr>,
        #[serde(default)]
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    Foreach {
        ty: String,
        var: String,
        iter: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    Empty,
}

impl Stmt {
    pub fn expr(expr: Expr) -> Stmt {
        Stmt::Expr { expr }
    }

    pub fn block(body: Vec<Stmt>) -> Stmt {
        Stmt::Block { body }
    }

    /// One-line rendering of the statement head, without nested bodies.
    pub fn header(&self) -> String {
        match self {
            Stmt::Block { body } => format!("{{ {} statements }}", body.len()),
            Stmt::Local(decl) => format!("{decl};"),
            Stmt::Expr { expr } => format!("{expr};"),
            Stmt::If { cond, .. } => format!("if ({cond})"),
            Stmt::Switch { scrutinee, .. } => format!("switch ({scrutinee})"),
            Stmt::For {
                init, cond, step, ..
            } => {
                let init = match init {
                    Some(ForInit::Decl(decl)) => decl.to_string(),
                    Some(ForInit::Exprs { exprs }) => join(exprs),
                    None => String::new(),
                };
                let cond = cond.as_ref().map(Expr::to_string).unwrap_or_default();
                format!("for ({init}; {cond}; {})", join(step))
            }
            Stmt::While { cond, .. } => format!("while ({cond})"),
            Stmt::DoWhile { cond, .. } => format!("do ... while ({cond});"),
            Stmt::Foreach { ty, var, iter, .. } => format!("foreach ({ty} {var} in {iter})"),
            Stmt::Break => "break;".to_string(),
            Stmt::Continue => "continue;".to_string(),
            Stmt::Return { value: Some(v) } => format!("return {v};"),
            Stmt::Return { value: None } => "return;".to_string(),
            Stmt::Empty => ";".to_string(),
        }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(Expr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
