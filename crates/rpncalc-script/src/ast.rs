//! Syntax tree for script text.

use std::sync::Arc;

use crate::value::Value;

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinOp {
    /// Get the precedence of this operator (higher binds tighter).
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => 2,
            BinOp::Pow => 4,
        }
    }

    /// Check if this operator is right-associative.
    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinOp::Pow)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// Comparison operators; chains like `a < b < c` keep one entry per link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// A parameter of a `def` or `lambda`.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Arc<str>,
    pub default: Option<Expr>,
}

/// A function body shared between the syntax tree and the function value.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Arc<str>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(Arc<str>),
    Attribute(Box<Expr>, Arc<str>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
    Subscript(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Lambda(Arc<FunctionDef>),
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn name(name: &str) -> Self {
        Expr::Name(name.into())
    }

    pub fn int(n: i64) -> Self {
        Expr::Literal(Value::Int(n))
    }
}

/// What a `from m import ...` statement binds.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportNames {
    All,
    Names(Vec<(String, Option<String>)>),
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign(Arc<str>, Expr),
    AugAssign(Arc<str>, BinOp, Expr),
    Def(Arc<FunctionDef>),
    Return(Option<Expr>),
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Arc<str>,
        iter: Expr,
        body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Pass,
    Import {
        module: String,
        alias: Option<String>,
    },
    FromImport {
        module: String,
        names: ImportNames,
    },
    Del(Vec<Arc<str>>),
}
