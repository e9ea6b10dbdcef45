//! The closed-sum formula AST (spec §2, §3, §9 — a tagged variant, not the
//! source's `hasattr`-probed node shapes).

use std::fmt;

use lattice_common::CellId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Pow => "^",
            BinOpKind::Concat => "&",
            BinOpKind::Eq => "=",
            BinOpKind::Ne => "<>",
            BinOpKind::Lt => "<",
            BinOpKind::Le => "<=",
            BinOpKind::Gt => ">",
            BinOpKind::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    Plus,
    Neg,
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOpKind::Plus => "+",
            UnaryOpKind::Neg => "-",
        })
    }
}

/// A reference to a single cell, optionally sheet-qualified (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: Option<String>,
    pub id: CellId,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{sheet}!{}", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}

/// `float` AST node per spec §3. Closed sum — exhaustive matching at every
/// consumer is the point (spec §9, replacing the source's `hasattr` probing).
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Text(String),
    Bool(bool),
    CellRef(CellRef),
    RangeRef { start: CellRef, end: CellRef },
    FuncCall { name_upper: String, args: Vec<Ast> },
    BinOp { op: BinOpKind, left: Box<Ast>, right: Box<Ast> },
    UnaryOp { op: UnaryOpKind, operand: Box<Ast> },
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", pretty_print(self))
    }
}

/// Render an AST back into formula text. Re-parsing the result yields a
/// structurally equal AST (spec §8 parse round-trip property); this is not
/// guaranteed to reproduce the *original* source text byte-for-byte (e.g.
/// redundant parens are dropped).
pub fn pretty_print(ast: &Ast) -> String {
    match ast {
        Ast::Number(n) => format!("{n}"),
        Ast::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        Ast::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Ast::CellRef(r) => r.to_string(),
        Ast::RangeRef { start, end } => format!("{start}:{end}"),
        Ast::FuncCall { name_upper, args } => {
            let args_str = args.iter().map(pretty_print).collect::<Vec<_>>().join(",");
            format!("{name_upper}({args_str})")
        }
        Ast::BinOp { op, left, right } => {
            format!("({}{op}{})", pretty_print(left), pretty_print(right))
        }
        Ast::UnaryOp { op, operand } => format!("({op}{})", pretty_print(operand)),
    }
}
