//! AST evaluation: operator semantics (spec §4.5.1), range expansion, and
//! builtin dispatch with lazy argument access.

use lattice_common::{CellId, ErrorKind, Value};
use lattice_parse::{Ast, BinOpKind, CellRef, UnaryOpKind};

use crate::builtins;
use crate::resolver::ValueResolver;

/// Range expansion is capped at the classic spreadsheet cell-count ceiling;
/// a range wider than this poisons to `#REF!` rather than materializing an
/// unbounded array (spec §4.3).
pub const MAX_RANGE_CELLS: u64 = 1_048_576;

/// A single formula argument, evaluated on first access rather than eagerly —
/// this is what lets `IF` skip the untaken branch (spec §4.5 IF laziness).
pub struct ArgumentHandle<'a> {
    ast: &'a Ast,
    resolver: &'a dyn ValueResolver,
}

impl<'a> ArgumentHandle<'a> {
    pub fn new(ast: &'a Ast, resolver: &'a dyn ValueResolver) -> Self {
        ArgumentHandle { ast, resolver }
    }

    pub fn value(&self) -> Value {
        evaluate(self.ast, self.resolver)
    }
}

/// Evaluate a parsed formula against a resolver.
pub fn evaluate(ast: &Ast, resolver: &dyn ValueResolver) -> Value {
    match ast {
        Ast::Number(n) => Value::Number(*n),
        Ast::Text(s) => Value::Text(s.clone()),
        Ast::Bool(b) => Value::Bool(*b),
        Ast::CellRef(r) => eval_cell_ref(r, resolver),
        Ast::RangeRef { start, end } => eval_range_ref(start, end, resolver),
        Ast::FuncCall { name_upper, args } => {
            let handles: Vec<ArgumentHandle> =
                args.iter().map(|a| ArgumentHandle::new(a, resolver)).collect();
            builtins::dispatch(name_upper, &handles)
        }
        Ast::BinOp { op, left, right } => eval_binop(*op, left, right, resolver),
        Ast::UnaryOp { op, operand } => eval_unary(*op, operand, resolver),
    }
}

fn eval_cell_ref(r: &CellRef, resolver: &dyn ValueResolver) -> Value {
    let sheet = r.sheet.as_deref().unwrap_or_else(|| resolver.current_sheet());
    resolver.cell_value(sheet, r.id)
}

fn eval_range_ref(start: &CellRef, end: &CellRef, resolver: &dyn ValueResolver) -> Value {
    if start.sheet.is_some() && end.sheet.is_some() && start.sheet != end.sheet {
        return Value::Error(ErrorKind::Ref);
    }
    let sheet = start
        .sheet
        .as_deref()
        .or(end.sheet.as_deref())
        .unwrap_or_else(|| resolver.current_sheet());

    let (c0, c1) = (start.id.col.min(end.id.col), start.id.col.max(end.id.col));
    let (r0, r1) = (start.id.row.min(end.id.row), start.id.row.max(end.id.row));

    let width = (c1 - c0 + 1) as u64;
    let height = (r1 - r0 + 1) as u64;
    if width.saturating_mul(height) > MAX_RANGE_CELLS {
        return Value::Error(ErrorKind::Ref);
    }

    let mut out = Vec::with_capacity((width * height) as usize);
    for row in r0..=r1 {
        for col in c0..=c1 {
            let id = CellId::new(col, row, false, false);
            out.push(resolver.cell_value(sheet, id));
        }
    }
    Value::Array(out)
}

/// Error propagation: the first operand evaluated that is an error wins,
/// short-circuiting evaluation of the other side (spec §4.5.1).
fn eval_binop(op: BinOpKind, left: &Ast, right: &Ast, resolver: &dyn ValueResolver) -> Value {
    let lv = evaluate(left, resolver);
    if lv.is_error() {
        return lv;
    }
    let rv = evaluate(right, resolver);
    if rv.is_error() {
        return rv;
    }
    apply_binop(op, &lv, &rv)
}

pub fn apply_binop(op: BinOpKind, lv: &Value, rv: &Value) -> Value {
    match op {
        BinOpKind::Add => numeric_op(lv, rv, |a, b| Ok(a + b)),
        BinOpKind::Sub => numeric_op(lv, rv, |a, b| Ok(a - b)),
        BinOpKind::Mul => numeric_op(lv, rv, |a, b| Ok(a * b)),
        BinOpKind::Div => numeric_op(lv, rv, |a, b| {
            if b == 0.0 {
                Err(ErrorKind::Div0)
            } else {
                Ok(a / b)
            }
        }),
        BinOpKind::Pow => numeric_op(lv, rv, |a, b| {
            if a == 0.0 && b == 0.0 {
                Ok(1.0)
            } else if a < 0.0 && b.fract() != 0.0 {
                Err(ErrorKind::Value)
            } else {
                Ok(a.powf(b))
            }
        }),
        BinOpKind::Concat => {
            let lt = match lv.to_text() {
                Ok(t) => t,
                Err(e) => return Value::Error(e),
            };
            let rt = match rv.to_text() {
                Ok(t) => t,
                Err(e) => return Value::Error(e),
            };
            Value::Text(format!("{lt}{rt}"))
        }
        BinOpKind::Eq => comparison_to_value(lv, rv, |o| o == std::cmp::Ordering::Equal),
        BinOpKind::Ne => comparison_to_value(lv, rv, |o| o != std::cmp::Ordering::Equal),
        BinOpKind::Lt => comparison_to_value(lv, rv, |o| o == std::cmp::Ordering::Less),
        BinOpKind::Le => comparison_to_value(lv, rv, |o| o != std::cmp::Ordering::Greater),
        BinOpKind::Gt => comparison_to_value(lv, rv, |o| o == std::cmp::Ordering::Greater),
        BinOpKind::Ge => comparison_to_value(lv, rv, |o| o != std::cmp::Ordering::Less),
    }
}

fn comparison_to_value(lv: &Value, rv: &Value, f: impl FnOnce(std::cmp::Ordering) -> bool) -> Value {
    match compare(lv, rv) {
        Ok(ord) => Value::Bool(f(ord)),
        Err(e) => Value::Error(e),
    }
}

fn numeric_op(lv: &Value, rv: &Value, f: impl Fn(f64, f64) -> Result<f64, ErrorKind>) -> Value {
    let a = match lv.to_number() {
        Ok(n) => n,
        Err(e) => return Value::Error(e),
    };
    let b = match rv.to_number() {
        Ok(n) => n,
        Err(e) => return Value::Error(e),
    };
    match f(a, b) {
        Ok(n) => Value::Number(n),
        Err(e) => Value::Error(e),
    }
}

/// The three comparison domains, in the spec's mixed-type total order:
/// numbers < text < booleans (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ComparisonDomain {
    Number,
    Text,
    Bool,
}

/// `Empty` has no domain of its own — it takes on whichever domain it's
/// compared against (0 against a number, "" against text), defaulting to
/// the numeric domain when both sides are `Empty` (spec §4.5). `Array`
/// classifies by its first element, mirroring `Value::to_number`/`to_text`.
fn classify(v: &Value) -> Option<ComparisonDomain> {
    match v {
        Value::Number(_) => Some(ComparisonDomain::Number),
        Value::Text(_) => Some(ComparisonDomain::Text),
        Value::Bool(_) => Some(ComparisonDomain::Bool),
        Value::Empty => None,
        Value::Error(_) => None,
        Value::Array(items) => items.first().and_then(classify),
    }
}

/// Same-domain operands compare numerically or lexicographically; operands
/// in different domains are ordered by domain alone, regardless of value
/// (spec §4.5: "numbers < text < booleans").
fn compare(lv: &Value, rv: &Value) -> Result<std::cmp::Ordering, ErrorKind> {
    let ld = classify(lv);
    let rd = classify(rv);
    let domain = match (ld, rd) {
        (Some(a), Some(b)) if a == b => a,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => ComparisonDomain::Number,
        (Some(a), Some(b)) => return Ok(a.cmp(&b)),
    };
    match domain {
        ComparisonDomain::Number | ComparisonDomain::Bool => {
            let a = lv.to_number()?;
            let b = rv.to_number()?;
            Ok(a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal))
        }
        ComparisonDomain::Text => {
            let a = lv.to_text()?;
            let b = rv.to_text()?;
            Ok(a.cmp(&b))
        }
    }
}

fn eval_unary(op: UnaryOpKind, operand: &Ast, resolver: &dyn ValueResolver) -> Value {
    let v = evaluate(operand, resolver);
    if v.is_error() {
        return v;
    }
    let n = match v.to_number() {
        Ok(n) => n,
        Err(e) => return Value::Error(e),
    };
    match op {
        UnaryOpKind::Plus => Value::Number(n),
        UnaryOpKind::Neg => Value::Number(-n),
    }
}
