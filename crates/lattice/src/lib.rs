//! Public API: parse formulas, evaluate one ad-hoc formula against a
//! workbook snapshot, or recalculate a whole workbook.

pub mod format;
pub mod model;

pub use format::{format_value, ProcessorConfig};
pub use model::{Cell, CellContent, Sheet, Workbook, WorkbookError};

pub use lattice_common::{classify_literal, fqk, AddressError, CellId, ErrorKind, Value};
pub use lattice_eval::{ProcessSummary, SheetSummary};
pub use lattice_parse::{Ast, ParseError};

use rustc_hash::FxHashMap;

use lattice_eval::resolver::MapResolver;
use lattice_eval::{CellContent as EvalCellContent, CellInput};

/// Parse formula text (leading `=` optional) into an AST without evaluating it.
pub fn parse_formula(text: &str) -> Result<Ast, ParseError> {
    lattice_parse::parse(text)
}

/// Evaluate one formula against a snapshot of a workbook's current values,
/// without running a full dependency-ordered recalculation. Useful for a
/// what-if formula typed into a cell that hasn't been committed yet.
pub fn evaluate_formula(text: &str, workbook: &Workbook, sheet: &str) -> Value {
    let ast = match parse_formula(text) {
        Ok(ast) => ast,
        Err(_) => return Value::Error(ErrorKind::Error),
    };
    let snapshot = snapshot_values(workbook);
    let resolver = MapResolver::new(sheet, &snapshot);
    lattice_eval::evaluate(&ast, &resolver)
}

/// Recalculate every formula in the workbook: parse, extract dependencies,
/// detect cycles, and evaluate in topological order (spec §4.7). Returns a
/// new workbook whose formula cells carry a freshly formatted `cached_value`
/// (spec §4.6); raw cells are copied through unchanged.
pub fn process_workbook(workbook: &Workbook, config: &ProcessorConfig) -> (Workbook, ProcessSummary) {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("process_workbook", sheets = workbook.sheets.len()).entered();

    let inputs = to_cell_inputs(workbook);
    let output = lattice_eval::process(&inputs);

    let mut result = workbook.clone();
    for sheet in &mut result.sheets {
        for (id, cell) in sheet.cells.iter_mut() {
            if !matches!(cell.content, CellContent::Formula(_)) {
                continue;
            }
            let key = fqk(&sheet.name, id.without_anchors());
            cell.cached_value = output.values.get(&key).map(|v| format_value(v, config));
        }
    }
    (result, output.summary)
}

fn to_cell_inputs(workbook: &Workbook) -> Vec<CellInput> {
    let mut out = Vec::new();
    for sheet in &workbook.sheets {
        for (id, cell) in &sheet.cells {
            let fqk = fqk(&sheet.name, id.without_anchors());
            let content = match &cell.content {
                CellContent::Empty => EvalCellContent::Literal(Value::Empty),
                CellContent::Literal(text) => EvalCellContent::Literal(classify_literal(text)),
                CellContent::Formula(text) => EvalCellContent::Formula(text.clone()),
            };
            out.push(CellInput { fqk, sheet: sheet.name.clone(), content });
        }
    }
    out
}

/// Build a typed value snapshot for ad-hoc evaluation (`evaluate_formula`):
/// a formula cell's last formatted output is re-classified the same way a
/// raw cell's text would be, so referencing it loses exactly the type
/// fidelity a reload from formatted text would (e.g. a cached `"True"` reads
/// back as text, not a boolean) rather than none at all.
fn snapshot_values(workbook: &Workbook) -> FxHashMap<String, Value> {
    let mut values = FxHashMap::default();
    for sheet in &workbook.sheets {
        for (id, cell) in &sheet.cells {
            let key = fqk(&sheet.name, id.without_anchors());
            let raw = cell.cached_value.as_deref().or_else(|| match &cell.content {
                CellContent::Literal(text) => Some(text.as_str()),
                _ => None,
            });
            let value = raw.map(classify_literal).unwrap_or(Value::Empty);
            values.insert(key, value);
        }
    }
    values
}
