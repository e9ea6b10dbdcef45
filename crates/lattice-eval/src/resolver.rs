//! The seam between the evaluator and whatever holds cell values — a single
//! safe trait object rather than the thread-local raw-pointer resolver the
//! upstream workbook binding used.

use lattice_common::{CellId, Value};

/// Supplies cell values to the evaluator during a single formula evaluation.
/// Implementors decide what "currently known" means — a plain cell store for
/// literal values, or a cache keyed by already-evaluated results during
/// topological processing.
pub trait ValueResolver {
    /// The sheet a sheet-less `CellRef` resolves against.
    fn current_sheet(&self) -> &str;

    /// The value currently stored/evaluated for `sheet!cell`. Implementors
    /// return `Value::Empty` for a cell that has no value yet, never panic.
    fn cell_value(&self, sheet: &str, cell: CellId) -> Value;
}

/// A resolver backed by a flat map of fully-qualified keys to values, for
/// callers evaluating a single ad-hoc formula outside of a workbook
/// (spec §4.6 `evaluate_formula`).
pub struct MapResolver<'a> {
    sheet: &'a str,
    values: &'a rustc_hash::FxHashMap<String, Value>,
}

impl<'a> MapResolver<'a> {
    pub fn new(sheet: &'a str, values: &'a rustc_hash::FxHashMap<String, Value>) -> Self {
        MapResolver { sheet, values }
    }
}

impl ValueResolver for MapResolver<'_> {
    fn current_sheet(&self) -> &str {
        self.sheet
    }

    fn cell_value(&self, sheet: &str, cell: CellId) -> Value {
        let key = lattice_common::fqk(sheet, cell);
        self.values.get(&key).cloned().unwrap_or(Value::Empty)
    }
}
