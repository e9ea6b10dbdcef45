//! The single-threaded synchronous processing pass (spec §4.7): build the
//! FQK index, parse formulas, extract dependencies, build the graph, detect
//! cycles, evaluate in topological order, and report a summary.

use rustc_hash::FxHashMap;

use lattice_common::{ErrorKind, Value};
use lattice_parse::{parse, Ast};

use crate::deps::{self, Dependencies};
use crate::graph::{DependencyGraph, TopoResult};
use crate::interpreter::evaluate;
use crate::resolver::MapResolver;

/// One cell's raw content, as handed to the processor — a value computed
/// independently of the engine (a literal) or formula text to be parsed and
/// evaluated.
#[derive(Debug, Clone)]
pub enum CellContent {
    Literal(Value),
    Formula(String),
}

/// One input cell: its fully-qualified identity plus its raw content.
#[derive(Debug, Clone)]
pub struct CellInput {
    pub fqk: String,
    pub sheet: String,
    pub content: CellContent,
}

#[derive(Debug, Clone, Default)]
pub struct SheetSummary {
    pub evaluated_count: usize,
    pub error_count: usize,
}

/// Aggregate outcome of one processing pass (modeled on the kind of
/// recalculate summary a spreadsheet engine reports back to its caller).
#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    pub evaluated_count: usize,
    pub error_count: usize,
    pub sheets: FxHashMap<String, SheetSummary>,
}

impl ProcessSummary {
    fn record(&mut self, sheet: &str, is_error: bool) {
        self.evaluated_count += 1;
        let entry = self.sheets.entry(sheet.to_string()).or_default();
        entry.evaluated_count += 1;
        if is_error {
            self.error_count += 1;
            entry.error_count += 1;
        }
    }
}

pub struct ProcessOutput {
    pub values: FxHashMap<String, Value>,
    pub summary: ProcessSummary,
}

/// Run the full processing pass over a flat cell list (spec §4.7 steps 1-7).
pub fn process(cells: &[CellInput]) -> ProcessOutput {
    trace_process_start(cells.len());

    let mut values: FxHashMap<String, Value> = FxHashMap::default();
    let mut sheet_of: FxHashMap<String, String> = FxHashMap::default();
    let mut ast_cache: FxHashMap<String, Ast> = FxHashMap::default();
    let mut graph = DependencyGraph::new();
    let mut summary = ProcessSummary::default();

    // Step 1-2: index cells, parse formulas.
    for cell in cells {
        sheet_of.insert(cell.fqk.clone(), cell.sheet.clone());
        match &cell.content {
            CellContent::Literal(v) => {
                values.insert(cell.fqk.clone(), v.clone());
            }
            CellContent::Formula(text) => match parse(text) {
                Ok(ast) => {
                    ast_cache.insert(cell.fqk.clone(), ast);
                }
                Err(_) => {
                    trace_parse_failure(&cell.fqk);
                    values.insert(cell.fqk.clone(), Value::Error(ErrorKind::Error));
                    summary.record(&cell.sheet, true);
                }
            },
        }
    }

    // Step 3-4: extract dependencies, build the graph.
    for (fqk, ast) in &ast_cache {
        let sheet = &sheet_of[fqk];
        match deps::extract(ast, sheet) {
            Dependencies::Ok(set) => {
                graph.add_node(fqk);
                for dep in set {
                    graph.add_edge(fqk, &dep);
                }
            }
            Dependencies::RangeTooLarge => {
                values.insert(fqk.clone(), Value::Error(ErrorKind::Ref));
                summary.record(sheet, true);
            }
        }
    }
    // Formulas poisoned by an oversized range never enter the graph, so they
    // can't be evaluated or appear in a cycle; drop them from ast_cache.
    ast_cache.retain(|fqk, _| !values.contains_key(fqk));

    // Step 5: detect cycles.
    let order = match graph.topological_order() {
        TopoResult::Acyclic(order) => order,
        TopoResult::Cyclic { order, poisoned } => {
            trace_cycle_detected(poisoned.len());
            for fqk in poisoned {
                if ast_cache.contains_key(&fqk) {
                    let sheet = &sheet_of[&fqk];
                    values.insert(fqk.clone(), Value::Error(ErrorKind::Cycle));
                    summary.record(sheet, true);
                }
            }
            order
        }
    };

    // Step 6: evaluate in topological order.
    for fqk in &order {
        let Some(ast) = ast_cache.get(fqk) else { continue };
        let sheet = sheet_of[fqk].clone();
        let value = {
            let resolver = MapResolver::new(&sheet, &values);
            evaluate(ast, &resolver)
        };
        let is_error = value.is_error();
        values.insert(fqk.clone(), value);
        summary.record(&sheet, is_error);
    }

    // Step 7: emit.
    trace_process_end(&summary);
    ProcessOutput { values, summary }
}

#[cfg(feature = "tracing")]
fn trace_process_start(cell_count: usize) {
    tracing::debug!(cell_count, "processing workbook");
}
#[cfg(not(feature = "tracing"))]
fn trace_process_start(_cell_count: usize) {}

#[cfg(feature = "tracing")]
fn trace_parse_failure(fqk: &str) {
    tracing::debug!(fqk, "formula failed to parse");
}
#[cfg(not(feature = "tracing"))]
fn trace_parse_failure(_fqk: &str) {}

#[cfg(feature = "tracing")]
fn trace_cycle_detected(poisoned_count: usize) {
    tracing::debug!(poisoned_count, "dependency cycle detected");
}
#[cfg(not(feature = "tracing"))]
fn trace_cycle_detected(_poisoned_count: usize) {}

#[cfg(feature = "tracing")]
fn trace_process_end(summary: &ProcessSummary) {
    tracing::debug!(
        evaluated = summary.evaluated_count,
        errors = summary.error_count,
        "workbook processed"
    );
}
#[cfg(not(feature = "tracing"))]
fn trace_process_end(_summary: &ProcessSummary) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(fqk: &str, sheet: &str, content: CellContent) -> CellInput {
        CellInput { fqk: fqk.to_string(), sheet: sheet.to_string(), content }
    }

    #[test]
    fn evaluates_a_dependency_chain() {
        let cells = vec![
            cell("Sheet1!A1", "Sheet1", CellContent::Literal(Value::Number(2.0))),
            cell("Sheet1!B1", "Sheet1", CellContent::Formula("=A1*2".to_string())),
            cell("Sheet1!C1", "Sheet1", CellContent::Formula("=B1+1".to_string())),
        ];
        let out = process(&cells);
        assert_eq!(out.values["Sheet1!B1"], Value::Number(4.0));
        assert_eq!(out.values["Sheet1!C1"], Value::Number(5.0));
        assert_eq!(out.summary.evaluated_count, 2);
        assert_eq!(out.summary.error_count, 0);
    }

    #[test]
    fn cross_sheet_reference_resolves() {
        let cells = vec![
            cell("Sheet1!A1", "Sheet1", CellContent::Literal(Value::Number(10.0))),
            cell("Sheet2!A1", "Sheet2", CellContent::Formula("=Sheet1!A1+1".to_string())),
        ];
        let out = process(&cells);
        assert_eq!(out.values["Sheet2!A1"], Value::Number(11.0));
    }

    #[test]
    fn direct_cycle_poisons_both_cells() {
        let cells = vec![
            cell("Sheet1!A1", "Sheet1", CellContent::Formula("=B1".to_string())),
            cell("Sheet1!B1", "Sheet1", CellContent::Formula("=A1".to_string())),
        ];
        let out = process(&cells);
        assert_eq!(out.values["Sheet1!A1"], Value::Error(ErrorKind::Cycle));
        assert_eq!(out.values["Sheet1!B1"], Value::Error(ErrorKind::Cycle));
        assert_eq!(out.summary.error_count, 2);
    }

    #[test]
    fn sum_over_range_dependency() {
        let cells = vec![
            cell("Sheet1!A1", "Sheet1", CellContent::Literal(Value::Number(1.0))),
            cell("Sheet1!A2", "Sheet1", CellContent::Literal(Value::Number(2.0))),
            cell("Sheet1!A3", "Sheet1", CellContent::Formula("=SUM(A1:A2)".to_string())),
        ];
        let out = process(&cells);
        assert_eq!(out.values["Sheet1!A3"], Value::Number(3.0));
    }

    #[test]
    fn unparseable_formula_becomes_error_sentinel() {
        let cells = vec![cell("Sheet1!A1", "Sheet1", CellContent::Formula("=1+".to_string()))];
        let out = process(&cells);
        assert_eq!(out.values["Sheet1!A1"], Value::Error(ErrorKind::Error));
        assert_eq!(out.summary.error_count, 1);
    }

    #[test]
    fn per_sheet_summary_breakdown() {
        let cells = vec![
            cell("Sheet1!A1", "Sheet1", CellContent::Formula("=1+1".to_string())),
            cell("Sheet2!A1", "Sheet2", CellContent::Formula("=1/0".to_string())),
        ];
        let out = process(&cells);
        assert_eq!(out.summary.sheets["Sheet1"].error_count, 0);
        assert_eq!(out.summary.sheets["Sheet2"].error_count, 1);
    }
}
