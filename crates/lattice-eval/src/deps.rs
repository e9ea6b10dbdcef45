//! Dependency extraction (spec §4.3): walk a parsed formula and collect the
//! fully-qualified keys of every cell it reads, expanding ranges to their
//! member cells and de-duplicating. A range wider than the cell-count cap,
//! or whose two endpoints name different sheets, poisons the whole formula
//! to `#REF!` instead of materializing a dependency set.

use rustc_hash::FxHashSet;

use lattice_common::{fqk, CellId};
use lattice_parse::{Ast, CellRef};

use crate::interpreter::MAX_RANGE_CELLS;

/// The result of extracting one formula's dependencies.
pub enum Dependencies {
    Ok(FxHashSet<String>),
    /// A range reference was invalid (oversized, or its endpoints named
    /// different sheets); the owning formula is poisoned to `#REF!`.
    RangeTooLarge,
}

pub fn extract(ast: &Ast, current_sheet: &str) -> Dependencies {
    let mut out = FxHashSet::default();
    if !walk(ast, current_sheet, &mut out) {
        return Dependencies::RangeTooLarge;
    }
    Dependencies::Ok(out)
}

fn walk(ast: &Ast, current_sheet: &str, out: &mut FxHashSet<String>) -> bool {
    match ast {
        Ast::Number(_) | Ast::Text(_) | Ast::Bool(_) => true,
        Ast::CellRef(r) => {
            out.insert(fqk_of(r, current_sheet));
            true
        }
        Ast::RangeRef { start, end } => add_range(start, end, current_sheet, out),
        Ast::FuncCall { args, .. } => args.iter().all(|a| walk(a, current_sheet, out)),
        Ast::BinOp { left, right, .. } => {
            walk(left, current_sheet, out) && walk(right, current_sheet, out)
        }
        Ast::UnaryOp { operand, .. } => walk(operand, current_sheet, out),
    }
}

fn fqk_of(r: &CellRef, current_sheet: &str) -> String {
    let sheet = r.sheet.as_deref().unwrap_or(current_sheet);
    fqk(sheet, r.id.without_anchors())
}

fn add_range(start: &CellRef, end: &CellRef, current_sheet: &str, out: &mut FxHashSet<String>) -> bool {
    if start.sheet.is_some() && end.sheet.is_some() && start.sheet != end.sheet {
        return false;
    }
    let sheet = start
        .sheet
        .as_deref()
        .or(end.sheet.as_deref())
        .unwrap_or(current_sheet);

    let (c0, c1) = (start.id.col.min(end.id.col), start.id.col.max(end.id.col));
    let (r0, r1) = (start.id.row.min(end.id.row), start.id.row.max(end.id.row));

    let width = (c1 - c0 + 1) as u64;
    let height = (r1 - r0 + 1) as u64;
    if width.saturating_mul(height) > MAX_RANGE_CELLS {
        return false;
    }

    for row in r0..=r1 {
        for col in c0..=c1 {
            out.insert(fqk(sheet, CellId::new(col, row, false, false)));
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_parse::parse;

    fn deps(src: &str) -> FxHashSet<String> {
        match extract(&parse(src).unwrap(), "Sheet1") {
            Dependencies::Ok(d) => d,
            Dependencies::RangeTooLarge => panic!("unexpected poison"),
        }
    }

    #[test]
    fn collects_single_cell_refs() {
        let d = deps("=A1+B2");
        assert_eq!(d.len(), 2);
        assert!(d.contains("Sheet1!A1"));
        assert!(d.contains("Sheet1!B2"));
    }

    #[test]
    fn expands_ranges() {
        let d = deps("=SUM(A1:B2)");
        assert_eq!(d.len(), 4);
        for key in ["Sheet1!A1", "Sheet1!A2", "Sheet1!B1", "Sheet1!B2"] {
            assert!(d.contains(key));
        }
    }

    #[test]
    fn cross_sheet_ref_uses_its_own_sheet() {
        let d = deps("=Other!A1");
        assert!(d.contains("Other!A1"));
        assert!(!d.contains("Sheet1!A1"));
    }

    #[test]
    fn anchors_do_not_create_distinct_dependency_identity() {
        let d = deps("=$A$1+A1");
        assert_eq!(d.len(), 1);
        assert!(d.contains("Sheet1!A1"));
    }

    #[test]
    fn oversized_range_poisons_instead_of_expanding() {
        let ast = parse("=SUM(A1:A9999999)").unwrap();
        match extract(&ast, "Sheet1") {
            Dependencies::RangeTooLarge => {}
            Dependencies::Ok(_) => panic!("expected range-too-large poison"),
        }
    }

    #[test]
    fn mismatched_sheet_range_poisons() {
        let ast = parse("=SUM(Sheet1!A1:Sheet2!B2)").unwrap();
        match extract(&ast, "Sheet1") {
            Dependencies::RangeTooLarge => {}
            Dependencies::Ok(_) => panic!("expected mismatched-sheet poison"),
        }
    }
}
