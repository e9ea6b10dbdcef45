//! The workbook document model (spec §3): sheets of cells, each holding
//! either a literal value or formula text, plus whatever the last
//! processing pass computed for it.

use rustc_hash::FxHashMap;
use thiserror::Error;

use lattice_common::{AddressError, CellId};

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("invalid cell address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("no sheet named '{0}'")]
    SheetNotFound(String),
}

/// A cell's raw, engine-independent content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellContent {
    Empty,
    /// Raw stored text, classified into a number or text value when read
    /// (spec §3, §4.5) rather than pre-typed here.
    Literal(String),
    /// Formula text, including the leading `=`.
    Formula(String),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub content: CellContent,
    /// The formatted display string from the most recent
    /// [`crate::process_workbook`] pass, set only for formula cells (spec
    /// §4.6); raw cells are copied through unchanged and have no need of it.
    pub cached_value: Option<String>,
}

impl Cell {
    pub fn literal(text: impl Into<String>) -> Self {
        Cell { content: CellContent::Literal(text.into()), cached_value: None }
    }

    pub fn formula(text: impl Into<String>) -> Self {
        Cell { content: CellContent::Formula(text.into()), cached_value: None }
    }
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub name: String,
    pub cells: FxHashMap<CellId, Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet { name: name.into(), cells: FxHashMap::default() }
    }
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut Sheet {
        self.sheets.push(Sheet::new(name));
        self.sheets.last_mut().unwrap()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Set a cell's content by A1-style address, creating the sheet's entry
    /// if needed. Returns an error if `sheet` doesn't exist or `address`
    /// doesn't parse.
    pub fn set_cell(
        &mut self,
        sheet: &str,
        address: &str,
        content: CellContent,
    ) -> Result<(), WorkbookError> {
        let id = CellId::parse(address)?;
        let sheet = self
            .sheet_mut(sheet)
            .ok_or_else(|| WorkbookError::SheetNotFound(sheet.to_string()))?;
        sheet.cells.insert(id, Cell { content, cached_value: None });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_rejects_unknown_sheet() {
        let mut wb = Workbook::new();
        let err = wb.set_cell("Sheet1", "A1", CellContent::Literal("1".to_string()));
        assert!(matches!(err, Err(WorkbookError::SheetNotFound(_))));
    }

    #[test]
    fn set_cell_rejects_bad_address() {
        let mut wb = Workbook::new();
        wb.add_sheet("Sheet1");
        let err = wb.set_cell("Sheet1", "1A", CellContent::Literal("1".to_string()));
        assert!(matches!(err, Err(WorkbookError::InvalidAddress(_))));
    }

    #[test]
    fn set_cell_stores_content() {
        let mut wb = Workbook::new();
        wb.add_sheet("Sheet1");
        wb.set_cell("Sheet1", "A1", CellContent::Formula("=1+1".to_string())).unwrap();
        let cell = wb.sheet("Sheet1").unwrap().cells.get(&CellId::parse("A1").unwrap()).unwrap();
        assert_eq!(cell.content, CellContent::Formula("=1+1".to_string()));
    }
}
