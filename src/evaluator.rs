//! Formula recalculation using formualizer-workbook.
//!
//! Files saved by tools that never compute formulas carry no cached values,
//! so reading them directly yields empty totals. Recalculating first gives
//! the values a spreadsheet application would show.

use crate::cell::Cell;
use crate::error::{Error, Result};
use formualizer_workbook::{
    backends::UmyaAdapter,
    traits::{LoadStrategy, SpreadsheetReader},
    LiteralValue, Workbook, WorkbookConfig,
};
use std::path::Path;
use tracing::debug;

/// Workbook with every formula recalculated.
pub struct EvaluatedWorkbook {
    workbook: Workbook,
    sheet_names: Vec<String>,
}

impl EvaluatedWorkbook {
    /// Load and evaluate an xlsx file.
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |details: String| Error::InvalidExcel {
            path: path.to_path_buf(),
            details,
        };

        let adapter =
            UmyaAdapter::open_path(path).map_err(|e| invalid(format!("formualizer: {}", e)))?;

        // Names must be taken before the adapter is consumed
        let sheet_names = adapter
            .sheet_names()
            .map_err(|e| invalid(format!("formualizer: {}", e)))?;

        let mut workbook =
            Workbook::from_reader(adapter, LoadStrategy::EagerAll, WorkbookConfig::ephemeral())
                .map_err(|e| invalid(format!("formualizer: {}", e)))?;

        workbook
            .evaluate_all()
            .map_err(|e| invalid(format!("evaluation failed: {}", e)))?;

        debug!(sheets = sheet_names.len(), "recalculated workbook");

        Ok(Self {
            workbook,
            sheet_names,
        })
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Get the evaluated value of a cell.
    pub fn get_cell(&self, sheet: &str, row: u32, col: u32) -> Cell {
        self.workbook
            .get_value(sheet, row, col)
            .map(|value| literal_to_cell(&value))
            .unwrap_or_default()
    }

    /// Get the dimensions (max_col, max_row) of a sheet.
    pub fn get_sheet_dimensions(&self, sheet: &str) -> Option<(u32, u32)> {
        let sheet_store = self.workbook.engine().sheet_store();
        let asheet = sheet_store.sheet(sheet)?;

        let rows = asheet.nrows;
        let cols = asheet.columns.len() as u32;
        Some((cols, rows))
    }

    /// Read every row of a sheet as typed cells, header row included.
    /// `column_limit` caps how many leading columns are read.
    pub fn sheet_rows(&self, name: &str, column_limit: Option<u32>) -> Result<Vec<Vec<Cell>>> {
        let names = self.sheet_names();
        if !names.iter().any(|n| n == name) {
            return Err(Error::SheetNotFound {
                name: name.to_string(),
                available: names.join(", "),
            });
        }

        let (cols, max_row) = self.get_sheet_dimensions(name).unwrap_or((0, 0));
        let max_col = column_limit.map_or(cols, |limit| cols.min(limit));

        Ok((1..=max_row)
            .map(|row| (1..=max_col).map(|col| self.get_cell(name, row, col)).collect())
            .collect())
    }
}

fn literal_to_cell(value: &LiteralValue) -> Cell {
    match value {
        LiteralValue::Empty | LiteralValue::Pending => Cell::Empty,
        LiteralValue::Int(i) => Cell::Number(*i as f64),
        LiteralValue::Number(n) => Cell::Number(*n),
        LiteralValue::Text(s) if s.is_empty() => Cell::Empty,
        LiteralValue::Text(s) => Cell::Text(s.clone()),
        LiteralValue::Boolean(b) => Cell::Bool(*b),
        LiteralValue::Date(d) => d.and_hms_opt(0, 0, 0).map(Cell::DateTime).unwrap_or_default(),
        LiteralValue::DateTime(dt) => Cell::DateTime(*dt),
        LiteralValue::Time(t) => Cell::Text(t.format("%H:%M:%S").to_string()),
        LiteralValue::Duration(dur) => Cell::Text(format!("{}s", dur.num_seconds())),
        LiteralValue::Error(e) => Cell::Text(e.to_string()),
        LiteralValue::Array(_) => Cell::Text(String::from("{...}")),
    }
}
