use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::evaluator::EvaluatedWorkbook;
use crate::grouper::group_orders;
use crate::layout::LayoutKind;
use crate::mapper::{map_rows, Mapped, Warning};
use crate::reader;
use crate::record::Order;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct ParseConfig {
    pub layout: LayoutKind,
    /// Overrides the layout's default sheet name
    pub sheet: Option<String>,
    /// Recalculate formulas instead of trusting cached values
    pub recalculate: bool,
}

impl ParseConfig {
    pub fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            sheet: None,
            recalculate: false,
        }
    }

    pub fn sheet_name(&self) -> &str {
        self.sheet
            .as_deref()
            .unwrap_or_else(|| self.layout.default_sheet())
    }
}

/// Outcome of parsing one workbook, shaped for the order API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,
    pub orders: Vec<Order>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    /// Process exit code for this outcome
    #[serde(skip)]
    pub exit_code: i32,
}

impl ParseReport {
    pub fn from_mapped(mapped: Mapped) -> Self {
        let orders = group_orders(mapped.items);
        let total_items = orders.iter().map(|o| o.items.len()).sum();

        Self {
            success: true,
            error: None,
            total_orders: Some(orders.len()),
            total_items: Some(total_items),
            orders,
            warnings: mapped.warnings,
            exit_code: 0,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            total_orders: None,
            total_items: None,
            orders: Vec::new(),
            warnings: Vec::new(),
            exit_code: error.exit_code(),
        }
    }
}

/// Parse a workbook file into grouped orders. Never fails: file-level
/// problems become a failure report.
pub fn parse_file(path: &Path, config: &ParseConfig) -> ParseReport {
    match load_items(path, config) {
        Ok(mapped) => ParseReport::from_mapped(mapped),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "parse failed");
            ParseReport::failure(&e)
        }
    }
}

/// Read the input sheet and map its data rows to line items.
pub fn load_items(path: &Path, config: &ParseConfig) -> Result<Mapped> {
    let sheet = config.sheet_name();
    let column_limit = config.layout.column_limit();
    info!(path = %path.display(), sheet, layout = ?config.layout, "reading workbook");

    let rows = if config.recalculate && is_xlsx(path) {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        EvaluatedWorkbook::load(path)?.sheet_rows(sheet, column_limit)?
    } else {
        if config.recalculate {
            warn!(path = %path.display(), "recalculation needs an xlsx file, using cached values");
        }
        let workbook = reader::open_workbook(path)?;
        reader::sheet_rows(&workbook, sheet, column_limit)?
    };

    let mapped = map_sheet_rows(config.layout, &rows)?;
    info!(
        items = mapped.items.len(),
        warnings = mapped.warnings.len(),
        "mapped input sheet"
    );
    Ok(mapped)
}

/// Map a sheet's rows, the first of which is the header row.
pub fn map_sheet_rows(kind: LayoutKind, rows: &[Vec<Cell>]) -> Result<Mapped> {
    let (header, data) = match rows.split_first() {
        Some((header, data)) => (Some(header.as_slice()), data),
        None => (None, rows),
    };

    let layout = kind.resolve(header)?;
    debug!(columns = layout.width(), rows = data.len(), "resolved layout");

    Ok(map_rows(&layout, data))
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false)
}
