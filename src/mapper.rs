use crate::cell::Cell;
use crate::coerce::{normalize_amount, normalize_date, parse_float};
use crate::layout::{Field, Layout};
use crate::record::{Amount, LineItem, NumericKind};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

/// First sheet row holding data; row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// A non-fatal observation about one sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub row: usize,
    pub message: String,
}

/// Items mapped from a sheet plus anything that was skipped or defaulted.
#[derive(Debug, Default)]
pub struct Mapped {
    pub items: Vec<LineItem>,
    pub warnings: Vec<Warning>,
}

/// Map one positional row. Returns `None` when the order number is blank.
pub fn map_row(layout: &Layout, cells: &[Cell]) -> Option<LineItem> {
    let mut defaulted = Vec::new();
    map_positional(layout, cells, &mut defaulted)
}

/// Map one row given as header name to cell. Headers are resolved through
/// the alias table; the first header claiming a field wins.
pub fn map_named(named: &IndexMap<String, Cell>, numeric: NumericKind) -> Option<LineItem> {
    let mut resolved: IndexMap<Field, &Cell> = IndexMap::new();
    for (header, cell) in named {
        if let Some(field) = Field::from_header(header) {
            resolved.entry(field).or_insert(cell);
        }
    }

    let mut defaulted = Vec::new();
    build_item(|f| resolved.get(&f).copied(), numeric, &mut defaulted)
}

/// Map every data row of a sheet. `rows` starts at `FIRST_DATA_ROW`.
pub fn map_rows(layout: &Layout, rows: &[Vec<Cell>]) -> Mapped {
    let mut mapped = Mapped::default();

    for (idx, cells) in rows.iter().enumerate() {
        let row = idx + FIRST_DATA_ROW;

        if cells.iter().all(Cell::is_blank) {
            continue;
        }

        let mut defaulted = Vec::new();
        let Some(item) = map_positional(layout, cells, &mut defaulted) else {
            warn!(row, "skipping row without order number");
            mapped.warnings.push(Warning {
                row,
                message: "skipped: missing order number".to_string(),
            });
            continue;
        };

        for (field, raw) in defaulted {
            warn!(row, field = field.name(), value = %raw, "non-numeric value defaulted to 0");
            mapped.warnings.push(Warning {
                row,
                message: format!("{}: \"{}\" is not a number, using 0", field.name(), raw),
            });
        }

        debug!(row, order = %item.order_number, "mapped row");
        mapped.items.push(item);
    }

    mapped
}

fn map_positional(
    layout: &Layout,
    cells: &[Cell],
    defaulted: &mut Vec<(Field, String)>,
) -> Option<LineItem> {
    build_item(
        |field| layout.position(field).and_then(|idx| cells.get(idx)),
        layout.numeric(),
        defaulted,
    )
}

fn build_item<'a, F>(
    get: F,
    numeric: NumericKind,
    defaulted: &mut Vec<(Field, String)>,
) -> Option<LineItem>
where
    F: Fn(Field) -> Option<&'a Cell>,
{
    let order_number = get(Field::OrderNumber)?.to_string().trim().to_string();
    if order_number.is_empty() {
        return None;
    }

    let text = |field: Field| get(field).map(Cell::to_string).unwrap_or_default();
    let date = |field: Field| get(field).map(normalize_date).unwrap_or_default();
    let mut amount = |field: Field| match get(field) {
        Some(cell) => {
            if parse_float(cell).is_none() {
                defaulted.push((field, cell.to_string()));
            }
            normalize_amount(cell, numeric)
        }
        None => Amount::zero(numeric),
    };

    Some(LineItem {
        quantity: amount(Field::Quantity),
        unit_price: amount(Field::UnitPrice),
        supply_amount: amount(Field::SupplyAmount),
        tax_amount: amount(Field::TaxAmount),
        total_amount: amount(Field::TotalAmount),
        order_number,
        order_date: date(Field::OrderDate),
        site_name: text(Field::SiteName),
        category_lv1: text(Field::CategoryLv1),
        category_lv2: text(Field::CategoryLv2),
        category_lv3: text(Field::CategoryLv3),
        item_name: text(Field::ItemName),
        specification: text(Field::Specification),
        due_date: date(Field::DueDate),
        vendor_name: text(Field::VendorName),
        delivery_name: text(Field::DeliveryName),
        note: text(Field::Note),
    })
}
