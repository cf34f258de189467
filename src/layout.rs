//! Column layouts for the purchase-order input sheets.
//!
//! Several incompatible sheet shapes exist. The caller picks one explicitly;
//! nothing here guesses a layout from the data.

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::record::NumericKind;
use clap::ValueEnum;

/// A normalized line-item field a column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OrderNumber,
    OrderDate,
    SiteName,
    CategoryLv1,
    CategoryLv2,
    CategoryLv3,
    ItemName,
    Specification,
    Quantity,
    UnitPrice,
    SupplyAmount,
    TaxAmount,
    TotalAmount,
    DueDate,
    VendorName,
    DeliveryName,
    Note,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::OrderNumber => "orderNumber",
            Field::OrderDate => "orderDate",
            Field::SiteName => "siteName",
            Field::CategoryLv1 => "categoryLv1",
            Field::CategoryLv2 => "categoryLv2",
            Field::CategoryLv3 => "categoryLv3",
            Field::ItemName => "itemName",
            Field::Specification => "specification",
            Field::Quantity => "quantity",
            Field::UnitPrice => "unitPrice",
            Field::SupplyAmount => "supplyAmount",
            Field::TaxAmount => "taxAmount",
            Field::TotalAmount => "totalAmount",
            Field::DueDate => "dueDate",
            Field::VendorName => "vendorName",
            Field::DeliveryName => "deliveryName",
            Field::Note => "note",
        }
    }

    /// Resolve a header cell text to a field.
    pub fn from_header(header: &str) -> Option<Field> {
        let key = header.trim();
        HEADER_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
            .map(|(_, field)| *field)
    }
}

const HEADER_ALIASES: &[(&str, Field)] = &[
    ("발주번호", Field::OrderNumber),
    ("orderNumber", Field::OrderNumber),
    ("order_number", Field::OrderNumber),
    ("발주일", Field::OrderDate),
    ("발주일자", Field::OrderDate),
    ("orderDate", Field::OrderDate),
    ("order_date", Field::OrderDate),
    ("현장명", Field::SiteName),
    ("프로젝트명", Field::SiteName),
    ("siteName", Field::SiteName),
    ("site_name", Field::SiteName),
    ("대분류", Field::CategoryLv1),
    ("categoryLv1", Field::CategoryLv1),
    ("category_lv1", Field::CategoryLv1),
    ("중분류", Field::CategoryLv2),
    ("categoryLv2", Field::CategoryLv2),
    ("category_lv2", Field::CategoryLv2),
    ("소분류", Field::CategoryLv3),
    ("categoryLv3", Field::CategoryLv3),
    ("category_lv3", Field::CategoryLv3),
    ("품목명", Field::ItemName),
    ("품목", Field::ItemName),
    ("itemName", Field::ItemName),
    ("item_name", Field::ItemName),
    ("규격", Field::Specification),
    ("specification", Field::Specification),
    ("수량", Field::Quantity),
    ("quantity", Field::Quantity),
    ("단가", Field::UnitPrice),
    ("unitPrice", Field::UnitPrice),
    ("unit_price", Field::UnitPrice),
    ("공급가액", Field::SupplyAmount),
    ("supplyAmount", Field::SupplyAmount),
    ("supply_amount", Field::SupplyAmount),
    ("세액", Field::TaxAmount),
    ("부가세", Field::TaxAmount),
    ("taxAmount", Field::TaxAmount),
    ("tax", Field::TaxAmount),
    ("총금액", Field::TotalAmount),
    ("합계", Field::TotalAmount),
    ("totalAmount", Field::TotalAmount),
    ("total_amount", Field::TotalAmount),
    ("납기일", Field::DueDate),
    ("납기일자", Field::DueDate),
    ("dueDate", Field::DueDate),
    ("due_date", Field::DueDate),
    ("거래처명", Field::VendorName),
    ("거래처", Field::VendorName),
    ("vendorName", Field::VendorName),
    ("vendor_name", Field::VendorName),
    ("납품처명", Field::DeliveryName),
    ("deliveryName", Field::DeliveryName),
    ("delivery_name", Field::DeliveryName),
    ("비고", Field::Note),
    ("note", Field::Note),
    ("notes", Field::Note),
];

const BASIC_COLUMNS: &[Field] = &[
    Field::OrderNumber,
    Field::OrderDate,
    Field::ItemName,
    Field::Specification,
    Field::Quantity,
    Field::UnitPrice,
    Field::SupplyAmount,
    Field::TaxAmount,
    Field::TotalAmount,
    Field::DueDate,
    Field::VendorName,
    Field::DeliveryName,
    Field::Note,
];

const CATEGORIZED_COLUMNS: &[Field] = &[
    Field::OrderNumber,
    Field::OrderDate,
    Field::CategoryLv1,
    Field::CategoryLv2,
    Field::CategoryLv3,
    Field::ItemName,
    Field::Specification,
    Field::Quantity,
    Field::UnitPrice,
    Field::SupplyAmount,
    Field::TaxAmount,
    Field::TotalAmount,
    Field::DueDate,
    Field::VendorName,
    Field::DeliveryName,
    Field::Note,
];

const TEMPLATE_COLUMNS: &[Field] = &[
    Field::OrderNumber,
    Field::OrderDate,
    Field::SiteName,
    Field::CategoryLv1,
    Field::CategoryLv2,
    Field::CategoryLv3,
    Field::ItemName,
    Field::Specification,
    Field::Quantity,
    Field::UnitPrice,
    Field::SupplyAmount,
    Field::TaxAmount,
    Field::TotalAmount,
    Field::DueDate,
    Field::VendorName,
    Field::DeliveryName,
    Field::Note,
];

/// Which sheet shape to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LayoutKind {
    /// 13 columns, A..M, integer amounts
    Basic,
    /// 16 columns with category levels, A..P, integer amounts
    Categorized,
    /// 17-column PO template, A..Q, float amounts
    #[default]
    Template,
    /// Columns located by header names in row 1, float amounts
    Header,
}

impl LayoutKind {
    pub fn default_sheet(self) -> &'static str {
        match self {
            LayoutKind::Basic | LayoutKind::Categorized => "Input Sheet",
            LayoutKind::Template | LayoutKind::Header => "Input",
        }
    }

    /// How many leading columns a positional layout reads. Header layouts
    /// read the whole row.
    pub fn column_limit(self) -> Option<u32> {
        match self {
            LayoutKind::Basic => Some(BASIC_COLUMNS.len() as u32),
            LayoutKind::Categorized => Some(CATEGORIZED_COLUMNS.len() as u32),
            LayoutKind::Template => Some(TEMPLATE_COLUMNS.len() as u32),
            LayoutKind::Header => None,
        }
    }

    /// Build the layout. Header layouts need the sheet's header row.
    pub fn resolve(self, header_row: Option<&[Cell]>) -> Result<Layout> {
        match self {
            LayoutKind::Basic => Ok(Layout::positional(BASIC_COLUMNS, NumericKind::Int)),
            LayoutKind::Categorized => {
                Ok(Layout::positional(CATEGORIZED_COLUMNS, NumericKind::Int))
            }
            LayoutKind::Template => Ok(Layout::positional(TEMPLATE_COLUMNS, NumericKind::Float)),
            LayoutKind::Header => Layout::from_headers(header_row.unwrap_or_default()),
        }
    }
}

/// A concrete mapping from column position to field.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    columns: Vec<Option<Field>>,
    numeric: NumericKind,
}

impl Layout {
    fn positional(fields: &[Field], numeric: NumericKind) -> Self {
        Self {
            columns: fields.iter().copied().map(Some).collect(),
            numeric,
        }
    }

    /// Locate fields by header text. Unknown headers are ignored; the first
    /// column claiming a field wins.
    pub fn from_headers(headers: &[Cell]) -> Result<Self> {
        let mut columns: Vec<Option<Field>> = Vec::with_capacity(headers.len());

        for header in headers {
            let field = Field::from_header(&header.to_string())
                .filter(|f| !columns.contains(&Some(*f)));
            columns.push(field);
        }

        if !columns.contains(&Some(Field::OrderNumber)) {
            return Err(Error::MissingColumn {
                column: Field::OrderNumber.name().to_string(),
                found: headers
                    .iter()
                    .map(|h| h.to_string())
                    .filter(|h| !h.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        Ok(Self {
            columns,
            numeric: NumericKind::Float,
        })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn numeric(&self) -> NumericKind {
        self.numeric
    }

    /// Column index feeding `field`, if any.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(field))
    }
}
