use serde::Serialize;
use std::iter::Sum;
use std::ops::Add;

/// Numeric target type a layout declares for its amount columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Int,
    Float,
}

/// A quantity or money amount, serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Int(i64),
    Float(f64),
}

impl Amount {
    pub fn zero(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Int => Amount::Int(0),
            NumericKind::Float => Amount::Float(0.0),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Amount::Int(i) => i as f64,
            Amount::Float(f) => f,
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Int(0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        match (self, rhs) {
            (Amount::Int(a), Amount::Int(b)) => Amount::Int(a.saturating_add(b)),
            (a, b) => Amount::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::default(), Add::add)
    }
}

/// One purchased product or service row.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub order_number: String,
    pub order_date: String,
    pub site_name: String,
    pub category_lv1: String,
    pub category_lv2: String,
    pub category_lv3: String,
    pub item_name: String,
    pub specification: String,
    pub quantity: Amount,
    pub unit_price: Amount,
    pub supply_amount: Amount,
    pub tax_amount: Amount,
    pub total_amount: Amount,
    pub due_date: String,
    pub vendor_name: String,
    pub delivery_name: String,
    pub note: String,
}

/// A purchase order with its line items in sheet row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub order_date: String,
    pub site_name: String,
    pub vendor_name: String,
    pub due_date: String,
    pub total_amount: Amount,
    pub items: Vec<LineItem>,
}
