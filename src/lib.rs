//! Purchase-order input sheets to normalized orders.
//!
//! Rows of an input sheet are mapped to line items through an explicit
//! column layout, coerced without ever failing on a bad cell, then grouped
//! into orders by order number.

pub mod cell;
pub mod coerce;
pub mod error;
pub mod evaluator;
pub mod grouper;
pub mod layout;
pub mod mapper;
pub mod parser;
pub mod reader;
pub mod record;
pub mod strip;
pub mod writer;

pub use cell::Cell;
pub use error::{Error, Result};
pub use grouper::group_orders;
pub use layout::{Layout, LayoutKind};
pub use mapper::{map_named, map_row, map_rows};
pub use parser::{parse_file, ParseConfig, ParseReport};
pub use record::{Amount, LineItem, Order};
pub use writer::OutputFormat;
