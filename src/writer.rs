use crate::error::Result;
use crate::mapper::Mapped;
use crate::parser::ParseReport;
use crate::record::LineItem;
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Orders grouped by order number, with a success envelope
    #[default]
    Json,
    /// Flat JSON list of line items
    Items,
    /// Flat line items, comma separated
    Csv,
    /// Flat line items, tab separated
    Tsv,
}

impl OutputFormat {
    /// Field delimiter for the delimited formats.
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Csv => Some(b','),
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Json | OutputFormat::Items => None,
        }
    }
}

pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

/// Write a grouped parse report as JSON.
pub fn write_report<W: Write>(report: &ParseReport, writer: W, config: &OutputConfig) -> Result<()> {
    write_json(report, writer, config.pretty)
}

/// Write flat line items in the configured format.
pub fn write_items<W: Write>(items: &[LineItem], writer: W, config: &OutputConfig) -> Result<()> {
    match config.format.delimiter() {
        Some(delimiter) => write_delimited(items, writer, delimiter),
        None => write_json(&items, writer, config.pretty),
    }
}

/// Write the outcome of loading flat items, returning the exit code.
///
/// A failed load is still written as a failure report when the output is
/// JSON, so callers reading stdout see `success: false`. Delimited output
/// has no envelope and the error is returned instead.
pub fn write_items_outcome<W: Write>(
    loaded: Result<Mapped>,
    writer: W,
    config: &OutputConfig,
) -> Result<i32> {
    match loaded {
        Ok(mapped) => {
            write_items(&mapped.items, writer, config)?;
            Ok(0)
        }
        Err(e) if config.format.delimiter().is_none() => {
            let report = ParseReport::failure(&e);
            write_json(&report, writer, config.pretty)?;
            Ok(report.exit_code)
        }
        Err(e) => Err(e),
    }
}

fn write_json<T: Serialize, W: Write>(value: &T, mut writer: W, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_delimited<W: Write>(items: &[LineItem], writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    for item in items {
        csv_writer.serialize(item)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::Amount;
    use std::path::PathBuf;

    fn items() -> Vec<LineItem> {
        vec![LineItem {
            order_number: "PO-1".to_string(),
            item_name: "Bolt, M8".to_string(),
            quantity: Amount::Int(4),
            total_amount: Amount::Int(1000),
            ..Default::default()
        }]
    }

    #[test]
    fn test_write_items_csv() {
        let config = OutputConfig {
            format: OutputFormat::Csv,
            pretty: false,
        };
        let mut out = Vec::new();
        write_items(&items(), &mut out, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("orderNumber,orderDate,siteName"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("PO-1,"));
        assert!(row.contains("\"Bolt, M8\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_items_tsv() {
        let config = OutputConfig {
            format: OutputFormat::Tsv,
            pretty: false,
        };
        let mut out = Vec::new();
        write_items(&items(), &mut out, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().starts_with("orderNumber\torderDate"));
    }

    #[test]
    fn test_write_items_json() {
        let config = OutputConfig {
            format: OutputFormat::Items,
            pretty: true,
        };
        let mut out = Vec::new();
        write_items(&items(), &mut out, &config).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["orderNumber"], "PO-1");
        assert_eq!(value[0]["quantity"], 4);
    }

    #[test]
    fn test_items_failure_writes_report() {
        let config = OutputConfig {
            format: OutputFormat::Items,
            pretty: false,
        };
        let mut out = Vec::new();
        let loaded = Err(Error::FileNotFound(PathBuf::from("missing.xlsx")));
        let code = write_items_outcome(loaded, &mut out, &config).unwrap();
        assert_eq!(code, 1);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("missing.xlsx"));
    }

    #[test]
    fn test_items_success_writes_list() {
        let config = OutputConfig {
            format: OutputFormat::Items,
            pretty: false,
        };
        let mut out = Vec::new();
        let loaded = Ok(Mapped {
            items: items(),
            warnings: Vec::new(),
        });
        assert_eq!(write_items_outcome(loaded, &mut out, &config).unwrap(), 0);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["orderNumber"], "PO-1");
    }

    #[test]
    fn test_csv_failure_returns_error() {
        let config = OutputConfig {
            format: OutputFormat::Csv,
            pretty: false,
        };
        let mut out = Vec::new();
        let loaded = Err(Error::FileNotFound(PathBuf::from("missing.xlsx")));
        let err = write_items_outcome(loaded, &mut out, &config).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(out.is_empty());
    }
}
