use crate::cell::Cell;
use crate::coerce::serial_to_datetime;
use crate::error::{Error, Result};
use serde::Serialize;
use ssfmt::{FormatOptions, NumberFormat};
use std::path::Path;
use umya_spreadsheet::structs::{Border, HorizontalAlignmentValues, Style, Worksheet};
use umya_spreadsheet::Spreadsheet;

/// Sheets the email step sends when no names are given.
pub const EMAIL_SHEETS: &[&str] = &["갑지", "을지"];

pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => open_xlsx(path),
        "xls" => open_xls(path),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

fn open_xlsx(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

fn open_xls(path: &Path) -> Result<Spreadsheet> {
    xlrd::open(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub fn get_sheet_names(workbook: &Spreadsheet) -> Vec<String> {
    workbook
        .get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

pub fn find_sheet<'a>(workbook: &'a Spreadsheet, name: &str) -> Result<&'a Worksheet> {
    workbook
        .get_sheet_by_name(name)
        .ok_or_else(|| Error::SheetNotFound {
            name: name.to_string(),
            available: get_sheet_names(workbook).join(", "),
        })
}

/// Read every row of a sheet as typed cells, header row included.
///
/// `column_limit` caps how many leading columns are read; a stray styled
/// cell far to the right then costs nothing.
pub fn sheet_rows(
    workbook: &Spreadsheet,
    name: &str,
    column_limit: Option<u32>,
) -> Result<Vec<Vec<Cell>>> {
    let sheet = find_sheet(workbook, name)?;
    let (highest_col, max_row) = sheet.get_highest_column_and_row();
    let max_col = column_limit.map_or(highest_col, |limit| highest_col.min(limit));

    let rows = (1..=max_row)
        .map(|row| (1..=max_col).map(|col| read_cell(sheet, col, row)).collect())
        .collect();

    Ok(rows)
}

/// Read one cell. Numbers carrying a date format come back as date-times.
fn read_cell(sheet: &Worksheet, col: u32, row: u32) -> Cell {
    let Some(cell) = sheet.get_cell((col, row)) else {
        return Cell::Empty;
    };

    let raw_value = cell.get_value();
    if raw_value.is_empty() {
        return Cell::Empty;
    }

    match cell.get_data_type() {
        "b" => Cell::Bool(raw_value.eq_ignore_ascii_case("true") || raw_value == "1"),
        "s" | "str" | "inlineStr" | "e" => Cell::Text(raw_value.into_owned()),
        _ => {
            let Ok(num) = raw_value.parse::<f64>() else {
                return Cell::Text(raw_value.into_owned());
            };

            let format_code = cell
                .get_style()
                .get_number_format()
                .map(|nf| nf.get_format_code())
                .unwrap_or("General");

            if is_date_format(format_code) {
                if let Some(dt) = serial_to_datetime(num) {
                    return Cell::DateTime(dt);
                }
            }
            Cell::Number(num)
        }
    }
}

/// Serial used to check a format's rendering (2025-01-15).
const SAMPLE_SERIAL: f64 = 45672.0;

/// Whether a number format code renders dates.
///
/// Date tokens are looked for outside quoted literals, escapes, `_x`
/// padding, `*x` fills and bracketed sections. A candidate is then rendered
/// through ssfmt: a date format never shows the serial's digits.
pub fn is_date_format(code: &str) -> bool {
    has_date_tokens(code) && !renders_serial(code)
}

fn has_date_tokens(code: &str) -> bool {
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut skip_next = false;

    for c in code.chars() {
        if skip_next {
            skip_next = false;
            continue;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' | '_' | '*' => skip_next = true,
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if in_brackets => {}
            'y' | 'Y' | 'd' | 'D' | 'm' | 'M' => return true,
            _ => {}
        }
    }

    false
}

fn renders_serial(code: &str) -> bool {
    match NumberFormat::parse(code) {
        Ok(fmt) => fmt
            .format(SAMPLE_SERIAL, &FormatOptions::default())
            .replace(',', "")
            .contains("45672"),
        // ssfmt rejects some locale codes; the token scan stands
        Err(_) => false,
    }
}

/// Formatting found on the cells of one sheet that hold a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSummary {
    pub sheet: String,
    pub merged_cells: usize,
    pub merged_ranges: Vec<String>,
    pub borders: usize,
    pub font_styles: usize,
    pub cell_colors: usize,
    pub alignments: usize,
}

pub fn format_summary(sheet: &Worksheet) -> FormatSummary {
    let merged_ranges: Vec<String> = sheet
        .get_merge_cells()
        .iter()
        .map(|range| range.get_range())
        .collect();

    let mut summary = FormatSummary {
        sheet: sheet.get_name().to_string(),
        merged_cells: merged_ranges.len(),
        merged_ranges,
        borders: 0,
        font_styles: 0,
        cell_colors: 0,
        alignments: 0,
    };

    for cell in sheet.get_cell_collection() {
        if cell.get_value().is_empty() {
            continue;
        }
        let style = cell.get_style();
        summary.borders += usize::from(has_border(style));
        summary.font_styles += usize::from(has_font_style(style));
        summary.cell_colors += usize::from(style.get_background_color().is_some());
        summary.alignments += usize::from(has_alignment(style));
    }

    summary
}

fn has_border(style: &Style) -> bool {
    style.get_borders().is_some_and(|b| {
        [b.get_left(), b.get_right(), b.get_top(), b.get_bottom()]
            .iter()
            .any(|side| side.get_border_style() != Border::BORDER_NONE)
    })
}

fn has_font_style(style: &Style) -> bool {
    style
        .get_font()
        .is_some_and(|f| *f.get_bold() || *f.get_italic())
}

fn has_alignment(style: &Style) -> bool {
    style
        .get_alignment()
        .is_some_and(|a| *a.get_horizontal() != HorizontalAlignmentValues::General)
}

/// Existence and extent of a sheet, reported before emailing a workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub name: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_cells: Option<usize>,
}

pub fn sheet_summaries<S: AsRef<str>>(workbook: &Spreadsheet, names: &[S]) -> Vec<SheetSummary> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            match workbook.get_sheet_by_name(name) {
                Some(sheet) => {
                    let (cols, rows) = sheet.get_highest_column_and_row();
                    SheetSummary {
                        name: name.to_string(),
                        exists: true,
                        max_row: Some(rows),
                        max_column: Some(cols),
                        merged_cells: Some(sheet.get_merge_cells().len()),
                    }
                }
                None => SheetSummary {
                    name: name.to_string(),
                    exists: false,
                    max_row: None,
                    max_column: None,
                    merged_cells: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_date_format() {
        assert!(is_date_format("yyyy-mm-dd"));
        assert!(is_date_format("m/d/yy"));
        assert!(is_date_format("[$-412]yyyy\"년\" mm\"월\" dd\"일\""));
        assert!(!is_date_format("General"));
        assert!(!is_date_format("#,##0"));
        assert!(!is_date_format("0.00E+00"));
        assert!(!is_date_format("[Red]#,##0"));
        assert!(!is_date_format("\"day\" 0"));
        assert!(!is_date_format("#,##0_d"));
        assert!(!is_date_format("*d#,##0"));
        assert!(!is_date_format("#,##0_);[Red](#,##0)"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_workbook(Path::new("does-not-exist.xlsx")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_open_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.txt");
        std::fs::write(&path, "not a workbook").unwrap();

        let err = open_workbook(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_read_typed_cells() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("PO-001");
        sheet.get_cell_mut("B1").set_value_number(45672);
        sheet
            .get_cell_mut("B1")
            .get_style_mut()
            .get_number_format_mut()
            .set_format_code("yyyy-mm-dd");
        sheet.get_cell_mut("C1").set_value_number(19.5);
        sheet.get_cell_mut("D1").set_value_bool(true);

        let rows = sheet_rows(&book, "Sheet1", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Cell::from("PO-001"));
        assert!(matches!(&rows[0][1], Cell::DateTime(dt) if dt.format("%Y-%m-%d").to_string() == "2025-01-15"));
        assert_eq!(rows[0][2], Cell::Number(19.5));
        assert_eq!(rows[0][3], Cell::Bool(true));
    }

    #[test]
    fn test_sheet_summaries() {
        let mut book = umya_spreadsheet::new_file();
        book.new_sheet("갑지").unwrap();
        book.get_sheet_by_name_mut("갑지")
            .unwrap()
            .get_cell_mut("C4")
            .set_value("total");
        book.get_sheet_by_name_mut("갑지")
            .unwrap()
            .add_merge_cells("A1:C1");

        let summaries = sheet_summaries(&book, EMAIL_SHEETS);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].exists);
        assert_eq!(summaries[0].max_row, Some(4));
        assert_eq!(summaries[0].max_column, Some(3));
        assert_eq!(summaries[0].merged_cells, Some(1));
        assert!(!summaries[1].exists);
        assert_eq!(summaries[1].max_row, None);
        assert_eq!(summaries[1].merged_cells, None);
    }

    #[test]
    fn test_column_limit_ignores_stray_cells() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("PO-001");
        sheet.get_cell_mut((200, 2)).set_value("stray");

        let capped = sheet_rows(&book, "Sheet1", Some(17)).unwrap();
        assert_eq!(capped.len(), 2);
        assert!(capped.iter().all(|row| row.len() == 17));

        let full = sheet_rows(&book, "Sheet1", None).unwrap();
        assert_eq!(full[0].len(), 200);
    }

    #[test]
    fn test_format_summary_counts_styled_cells() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("발주서");
        sheet.add_merge_cells("A1:D1");
        sheet.get_style_mut("A1").get_font_mut().set_bold(true);
        sheet.get_cell_mut("B3").set_value_number(1000);
        sheet
            .get_style_mut("B3")
            .get_borders_mut()
            .get_bottom_mut()
            .set_border_style(Border::BORDER_THIN);
        // styled but empty: not counted
        sheet.get_style_mut("C5").get_font_mut().set_italic(true);

        let summary = format_summary(book.get_sheet(&0).unwrap());
        assert_eq!(summary.sheet, "Sheet1");
        assert_eq!(summary.merged_cells, 1);
        assert_eq!(summary.merged_ranges, ["A1:D1"]);
        assert_eq!(summary.font_styles, 1);
        assert_eq!(summary.borders, 1);
        assert_eq!(summary.cell_colors, 0);
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let book = umya_spreadsheet::new_file();
        let err = sheet_rows(&book, "Input", None).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound { available, .. } if available == "Sheet1"));
    }
}
