//! Removal of the data-entry sheet before a workbook is emailed.
//!
//! The workbook is rewritten through umya-spreadsheet, which carries styles,
//! merged ranges and column widths of the remaining sheets through unchanged.
//! The result can be checked by re-reading it and counting formatting.

use crate::error::{Error, Result};
use crate::reader::{format_summary, get_sheet_names, open_workbook, FormatSummary};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use umya_spreadsheet::Spreadsheet;

#[derive(Debug, Clone, Copy, Default)]
pub struct StripOptions {
    /// Re-read the written file and report its formatting
    pub verify: bool,
    /// Compare formatting of the kept sheets before and after
    pub compare: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripReport {
    pub success: bool,
    pub removed_sheet: bool,
    pub remaining_sheets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Vec<FormatSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<FormatComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StripReport {
    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            removed_sheet: false,
            remaining_sheets: Vec::new(),
            processed_file_path: None,
            verification: None,
            comparison: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatComparison {
    pub format_preserved: bool,
    pub differences: Vec<String>,
}

/// Copy `source` to `target` without `sheet`. A missing sheet is not an
/// error; removing the last sheet is.
pub fn strip_input_sheet(
    source: &Path,
    target: &Path,
    sheet: &str,
    options: StripOptions,
) -> Result<StripReport> {
    let mut workbook = open_workbook(source)?;
    let original = get_sheet_names(&workbook);
    info!(source = %source.display(), sheets = %original.join(", "), "loaded workbook");

    let removed_sheet = original.iter().any(|n| n == sheet);
    let before = options
        .compare
        .then(|| summaries_except(&workbook, sheet));

    if removed_sheet {
        if original.len() == 1 {
            return Err(Error::NoSheetsRemaining(sheet.to_string()));
        }
        workbook
            .remove_sheet_by_name(sheet)
            .map_err(|e| Error::InvalidExcel {
                path: source.to_path_buf(),
                details: e.to_string(),
            })?;
        info!(sheet, "removed sheet");
    } else {
        warn!(sheet, "sheet not found, copying workbook unchanged");
    }

    if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    umya_spreadsheet::writer::xlsx::write(&workbook, target).map_err(|e| Error::InvalidExcel {
        path: target.to_path_buf(),
        details: e.to_string(),
    })?;
    info!(target = %target.display(), "wrote workbook");

    let after = if options.verify || options.compare {
        Some(summaries_except(&open_workbook(target)?, sheet))
    } else {
        None
    };

    let comparison = before
        .zip(after.as_deref())
        .map(|(before, after)| compare_formats(&before, after));
    if let Some(comparison) = comparison.as_ref().filter(|c| !c.format_preserved) {
        warn!(differences = %comparison.differences.join("; "), "formatting changed");
    }

    Ok(StripReport {
        success: true,
        removed_sheet,
        remaining_sheets: get_sheet_names(&workbook),
        processed_file_path: Some(target.display().to_string()),
        verification: after.filter(|_| options.verify),
        comparison,
        error: None,
    })
}

fn summaries_except(workbook: &Spreadsheet, skip: &str) -> Vec<FormatSummary> {
    workbook
        .get_sheet_collection()
        .iter()
        .filter(|s| s.get_name() != skip)
        .map(format_summary)
        .collect()
}

/// Compare per-sheet formatting counts; sheets are matched by name.
pub fn compare_formats(before: &[FormatSummary], after: &[FormatSummary]) -> FormatComparison {
    let mut differences = Vec::new();

    for old in before {
        let Some(new) = after.iter().find(|s| s.sheet == old.sheet) else {
            differences.push(format!("{}: sheet missing", old.sheet));
            continue;
        };

        let counts = [
            ("merged cells", old.merged_cells, new.merged_cells),
            ("borders", old.borders, new.borders),
            ("font styles", old.font_styles, new.font_styles),
            ("cell colors", old.cell_colors, new.cell_colors),
            ("alignments", old.alignments, new.alignments),
        ];
        for (what, was, now) in counts {
            if was != now {
                differences.push(format!("{}: {} {} -> {}", old.sheet, what, was, now));
            }
        }
    }

    FormatComparison {
        format_preserved: differences.is_empty(),
        differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umya_spreadsheet::structs::Border;

    fn book_with(names: &[&str]) -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        book.get_sheet_mut(&0).unwrap().set_name(names[0]);
        for name in &names[1..] {
            book.new_sheet(*name).unwrap();
        }
        book
    }

    fn styled_cover_sheet(book: &mut Spreadsheet) {
        let sheet = book.get_sheet_by_name_mut("갑지").unwrap();
        sheet.get_cell_mut("A1").set_value("발주서");
        sheet.add_merge_cells("A1:F1");
        sheet.get_style_mut("A1").get_font_mut().set_bold(true);
        sheet.get_cell_mut("B2").set_value("발주서");
        sheet
            .get_style_mut("B2")
            .get_borders_mut()
            .get_bottom_mut()
            .set_border_style(Border::BORDER_THIN);
    }

    #[test]
    fn test_strip_removes_input_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("po.xlsx");
        let target = dir.path().join("out/nested/po_email.xlsx");

        let mut book = book_with(&["Input", "갑지", "을지"]);
        styled_cover_sheet(&mut book);
        umya_spreadsheet::writer::xlsx::write(&book, &source).unwrap();

        let report = strip_input_sheet(&source, &target, "Input", StripOptions::default()).unwrap();
        assert!(report.success);
        assert!(report.removed_sheet);
        assert_eq!(report.remaining_sheets, ["갑지", "을지"]);
        assert!(report.verification.is_none());
        assert!(report.comparison.is_none());

        let written = umya_spreadsheet::reader::xlsx::read(&target).unwrap();
        assert_eq!(get_sheet_names(&written), ["갑지", "을지"]);
        let value = written
            .get_sheet_by_name("갑지")
            .unwrap()
            .get_value("B2");
        assert_eq!(value, "발주서");
    }

    #[test]
    fn test_strip_keeps_formatting_of_other_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("po.xlsx");
        let target = dir.path().join("po_email.xlsx");

        let mut book = book_with(&["Input", "갑지"]);
        styled_cover_sheet(&mut book);
        umya_spreadsheet::writer::xlsx::write(&book, &source).unwrap();

        let options = StripOptions {
            verify: true,
            compare: true,
        };
        let report = strip_input_sheet(&source, &target, "Input", options).unwrap();

        let written = umya_spreadsheet::reader::xlsx::read(&target).unwrap();
        let sheet = written.get_sheet_by_name("갑지").unwrap();
        let merged: Vec<String> = sheet.get_merge_cells().iter().map(|r| r.get_range()).collect();
        assert_eq!(merged, ["A1:F1"]);
        assert!(*sheet.get_style("A1").get_font().unwrap().get_bold());
        assert_eq!(
            sheet
                .get_style("B2")
                .get_borders()
                .unwrap()
                .get_bottom()
                .get_border_style(),
            Border::BORDER_THIN
        );

        let verification = report.verification.unwrap();
        assert_eq!(verification.len(), 1);
        assert_eq!(verification[0].sheet, "갑지");
        assert_eq!(verification[0].merged_cells, 1);
        assert_eq!(verification[0].font_styles, 1);
        assert_eq!(verification[0].borders, 1);

        let comparison = report.comparison.unwrap();
        assert!(comparison.format_preserved);
        assert!(comparison.differences.is_empty());
    }

    #[test]
    fn test_compare_formats_reports_differences() {
        let summary = FormatSummary {
            sheet: "갑지".to_string(),
            merged_cells: 2,
            merged_ranges: vec!["A1:B1".to_string(), "A2:B2".to_string()],
            borders: 4,
            font_styles: 1,
            cell_colors: 0,
            alignments: 0,
        };
        let mut changed = summary.clone();
        changed.borders = 0;

        let same = compare_formats(&[summary.clone()], &[summary.clone()]);
        assert!(same.format_preserved);

        let diff = compare_formats(&[summary.clone()], &[changed]);
        assert!(!diff.format_preserved);
        assert_eq!(diff.differences, ["갑지: borders 4 -> 0"]);

        let gone = compare_formats(&[summary], &[]);
        assert_eq!(gone.differences, ["갑지: sheet missing"]);
    }

    #[test]
    fn test_strip_missing_sheet_copies_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("po.xlsx");
        let target = dir.path().join("copy.xlsx");
        umya_spreadsheet::writer::xlsx::write(&book_with(&["갑지"]), &source).unwrap();

        let report = strip_input_sheet(&source, &target, "Input", StripOptions::default()).unwrap();
        assert!(!report.removed_sheet);
        assert_eq!(report.remaining_sheets, ["갑지"]);
        assert!(target.exists());
    }

    #[test]
    fn test_strip_last_sheet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("po.xlsx");
        let target = dir.path().join("copy.xlsx");
        umya_spreadsheet::writer::xlsx::write(&book_with(&["Input"]), &source).unwrap();

        let err = strip_input_sheet(&source, &target, "Input", StripOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoSheetsRemaining(_)));
        assert!(!target.exists());

        let report = StripReport::failure(&err);
        assert!(!report.success);
        assert!(report.remaining_sheets.is_empty());
    }

    #[test]
    fn test_strip_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = strip_input_sheet(
            &dir.path().join("absent.xlsx"),
            &dir.path().join("out.xlsx"),
            "Input",
            StripOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
