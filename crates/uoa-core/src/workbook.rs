//! Loads the departments workbook into an [`OrgHierarchy`].
//!
//! The workbook has a sheet named `Data` whose first row is a header. Column A
//! holds the level-1 code, followed by (code, name) column pairs for levels 2
//! to 5.

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::constants::{DEPARTMENTS_SHEET, ROOT_DISPLAY_NAME};
use crate::error::{AppError, AppResult};
use crate::hierarchy::{HierarchyRow, OrgHierarchy};

/// (code, name) column indices for levels 2 to 5.
const LEVEL_COLUMNS: [(usize, usize); 4] = [(1, 2), (3, 4), (5, 6), (7, 8)];

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::Workbook(err.to_string())
    }
}

/// Read `path` and build the hierarchy from its `Data` sheet.
pub fn load_hierarchy(path: impl AsRef<Path>) -> AppResult<OrgHierarchy> {
    let path = path.as_ref();
    let start = Instant::now();

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::Workbook(format!("{}: {}", path.display(), e)))?;

    if !workbook
        .sheet_names()
        .iter()
        .any(|name| name == DEPARTMENTS_SHEET)
    {
        return Err(AppError::Workbook(format!(
            "{}: sheet '{}' not found",
            path.display(),
            DEPARTMENTS_SHEET
        )));
    }

    let range = workbook.worksheet_range(DEPARTMENTS_SHEET)?;
    let rows = rows_from_range(&range);
    let hierarchy = OrgHierarchy::build(rows, ROOT_DISPLAY_NAME)?;

    tracing::info!(
        path = %path.display(),
        units = hierarchy.len(),
        duration_ms = start.elapsed().as_millis(),
        "Departments workbook loaded"
    );

    Ok(hierarchy)
}

/// Map the sheet cells to hierarchy rows, skipping the header and any row
/// without a level-1 code.
pub fn rows_from_range(range: &Range<Data>) -> Vec<HierarchyRow> {
    range
        .rows()
        .skip(1)
        .filter_map(|cells| {
            let root_id = cells.first().and_then(cell_text)?;
            let row = LEVEL_COLUMNS
                .iter()
                .fold(HierarchyRow::new(root_id), |row, &(id_col, name_col)| {
                    row.level(text_at(cells, id_col), text_at(cells, name_col))
                });
            Some(row)
        })
        .collect()
}

fn text_at(cells: &[Data], index: usize) -> String {
    cells.get(index).and_then(cell_text).unwrap_or_default()
}

/// Text of a cell, `None` for empty or whitespace-only cells.
///
/// Numeric codes are stored as floats by spreadsheet tools; integral values
/// are rendered without a fractional part.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string().trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Range<Data> {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1);
        let mut range = Range::new((0, 0), ((rows.len() - 1) as u32, (width - 1) as u32));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    range.set_value((r as u32, c as u32), Data::String(value.to_string()));
                }
            }
        }
        range
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("   ".into())), None);
        assert_eq!(cell_text(&Data::String(" SCI ".into())), Some("SCI".into()));
        assert_eq!(cell_text(&Data::Float(4100.0)), Some("4100".into()));
        assert_eq!(cell_text(&Data::Float(1.5)), Some("1.5".into()));
        assert_eq!(cell_text(&Data::Int(42)), Some("42".into()));
    }

    #[test]
    fn test_rows_skip_header_and_rows_without_root() {
        let range = sheet(&[
            &["L1", "L2", "L2 name", "L3", "L3 name"],
            &["UOA", "SCI", "Faculty of Science", "CS", "Computer Science"],
            &["", "ENG", "Faculty of Engineering"],
            &["UOA", "ENG", "Faculty of Engineering"],
        ]);

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].root_id, "UOA");
        assert_eq!(
            rows[0].levels[..2],
            [
                ("SCI".to_string(), "Faculty of Science".to_string()),
                ("CS".to_string(), "Computer Science".to_string()),
            ]
        );
        assert_eq!(rows[0].levels.len(), 4);
        assert_eq!(rows[0].levels[2], (String::new(), String::new()));
        assert_eq!(rows[1].levels[0].0, "ENG");
    }

    #[test]
    fn test_rows_build_hierarchy() {
        let range = sheet(&[
            &["L1"],
            &["UOA", "SCI", "Faculty of Science", "CS", "Computer Science"],
            &["UOA", "SCI", "Faculty of Science", "MATHS", ""],
        ]);

        let hierarchy = OrgHierarchy::build(rows_from_range(&range), ROOT_DISPLAY_NAME).unwrap();
        assert_eq!(hierarchy.len(), 4);
        let maths = hierarchy.find_by_id("MATHS", false).unwrap();
        assert_eq!(hierarchy.unit(maths).display_name(), "MATHS");
        assert_eq!(
            hierarchy.unit(hierarchy.root()).display_name(),
            ROOT_DISPLAY_NAME
        );
    }

    #[test]
    fn test_missing_workbook_is_workbook_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_hierarchy(dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, AppError::Workbook(_)));
    }
}
