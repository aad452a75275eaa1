use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::warn;

use crate::table::{EdgeRow, EdgeTable};

/// Reads an Excel workbook into ordered `(sheet name, edge table)` pairs.
///
/// Every sheet is expected to carry a header row followed by
/// source / target / value columns. When a sheet subset is given, tables
/// come back in the requested order and unknown names are an error;
/// otherwise all sheets are read in workbook order.
pub fn read_edge_tables(
    path: &Path,
    sheets: Option<&[String]>,
) -> Result<Vec<(String, EdgeTable)>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;
    let available = workbook.sheet_names();

    let selected: Vec<String> = match sheets {
        Some(wanted) => {
            for name in wanted {
                if !available.contains(name) {
                    bail!(
                        "sheet {name:?} not found in {}, available: {available:?}",
                        path.display()
                    );
                }
            }
            wanted.to_vec()
        }
        None => available,
    };

    let mut tables = Vec::with_capacity(selected.len());
    for name in selected {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("reading sheet {name:?}"))?;
        let mut rows = Vec::new();
        for (row_idx, row) in range.rows().enumerate().skip(1) {
            let Some(edge) = parse_row(row) else {
                if row.iter().any(|cell| !matches!(cell, Data::Empty)) {
                    warn!("{name}: skipping malformed row {}", row_idx + 1);
                }
                continue;
            };
            rows.push(edge);
        }
        tables.push((name, EdgeTable::new(rows)));
    }
    Ok(tables)
}

fn parse_row(row: &[Data]) -> Option<EdgeRow> {
    let source = cell_text(row.first()?)?;
    let target = cell_text(row.get(1)?)?;
    let value = cell_value(row.get(2)?)?;
    Some(EdgeRow::new(source, target, value))
}

/// Node cells keep numeric content as text, so the sanitizer can still spot
/// literal zeros.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 {
                format!("{}", *value as i64)
            } else {
                format!("{value}")
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::Empty | Data::Error(_) => return None,
        other => other.to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

fn cell_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
