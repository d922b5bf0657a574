//! Workbook loading and header normalization
//!
//! The source workbook carries a two-row header: an outer group label
//! (`Dimensão`, `Subdimensão`, ... or an entity name spanning its scoring block)
//! and an inner sub-label (`Pontos`, `Resposta`, ... or blank for identification
//! columns). This module turns that layout into a [`MatrixTable`] addressed by
//! [`ColumnId`], forward-filling the sparse dimension and subdimension labels.

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, ColumnId, EntityField, IdField, MatrixTable};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header labels used to recognize columns in the workbook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderLabels {
    pub dimension: String,
    pub subdimension: String,
    pub number: String,
    pub question: String,
    pub points: String,
    pub pct_subdimension: String,
    pub pct_dimension: String,
    pub matrix_result: String,
    pub point_sum: String,
    pub response: String,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            dimension: "Dimensão".to_string(),
            subdimension: "Subdimensão".to_string(),
            number: "Nº".to_string(),
            question: "Perguntas".to_string(),
            points: "Pontos".to_string(),
            pct_subdimension: "% da Subdimensão".to_string(),
            pct_dimension: "% Total da Dimensão".to_string(),
            matrix_result: "Resultado da Matriz".to_string(),
            point_sum: "Soma (pts)".to_string(),
            response: "Resposta".to_string(),
        }
    }
}

impl HeaderLabels {
    /// Identification field for an outer label with a blank sub-label
    pub fn id_field(&self, outer: &str) -> Option<IdField> {
        IdField::ALL
            .into_iter()
            .find(|field| self.id_label(*field) == outer)
    }

    /// Entity field for an inner sub-label
    pub fn entity_field(&self, inner: &str) -> Option<EntityField> {
        EntityField::ALL
            .into_iter()
            .find(|field| self.entity_label(*field) == inner)
    }

    fn id_label(&self, field: IdField) -> &str {
        match field {
            IdField::Dimension => &self.dimension,
            IdField::Subdimension => &self.subdimension,
            IdField::Number => &self.number,
            IdField::Question => &self.question,
        }
    }

    fn entity_label(&self, field: EntityField) -> &str {
        match field {
            EntityField::Points => &self.points,
            EntityField::PctSubdimension => &self.pct_subdimension,
            EntityField::PctDimension => &self.pct_dimension,
            EntityField::MatrixResult => &self.matrix_result,
            EntityField::PointSum => &self.point_sum,
            EntityField::Response => &self.response,
        }
    }
}

/// What to read from a workbook. Part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Worksheet name; the first sheet when unset
    pub sheet: Option<String>,
    pub headers: HeaderLabels,
}

/// Read a workbook (xlsx, xls, xlsb, ods) into a matrix table.
///
/// A missing file or unreadable workbook aborts the whole load.
pub fn load(path: &Path, options: &LoadOptions) -> Result<MatrixTable> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|source| Error::Spreadsheet {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet = match &options.sheet {
        Some(name) if sheet_names.contains(name) => name.clone(),
        Some(name) => {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "sheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ),
            })
        }
        None => sheet_names.first().cloned().ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            message: "workbook contains no sheets".to_string(),
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| Error::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    let table = parse_grid(grid, path, &options.headers)?;
    info!(
        path = %path.display(),
        sheet = %sheet,
        rows = table.row_count(),
        columns = table.columns().len(),
        "loaded matrix"
    );
    Ok(table)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.to_string())
            }
        }
        // Formula errors (#DIV/0!, #N/A) carry no score
        Data::Error(_) => CellValue::Empty,
    }
}

/// Build a table from a raw grid whose first two rows are the header.
pub fn parse_grid(
    grid: Vec<Vec<CellValue>>,
    source: &Path,
    labels: &HeaderLabels,
) -> Result<MatrixTable> {
    if grid.len() < 2 {
        return Err(Error::Parse {
            path: source.to_path_buf(),
            message: format!("expected a two-row header, found {} row(s)", grid.len()),
        });
    }

    let mut rows = grid.into_iter();
    let outer = rows.next().unwrap_or_default();
    let inner = rows.next().unwrap_or_default();
    let body: Vec<Vec<CellValue>> = rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    let width = outer.len().max(inner.len());
    let mut seen: HashSet<ColumnId> = HashSet::new();
    let mut columns = Vec::new();
    let mut group: Option<String> = None;
    let mut dropped = 0usize;

    for c in 0..width {
        let outer_label = outer.get(c).and_then(CellValue::label);
        let inner_label = inner.get(c).and_then(CellValue::label);

        // Merged group headers only fill their first cell
        let column_group = match (&outer_label, &inner_label) {
            (Some(label), _) => {
                group = Some(label.clone());
                outer_label.clone()
            }
            (None, Some(_)) => group.clone(),
            (None, None) => None,
        };

        let id = match (column_group, inner_label.as_deref()) {
            (Some(g), None) => labels.id_field(&g).map(ColumnId::Id),
            (Some(g), Some(sub)) => labels
                .entity_field(sub)
                .map(|field| ColumnId::Entity { entity: g, field }),
            (None, _) => None,
        };

        let Some(id) = id else {
            dropped += 1;
            continue;
        };

        if !seen.insert(id.clone()) {
            warn!(column = %id, index = c, "duplicate column ignored");
            continue;
        }

        let cells = body
            .iter()
            .map(|row| row.get(c).cloned().unwrap_or_default())
            .collect();
        columns.push(Column { id, cells });
    }

    if dropped > 0 {
        debug!(dropped, "unrecognized header columns skipped");
    }

    for column in columns.iter_mut() {
        if matches!(
            column.id,
            ColumnId::Id(IdField::Dimension) | ColumnId::Id(IdField::Subdimension)
        ) {
            forward_fill(&mut column.cells);
        }
    }

    Ok(MatrixTable::new(source.to_path_buf(), body.len(), columns))
}

/// Replace empty cells with the nearest non-empty cell above them.
/// Leading empties stay empty.
pub fn forward_fill(cells: &mut [CellValue]) {
    let mut last: Option<CellValue> = None;
    for cell in cells.iter_mut() {
        if cell.is_empty() {
            if let Some(prev) = &last {
                *cell = prev.clone();
            }
        } else {
            last = Some(cell.clone());
        }
    }
}
