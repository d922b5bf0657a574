//! In-memory evaluation matrix
//!
//! One row per evaluation question. Columns are either shared identification
//! columns (dimension, subdimension, number, question text) or fields of an
//! entity's scoring block. Raw spreadsheet header labels stop at the loader;
//! everything here is addressed by semantic [`ColumnId`]s.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single cell, already normalized from the workbook's value types
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// True for empty cells and whitespace-only text
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric value, if the cell holds one.
    ///
    /// Text is accepted when it parses as a number; a decimal comma is read as a
    /// dot when the text has no dot of its own.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(n) => n,
                    Err(_) if s.contains(',') && !s.contains('.') => {
                        s.replace(',', ".").parse::<f64>().ok()?
                    }
                    Err(_) => return None,
                }
            }
        };
        value.is_finite().then_some(value)
    }

    /// Label form used for filter options and grouping keys
    pub fn label(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

/// Identification columns shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdField {
    Dimension,
    Subdimension,
    Number,
    Question,
}

impl IdField {
    pub const ALL: [IdField; 4] = [
        IdField::Dimension,
        IdField::Subdimension,
        IdField::Number,
        IdField::Question,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            IdField::Dimension => "Dimension",
            IdField::Subdimension => "Subdimension",
            IdField::Number => "Number",
            IdField::Question => "Question",
        }
    }
}

/// Fields of an entity's scoring block, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityField {
    Points,
    PctSubdimension,
    PctDimension,
    MatrixResult,
    PointSum,
    Response,
}

impl EntityField {
    pub const ALL: [EntityField; 6] = [
        EntityField::Points,
        EntityField::PctSubdimension,
        EntityField::PctDimension,
        EntityField::MatrixResult,
        EntityField::PointSum,
        EntityField::Response,
    ];

    /// Numeric scoring fields, in detail-table order
    pub const SCORES: [EntityField; 5] = [
        EntityField::Points,
        EntityField::PctSubdimension,
        EntityField::PctDimension,
        EntityField::MatrixResult,
        EntityField::PointSum,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            EntityField::Points => "Points",
            EntityField::PctSubdimension => "% Subdimension",
            EntityField::PctDimension => "% Dimension",
            EntityField::MatrixResult => "Matrix Result",
            EntityField::PointSum => "Point Sum",
            EntityField::Response => "Response",
        }
    }
}

/// Semantic address of a column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnId {
    Id(IdField),
    Entity { entity: String, field: EntityField },
}

impl ColumnId {
    pub fn entity(entity: &str, field: EntityField) -> Self {
        ColumnId::Entity {
            entity: entity.to_string(),
            field,
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnId::Id(field) => write!(f, "{}", field.display_name()),
            ColumnId::Entity { entity, field } => {
                write!(f, "{} / {}", entity, field.display_name())
            }
        }
    }
}

/// Handle to a column of a specific table.
///
/// Only valid for the table that produced it. [`MatrixTable::column`] and
/// [`MatrixTable::cell`] panic on a foreign handle that is out of range; use
/// [`MatrixTable::get_cell`] when the origin is not certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef(usize);

#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    pub cells: Vec<CellValue>,
}

/// The loaded matrix. Immutable once built.
#[derive(Debug, Clone)]
pub struct MatrixTable {
    source: PathBuf,
    row_count: usize,
    columns: Vec<Column>,
    index: HashMap<ColumnId, usize>,
}

impl MatrixTable {
    /// Build a table from columns of equal length. Later duplicates of a column id
    /// are ignored; the loader reports them before getting here.
    pub(crate) fn new(source: PathBuf, row_count: usize, columns: Vec<Column>) -> Self {
        let mut kept = Vec::with_capacity(columns.len());
        let mut index = HashMap::new();
        for column in columns {
            debug_assert_eq!(column.cells.len(), row_count);
            if index.contains_key(&column.id) {
                continue;
            }
            index.insert(column.id.clone(), kept.len());
            kept.push(column);
        }
        Self {
            source,
            row_count,
            columns: kept,
            index,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_ref(&self, id: &ColumnId) -> Option<ColumnRef> {
        self.index.get(id).copied().map(ColumnRef)
    }

    pub fn has_column(&self, id: &ColumnId) -> bool {
        self.index.contains_key(id)
    }

    pub fn column(&self, column: ColumnRef) -> &Column {
        &self.columns[column.0]
    }

    pub fn cell(&self, column: ColumnRef, row: usize) -> &CellValue {
        &self.columns[column.0].cells[row]
    }

    /// Checked variant of [`cell`](Self::cell)
    pub fn get_cell(&self, column: ColumnRef, row: usize) -> Option<&CellValue> {
        self.columns.get(column.0)?.cells.get(row)
    }

    /// Entity names with at least one column, in column order
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for column in &self.columns {
            if let ColumnId::Entity { entity, .. } = &column.id {
                if !names.contains(&entity.as_str()) {
                    names.push(entity);
                }
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(CellValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(text(" 10 ").as_number(), Some(10.0));
        assert_eq!(text("0,75").as_number(), Some(0.75));
        assert_eq!(text("1.000,5").as_number(), None);
        assert_eq!(text("n/a").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_cell_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(text("   ").is_empty());
        assert!(!text("A").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_cell_label_renders_whole_numbers_without_fraction() {
        assert_eq!(CellValue::Number(3.0).label(), Some("3".to_string()));
        assert_eq!(CellValue::Number(3.5).label(), Some("3.5".to_string()));
        assert_eq!(text(" Gestão ").label(), Some("Gestão".to_string()));
        assert_eq!(CellValue::Empty.label(), None);
    }

    #[test]
    fn test_cell_serializes_untagged() {
        let cells = vec![CellValue::Empty, CellValue::Number(1.5), text("x")];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,1.5,"x"]"#);
    }

    #[test]
    fn test_table_ignores_duplicate_columns() {
        let columns = vec![
            Column {
                id: ColumnId::entity("E1", EntityField::Points),
                cells: vec![CellValue::Number(1.0)],
            },
            Column {
                id: ColumnId::entity("E1", EntityField::Points),
                cells: vec![CellValue::Number(9.0)],
            },
        ];
        let table = MatrixTable::new(PathBuf::from("t.xlsx"), 1, columns);
        assert_eq!(table.columns().len(), 1);
        let col = table
            .column_ref(&ColumnId::entity("E1", EntityField::Points))
            .unwrap();
        assert_eq!(table.cell(col, 0), &CellValue::Number(1.0));
    }

    #[test]
    fn test_entity_names_in_column_order() {
        let mk = |entity: &str, field| Column {
            id: ColumnId::entity(entity, field),
            cells: vec![],
        };
        let table = MatrixTable::new(
            PathBuf::from("t.xlsx"),
            0,
            vec![
                Column {
                    id: ColumnId::Id(IdField::Dimension),
                    cells: vec![],
                },
                mk("B", EntityField::Points),
                mk("A", EntityField::Points),
                mk("B", EntityField::PointSum),
            ],
        );
        assert_eq!(table.entity_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_get_cell_is_checked() {
        let table = MatrixTable::new(
            PathBuf::from("t.xlsx"),
            1,
            vec![Column {
                id: ColumnId::entity("E1", EntityField::Points),
                cells: vec![CellValue::Number(4.0)],
            }],
        );
        let points = table
            .column_ref(&ColumnId::entity("E1", EntityField::Points))
            .unwrap();
        assert_eq!(table.get_cell(points, 0), Some(&CellValue::Number(4.0)));
        assert_eq!(table.get_cell(points, 1), None);
        assert_eq!(table.get_cell(ColumnRef(5), 0), None);
    }
}
