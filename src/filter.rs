//! Dimension/subdimension filtering
//!
//! An empty set leaves its axis unconstrained. Filtering only ever selects rows;
//! order is preserved.

use crate::table::{CellValue, ColumnId, ColumnRef, IdField, MatrixTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub dimensions: BTreeSet<String>,
    #[serde(default)]
    pub subdimensions: BTreeSet<String>,
}

impl FilterSet {
    pub fn new<I, J, S, T>(dimensions: I, subdimensions: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            subdimensions: subdimensions.into_iter().map(Into::into).collect(),
        }
    }

    /// True when neither axis is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.dimensions.is_empty() && self.subdimensions.is_empty()
    }
}

/// A row subset of a table
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a MatrixTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row of the table
    pub fn full(table: &'a MatrixTable) -> Self {
        Self {
            table,
            rows: (0..table.row_count()).collect(),
        }
    }

    pub fn table(&self) -> &'a MatrixTable {
        self.table
    }

    /// Selected row indices into the table, ascending
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column over the selected rows. A handle from another table
    /// that is out of range yields nothing.
    pub fn cells(&self, column: ColumnRef) -> impl Iterator<Item = &'a CellValue> + '_ {
        let table = self.table;
        self.rows
            .iter()
            .filter_map(move |&row| table.get_cell(column, row))
    }
}

pub fn apply_filters<'a>(table: &'a MatrixTable, filters: &FilterSet) -> FilteredView<'a> {
    if filters.is_unconstrained() {
        return FilteredView::full(table);
    }

    let dimension = table.column_ref(&ColumnId::Id(IdField::Dimension));
    let subdimension = table.column_ref(&ColumnId::Id(IdField::Subdimension));

    let rows = (0..table.row_count())
        .filter(|&row| {
            axis_matches(table, dimension, row, &filters.dimensions)
                && axis_matches(table, subdimension, row, &filters.subdimensions)
        })
        .collect();

    FilteredView { table, rows }
}

fn axis_matches(
    table: &MatrixTable,
    column: Option<ColumnRef>,
    row: usize,
    allowed: &BTreeSet<String>,
) -> bool {
    if allowed.is_empty() {
        return true;
    }
    column
        .and_then(|column| table.cell(column, row).label())
        .is_some_and(|label| allowed.contains(&label))
}
