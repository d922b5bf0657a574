//! KPI summaries, cross-entity comparison and chart series
//!
//! Conventions: a sum over nothing is 0, and a mean over nothing is also 0,
//! whether the column is absent or the view has no numeric cells. Missing and
//! non-numeric cells are skipped.

use crate::filter::FilteredView;
use crate::schema::{resolve_columns, resolve_id_columns, EntityColumns};
use crate::table::{ColumnRef, MatrixTable};
use serde::Serialize;

/// KPIs for one entity over a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub question_count: usize,
    pub points_sum: f64,
    pub pct_subdimension_mean: f64,
    pub pct_dimension_mean: f64,
    pub matrix_result_mean: f64,
}

/// One bar of the cross-entity comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPoints {
    pub entity: String,
    pub points_sum: f64,
}

/// KPIs shown when no entity is selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub question_count: usize,
    pub points_total: f64,
}

/// A (subdimension, point sum) pair for charting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownPoint {
    pub label: String,
    pub value: f64,
}

fn column_sum(view: &FilteredView<'_>, column: Option<ColumnRef>) -> f64 {
    column.map_or(0.0, |column| {
        view.cells(column).filter_map(|cell| cell.as_number()).sum()
    })
}

fn column_mean(view: &FilteredView<'_>, column: Option<ColumnRef>) -> f64 {
    let Some(column) = column else {
        return 0.0;
    };
    let (sum, count) = view
        .cells(column)
        .filter_map(|cell| cell.as_number())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn single_entity_summary(view: &FilteredView<'_>, columns: &EntityColumns) -> Summary {
    Summary {
        question_count: view.len(),
        points_sum: column_sum(view, columns.points),
        pct_subdimension_mean: column_mean(view, columns.pct_subdimension),
        pct_dimension_mean: column_mean(view, columns.pct_dimension),
        matrix_result_mean: column_mean(view, columns.matrix_result),
    }
}

/// Points per entity over the whole table, ignoring any active filter.
/// Entities without a Points column are left out.
pub fn cross_entity_comparison<S: AsRef<str>>(
    table: &MatrixTable,
    entities: &[S],
) -> Vec<EntityPoints> {
    let full = FilteredView::full(table);
    entities
        .iter()
        .filter_map(|entity| {
            let columns = resolve_columns(table, entity.as_ref());
            columns.points.map(|points| EntityPoints {
                entity: columns.entity.clone(),
                points_sum: column_sum(&full, Some(points)),
            })
        })
        .collect()
}

pub fn overview_summary<S: AsRef<str>>(table: &MatrixTable, entities: &[S]) -> OverviewSummary {
    OverviewSummary {
        question_count: table.row_count(),
        points_total: cross_entity_comparison(table, entities)
            .iter()
            .map(|entry| entry.points_sum)
            .sum(),
    }
}

/// (Subdimension, Point Sum) pairs in row order, skipping rows missing either
pub fn subdimension_breakdown(
    view: &FilteredView<'_>,
    columns: &EntityColumns,
) -> Vec<BreakdownPoint> {
    let table = view.table();
    let (Some(subdimension), Some(point_sum)) =
        (resolve_id_columns(table).subdimension, columns.point_sum)
    else {
        return Vec::new();
    };

    view.rows()
        .iter()
        .filter_map(|&row| {
            let label = table.cell(subdimension, row).label()?;
            let value = table.cell(point_sum, row).as_number()?;
            Some(BreakdownPoint { label, value })
        })
        .collect()
}

/// Sum breakdown values per label, keeping first-occurrence order
pub fn group_breakdown(points: &[BreakdownPoint]) -> Vec<BreakdownPoint> {
    let mut grouped: Vec<BreakdownPoint> = Vec::new();
    for point in points {
        match grouped.iter_mut().find(|g| g.label == point.label) {
            Some(existing) => existing.value += point.value,
            None => grouped.push(point.clone()),
        }
    }
    grouped
}
