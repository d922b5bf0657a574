//! evalmatrix - Evaluation-matrix dashboards from spreadsheet workbooks
//!
//! Load a two-row-header workbook, filter it by dimension and subdimension, and
//! summarize how each evaluated entity scored.
//!
//! # Overview
//!
//! An evaluation matrix lists questions grouped by dimension and subdimension.
//! To the right, each evaluated entity gets a block of scoring columns under its
//! name. evalmatrix reads that layout into a [`MatrixTable`], resolves each
//! entity's block, and builds a [`DashboardReport`] with KPIs, chart series and a
//! detail table that any renderer can draw.
//!
//! # Scoring Fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `Points` | Points earned on the question |
//! | `% Subdimension` | Share of the subdimension total |
//! | `% Dimension` | Share of the dimension total |
//! | `Matrix Result` | Normalized result |
//! | `Point Sum` | Pre-aggregated point total |
//! | `Response` | Free-text answer |
//!
//! # Quick Start
//!
//! ```no_run
//! use evalmatrix::{load, build_report, FilterSet, LoadOptions, Selection};
//! use std::path::Path;
//!
//! let table = load(Path::new("matrix.xlsx"), &LoadOptions::default()).unwrap();
//!
//! let selection = Selection {
//!     filters: FilterSet::new(["Gestão"], Vec::<String>::new()),
//!     entity: Some("Belem/PA".to_string()),
//! };
//! let report = build_report(&table, &["Belem/PA", "GLOBAL"], &selection).unwrap();
//! for kpi in &report.kpis {
//!     println!("{}: {}", kpi.label, kpi.value);
//! }
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod report;
pub mod schema;
pub mod serve;
pub mod table;

pub use aggregate::{
    cross_entity_comparison, group_breakdown, overview_summary, single_entity_summary,
    subdimension_breakdown, BreakdownPoint, EntityPoints, OverviewSummary, Summary,
};
pub use cache::{load_cached, refresh, MatrixCache, RefreshCounter};
pub use config::{Config, DashboardProfile, ServerConfig};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use filter::{apply_filters, FilterSet, FilteredView};
pub use loader::{forward_fill, load, parse_grid, HeaderLabels, LoadOptions};
pub use report::{
    build_detail_table, build_report, DashboardReport, DetailTable, Kpi, ReportBody, Selection,
};
pub use schema::{
    distinct_values, filter_options, known_entities, resolve_columns, resolve_id_columns,
    EntityColumns, FilterOptions, IdColumns,
};
pub use table::{CellValue, Column, ColumnId, ColumnRef, EntityField, IdField, MatrixTable};
