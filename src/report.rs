//! Report assembly for dashboard renderers
//!
//! Packages the filter options, usable entities, KPIs, chart series and the
//! projected detail table into one serializable [`DashboardReport`].

use crate::aggregate::{
    cross_entity_comparison, overview_summary, single_entity_summary, subdimension_breakdown,
    BreakdownPoint, EntityPoints, OverviewSummary, Summary,
};
use crate::error::{Error, Result};
use crate::filter::{apply_filters, FilterSet, FilteredView};
use crate::schema::{
    filter_options, known_entities, resolve_columns, resolve_id_columns, EntityColumns,
    FilterOptions, IdColumns,
};
use crate::table::{CellValue, ColumnRef, EntityField, IdField, MatrixTable};
use serde::{Deserialize, Serialize};

/// Rows of the view projected onto display columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Project a view onto the identification columns, the response (if any) and
/// the entity's present scoring fields.
pub fn build_detail_table(
    view: &FilteredView<'_>,
    columns: &EntityColumns,
    id_columns: &IdColumns,
) -> DetailTable {
    let mut projection: Vec<(&'static str, ColumnRef)> = Vec::new();
    for field in IdField::ALL {
        if let Some(column) = id_columns.get(field) {
            projection.push((field.display_name(), column));
        }
    }
    if let Some(column) = columns.response {
        projection.push((EntityField::Response.display_name(), column));
    }
    for field in EntityField::SCORES {
        if let Some(column) = columns.get(field) {
            projection.push((field.display_name(), column));
        }
    }

    let table = view.table();
    DetailTable {
        columns: projection.iter().map(|(name, _)| name.to_string()).collect(),
        rows: view
            .rows()
            .iter()
            .map(|&row| {
                projection
                    .iter()
                    .map(|(_, column)| table.cell(*column, row).clone())
                    .collect()
            })
            .collect(),
    }
}

/// What the user picked in the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(flatten)]
    pub filters: FilterSet,
    #[serde(default)]
    pub entity: Option<String>,
}

impl Selection {
    /// The selected entity; a blank name means none
    pub fn entity(&self) -> Option<&str> {
        self.entity
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A labelled, display-formatted KPI value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

impl Kpi {
    fn count(label: &'static str, value: usize) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }

    fn points(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value: format!("{:.0}", value),
        }
    }

    fn percent(label: &'static str, fraction: f64) -> Self {
        Self {
            label,
            value: format!("{:.2}%", fraction * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReportBody {
    /// One entity over the filtered view
    Entity {
        entity: String,
        summary: Summary,
        breakdown: Vec<BreakdownPoint>,
        table: DetailTable,
    },
    /// No entity selected: comparison across all known entities
    Overview {
        comparison: Vec<EntityPoints>,
        overview: OverviewSummary,
    },
}

impl ReportBody {
    pub fn kpis(&self) -> Vec<Kpi> {
        match self {
            ReportBody::Entity { summary, .. } => vec![
                Kpi::count("Total Questions", summary.question_count),
                Kpi::points("Points Sum", summary.points_sum),
                Kpi::percent("Mean % Subdimension", summary.pct_subdimension_mean),
                Kpi::percent("Mean % Dimension", summary.pct_dimension_mean),
                Kpi::percent("Mean Matrix Result", summary.matrix_result_mean),
            ],
            ReportBody::Overview { overview, .. } => vec![
                Kpi::count("Total Questions", overview.question_count),
                Kpi::points("Total Points", overview.points_total),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub title: Option<String>,
    pub source: String,
    pub generated_at: String,
    pub generation: u64,
    pub options: FilterOptions,
    pub entities: Vec<String>,
    pub selection: Selection,
    pub kpis: Vec<Kpi>,
    pub body: ReportBody,
}

/// Assemble a full report for one selection.
///
/// `candidates` is the configured entity list. Selecting a name outside it is an
/// error; a candidate the workbook never evaluated just yields zero KPIs.
pub fn build_report<S: AsRef<str>>(
    table: &MatrixTable,
    candidates: &[S],
    selection: &Selection,
) -> Result<DashboardReport> {
    let entities = known_entities(table, candidates);

    let body = match selection.entity() {
        Some(entity) => {
            if !candidates.iter().any(|c| c.as_ref() == entity) {
                return Err(Error::UnknownEntity(entity.to_string()));
            }
            let view = apply_filters(table, &selection.filters);
            let columns = resolve_columns(table, entity);
            ReportBody::Entity {
                entity: entity.to_string(),
                summary: single_entity_summary(&view, &columns),
                breakdown: subdimension_breakdown(&view, &columns),
                table: build_detail_table(&view, &columns, &resolve_id_columns(table)),
            }
        }
        None => ReportBody::Overview {
            comparison: cross_entity_comparison(table, &entities),
            overview: overview_summary(table, &entities),
        },
    };

    Ok(DashboardReport {
        title: None,
        source: table.source().display().to_string(),
        generated_at: chrono::Local::now().to_rfc3339(),
        generation: 0,
        options: filter_options(table),
        entities,
        selection: selection.clone(),
        kpis: body.kpis(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{parse_grid, HeaderLabels};
    use std::path::Path;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn table() -> MatrixTable {
        let e = CellValue::Empty;
        let grid = vec![
            vec![
                t("Dimensão"),
                t("Subdimensão"),
                t("Nº"),
                t("Perguntas"),
                t("E1"),
                e.clone(),
                e.clone(),
                t("E2"),
            ],
            vec![
                e.clone(),
                e.clone(),
                e.clone(),
                e.clone(),
                t("Soma (pts)"),
                t("Pontos"),
                t("Resposta"),
                t("Pontos"),
            ],
            vec![t("A"), t("X"), n(1.0), t("Q1"), n(30.0), n(10.0), t("Sim"), n(3.0)],
            vec![e.clone(), t("Y"), n(2.0), t("Q2"), n(20.0), n(20.0), t("Não"), n(4.0)],
            vec![t("B"), t("Z"), n(3.0), t("Q3"), n(5.0), n(5.0), e, n(5.0)],
        ];
        parse_grid(grid, Path::new("m.xlsx"), &HeaderLabels::default()).unwrap()
    }

    #[test]
    fn test_detail_table_column_order() {
        let table = table();
        let view = FilteredView::full(&table);
        let detail = build_detail_table(
            &view,
            &resolve_columns(&table, "E1"),
            &resolve_id_columns(&table),
        );
        assert_eq!(
            detail.columns,
            vec![
                "Dimension",
                "Subdimension",
                "Number",
                "Question",
                "Response",
                "Points",
                "Point Sum"
            ]
        );
        assert_eq!(detail.rows.len(), 3);
        assert_eq!(
            detail.rows[1],
            vec![t("A"), t("Y"), n(2.0), t("Q2"), t("Não"), n(20.0), n(20.0)]
        );
    }

    #[test]
    fn test_detail_table_without_response() {
        let table = table();
        let view = FilteredView::full(&table);
        let detail = build_detail_table(
            &view,
            &resolve_columns(&table, "E2"),
            &resolve_id_columns(&table),
        );
        assert_eq!(
            detail.columns,
            vec!["Dimension", "Subdimension", "Number", "Question", "Points"]
        );
    }

    #[test]
    fn test_entity_report_uses_filters() {
        let table = table();
        let selection = Selection {
            filters: FilterSet::new(["A"], Vec::<String>::new()),
            entity: Some("E1".to_string()),
        };
        let report = build_report(&table, &["E1", "E2"], &selection).unwrap();
        match &report.body {
            ReportBody::Entity {
                summary,
                breakdown,
                table,
                ..
            } => {
                assert_eq!(summary.question_count, 2);
                assert_eq!(summary.points_sum, 30.0);
                assert_eq!(breakdown.len(), 2);
                assert_eq!(table.rows.len(), 2);
            }
            other => panic!("expected entity body, got {:?}", other),
        }
        assert_eq!(report.kpis[1].value, "30");
        assert_eq!(report.options.dimensions, vec!["A", "B"]);
    }

    #[test]
    fn test_blank_entity_means_overview() {
        let table = table();
        let selection = Selection {
            filters: FilterSet::new(["A"], Vec::<String>::new()),
            entity: Some("  ".to_string()),
        };
        let report = build_report(&table, &["E2", "E1", "GLOBAL"], &selection).unwrap();
        match &report.body {
            ReportBody::Overview {
                comparison,
                overview,
            } => {
                assert_eq!(comparison.len(), 2);
                assert_eq!(comparison[0].entity, "E2");
                assert_eq!(comparison[0].points_sum, 12.0);
                assert_eq!(overview.question_count, 3);
                assert_eq!(overview.points_total, 47.0);
            }
            other => panic!("expected overview body, got {:?}", other),
        }
        assert_eq!(report.entities, vec!["E2", "E1"]);
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        let table = table();
        let selection = Selection {
            entity: Some("Elsewhere".to_string()),
            ..Selection::default()
        };
        let err = build_report(&table, &["E1"], &selection).unwrap_err();
        assert!(matches!(err, Error::UnknownEntity(name) if name == "Elsewhere"));
    }

    #[test]
    fn test_unevaluated_candidate_yields_zero_summary() {
        let table = table();
        let selection = Selection {
            entity: Some("GLOBAL".to_string()),
            ..Selection::default()
        };
        let report = build_report(&table, &["E1", "GLOBAL"], &selection).unwrap();
        match report.body {
            ReportBody::Entity { summary, table, .. } => {
                assert_eq!(summary.question_count, 3);
                assert_eq!(summary.points_sum, 0.0);
                assert_eq!(table.columns.len(), 4);
            }
            other => panic!("expected entity body, got {:?}", other),
        }
    }

    #[test]
    fn test_kpi_formatting() {
        let body = ReportBody::Entity {
            entity: "E1".to_string(),
            summary: Summary {
                question_count: 4,
                points_sum: 12.6,
                pct_subdimension_mean: 0.5,
                pct_dimension_mean: 0.1234,
                matrix_result_mean: 0.0,
            },
            breakdown: vec![],
            table: DetailTable::default(),
        };
        let values: Vec<String> = body.kpis().into_iter().map(|k| k.value).collect();
        assert_eq!(values, vec!["4", "13", "50.00%", "12.34%", "0.00%"]);
    }

    #[test]
    fn test_report_serializes_mode_tag() {
        let table = table();
        let report = build_report(&table, &["E1"], &Selection::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["body"]["mode"], "overview");
        assert_eq!(json["selection"]["dimensions"], serde_json::json!([]));
    }
}
