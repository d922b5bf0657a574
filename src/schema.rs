//! Column resolution for entities and identification fields
//!
//! Every lookup here tolerates absence: a missing column resolves to `None` and
//! downstream code treats it as "contributes nothing".

use crate::table::{ColumnId, ColumnRef, EntityField, IdField, MatrixTable};
use serde::Serialize;

/// An entity's scoring columns, each present iff the table has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityColumns {
    pub entity: String,
    pub points: Option<ColumnRef>,
    pub pct_subdimension: Option<ColumnRef>,
    pub pct_dimension: Option<ColumnRef>,
    pub matrix_result: Option<ColumnRef>,
    pub point_sum: Option<ColumnRef>,
    pub response: Option<ColumnRef>,
}

impl EntityColumns {
    pub fn get(&self, field: EntityField) -> Option<ColumnRef> {
        match field {
            EntityField::Points => self.points,
            EntityField::PctSubdimension => self.pct_subdimension,
            EntityField::PctDimension => self.pct_dimension,
            EntityField::MatrixResult => self.matrix_result,
            EntityField::PointSum => self.point_sum,
            EntityField::Response => self.response,
        }
    }

    /// Fields that resolved, in [`EntityField::ALL`] order
    pub fn present_fields(&self) -> Vec<EntityField> {
        EntityField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_some())
            .collect()
    }
}

/// The shared identification columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdColumns {
    pub dimension: Option<ColumnRef>,
    pub subdimension: Option<ColumnRef>,
    pub number: Option<ColumnRef>,
    pub question: Option<ColumnRef>,
}

impl IdColumns {
    pub fn get(&self, field: IdField) -> Option<ColumnRef> {
        match field {
            IdField::Dimension => self.dimension,
            IdField::Subdimension => self.subdimension,
            IdField::Number => self.number,
            IdField::Question => self.question,
        }
    }
}

/// Filter choices for both axes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub dimensions: Vec<String>,
    pub subdimensions: Vec<String>,
}

pub fn resolve_columns(table: &MatrixTable, entity: &str) -> EntityColumns {
    let lookup = |field| table.column_ref(&ColumnId::entity(entity, field));
    EntityColumns {
        entity: entity.to_string(),
        points: lookup(EntityField::Points),
        pct_subdimension: lookup(EntityField::PctSubdimension),
        pct_dimension: lookup(EntityField::PctDimension),
        matrix_result: lookup(EntityField::MatrixResult),
        point_sum: lookup(EntityField::PointSum),
        response: lookup(EntityField::Response),
    }
}

pub fn resolve_id_columns(table: &MatrixTable) -> IdColumns {
    let lookup = |field| table.column_ref(&ColumnId::Id(field));
    IdColumns {
        dimension: lookup(IdField::Dimension),
        subdimension: lookup(IdField::Subdimension),
        number: lookup(IdField::Number),
        question: lookup(IdField::Question),
    }
}

/// Candidates that have a Points column, in candidate order
pub fn known_entities<S: AsRef<str>>(table: &MatrixTable, candidates: &[S]) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| table.has_column(&ColumnId::entity(name, EntityField::Points)))
        .map(str::to_string)
        .collect()
}

/// Unique non-empty values of an identification column, first occurrence first
pub fn distinct_values(table: &MatrixTable, field: IdField) -> Vec<String> {
    let Some(column) = table.column_ref(&ColumnId::Id(field)) else {
        return Vec::new();
    };
    let mut values: Vec<String> = Vec::new();
    for cell in &table.column(column).cells {
        if let Some(label) = cell.label() {
            if !values.contains(&label) {
                values.push(label);
            }
        }
    }
    values
}

pub fn filter_options(table: &MatrixTable) -> FilterOptions {
    FilterOptions {
        dimensions: distinct_values(table, IdField::Dimension),
        subdimensions: distinct_values(table, IdField::Subdimension),
    }
}
