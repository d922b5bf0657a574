//! A configured dashboard: one workbook, one candidate entity list

use crate::cache;
use crate::config::{Config, DashboardProfile};
use crate::error::Result;
use crate::loader::{HeaderLabels, LoadOptions};
use crate::report::{build_report, DashboardReport, Selection};
use crate::schema::{filter_options, known_entities, FilterOptions};
use crate::table::MatrixTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Dashboard {
    profile: DashboardProfile,
    path: PathBuf,
    options: LoadOptions,
}

impl Dashboard {
    /// Bind a named profile (or the default one) from config
    pub fn from_config(config: &Config, name: Option<&str>) -> Result<Self> {
        let profile = config.profile(name)?.clone();
        let path = config.resolve_path(&profile.path);
        Ok(Self::new(profile, path, &config.headers))
    }

    pub fn new(profile: DashboardProfile, path: PathBuf, headers: &HeaderLabels) -> Self {
        let options = profile.load_options(headers);
        Self {
            profile,
            path,
            options,
        }
    }

    pub fn profile(&self) -> &DashboardProfile {
        &self.profile
    }

    /// Resolved workbook path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The matrix at the current refresh generation
    pub fn table(&self) -> Result<Arc<MatrixTable>> {
        cache::load_cached(&self.path, &self.options)
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        let table = self.table()?;
        Ok(filter_options(&table))
    }

    /// Candidates the workbook actually scores
    pub fn entities(&self) -> Result<Vec<String>> {
        let table = self.table()?;
        Ok(known_entities(&table, &self.profile.candidates()))
    }

    /// Full report for a selection. A pinned dashboard ignores the requested
    /// entity and always reports on its own.
    pub fn report(&self, selection: &Selection) -> Result<DashboardReport> {
        let mut selection = selection.clone();
        if let Some(pinned) = &self.profile.pinned_entity {
            selection.entity = Some(pinned.clone());
        }

        let generation = cache::refresh_counter().current();
        let table = self.table()?;
        let mut report = build_report(&table, &self.profile.candidates(), &selection)?;
        report.title = Some(self.profile.display_title().to_string());
        report.generation = generation;
        debug!(
            dashboard = %self.profile.name,
            entity = selection.entity().unwrap_or("-"),
            "report built"
        );
        Ok(report)
    }

    /// Force the next access to re-read the workbook
    pub fn refresh(&self) -> u64 {
        cache::refresh()
    }
}
