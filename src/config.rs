//! Configuration file support for evalmatrix
//!
//! Reads from .evalmatrix/config.toml. Each `[[dashboards]]` entry describes one
//! dashboard: which workbook it reads and which entities it offers.

use crate::error::{Error, Result};
use crate::loader::{HeaderLabels, LoadOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = ".evalmatrix";
const CONFIG_FILE: &str = "config.toml";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Profile used when no `--dashboard` is given
    #[serde(default = "default_dashboard_name")]
    pub default_dashboard: String,

    /// Header labels used to recognize workbook columns
    #[serde(default)]
    pub headers: HeaderLabels,

    /// JSON API settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Dashboard profiles. Setting any replaces the built-in ones.
    #[serde(default = "default_dashboards")]
    pub dashboards: Vec<DashboardProfile>,

    /// Directory relative data paths resolve against
    #[serde(skip)]
    root: Option<PathBuf>,
}

/// One dashboard: a workbook plus the entities it can show
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DashboardProfile {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Workbook path, relative to the project root unless absolute
    pub path: PathBuf,

    /// Worksheet name (default: first sheet)
    #[serde(default)]
    pub sheet: Option<String>,

    /// Candidate entities, in display order
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,

    /// Single-entity dashboard: always shows this entity, no picker
    #[serde(default)]
    pub pinned_entity: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_dashboard_name() -> String {
    "ceasas".to_string()
}

fn default_entities() -> Vec<String> {
    [
        "Belem/PA",
        "São Luís/MA",
        "CEAGESP/SP",
        "Mais Nutrição/CE",
        "PRODAL/MG",
        "Curitiba/PR",
        "GLOBAL",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_dashboards() -> Vec<DashboardProfile> {
    vec![
        DashboardProfile {
            name: "ceasas".to_string(),
            title: Some("Dashboard Avaliativo - Ceasas".to_string()),
            path: PathBuf::from("dashboard_perguntas/Matriz_Avaliativa_Ceasas-Dashboard.xlsx"),
            sheet: None,
            entities: default_entities(),
            pinned_entity: None,
        },
        DashboardProfile {
            name: "belem-pa".to_string(),
            title: Some("Dashboard Avaliativo - Belem/PA".to_string()),
            path: PathBuf::from("Matriz_Avaliativa_Belem-PA.xlsx"),
            sheet: None,
            entities: vec!["Belem/PA".to_string()],
            pinned_entity: Some("Belem/PA".to_string()),
        },
    ]
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_dashboard: default_dashboard_name(),
            headers: HeaderLabels::default(),
            server: ServerConfig::default(),
            dashboards: default_dashboards(),
            root: None,
        }
    }
}

impl DashboardProfile {
    /// Entities offered for selection. A pinned dashboard offers only its entity.
    pub fn candidates(&self) -> Vec<String> {
        match &self.pinned_entity {
            Some(entity) => vec![entity.clone()],
            None => self.entities.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn load_options(&self, headers: &HeaderLabels) -> LoadOptions {
        LoadOptions {
            sheet: self.sheet.clone(),
            headers: headers.clone(),
        }
    }
}

impl Config {
    /// Load config from .evalmatrix/config.toml (or `EVALMATRIX_CONFIG`).
    /// Returns the default config if no file exists.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::from_path(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from an explicit file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.root = Some(project_root(path));
        debug!(path = %path.display(), dashboards = config.dashboards.len(), "loaded config");
        Ok(config)
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("EVALMATRIX_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Look up a profile by name, or the default profile
    pub fn profile(&self, name: Option<&str>) -> Result<&DashboardProfile> {
        let wanted = name.unwrap_or(&self.default_dashboard);
        if let Some(profile) = self.dashboards.iter().find(|d| d.name == wanted) {
            return Ok(profile);
        }
        // Fall back to the first profile when the default name is stale
        let fallback = match name {
            None => self.dashboards.first(),
            Some(_) => None,
        };
        fallback.ok_or_else(|| Error::UnknownDashboard(wanted.to_string()))
    }

    /// Resolve a data path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// `<root>/.evalmatrix/config.toml` resolves to `<root>`; any other file to its
/// own directory
fn project_root(config_path: &Path) -> PathBuf {
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    if dir.file_name().is_some_and(|name| name == CONFIG_DIR) {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}
