use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Admission table loaded at startup.
    pub dataset_path: PathBuf,
    /// Rows in each top/bottom ranking table.
    pub ranking_size: usize,
    /// Bars in the per-city and per-course charts.
    pub group_limit: usize,
    /// Course-name fragment selecting the IT section.
    pub it_course_term: String,
    /// `tipo_curso` value selecting the teaching-degree section.
    pub teaching_degree_type: String,
    pub window_title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dados_consolidados_100pct.csv"),
            ranking_size: 10,
            group_limit: 15,
            it_course_term: "Sistemas".to_string(),
            teaching_degree_type: "Licenciatura".to_string(),
            window_title: "Dashboard Vestibular UEG 2026/1".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file(file_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("reading config {}", file_path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", file_path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DashboardConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Explicit file if given, else [`DEFAULT_CONFIG_FILE`] when present,
    /// else defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            log::info!("Using {DEFAULT_CONFIG_FILE}");
            return Self::load_from_file(fallback);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = DashboardConfig::from_toml("ranking_size = 5\nit_course_term = \"Computação\"\n").unwrap();
        assert_eq!(config.ranking_size, 5);
        assert_eq!(config.it_course_term, "Computação");
        assert_eq!(config.group_limit, 15);
        assert_eq!(config.teaching_degree_type, "Licenciatura");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(DashboardConfig::from_toml("ranking_size = \"ten\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(DashboardConfig::resolve(Some(Path::new("/nonexistent/dashboard.toml"))).is_err());
    }
}
