use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::FilterSpec;
use crate::data::model::{Dataset, Dimension};
use crate::report::Report;

/// Dimensions offered in the filter panel, top to bottom.
pub const FILTER_DIMENSIONS: [Dimension; 5] = [
    Dimension::Cidade,
    Dimension::Curso,
    Dimension::TipoCurso,
    Dimension::Turno,
    Dimension::Modalidade,
];

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup and shared read-only.
    pub dataset: Arc<Dataset>,

    pub config: DashboardConfig,

    /// Where the dataset came from, for the top bar.
    pub source: String,

    /// Current filter selections.
    pub filters: FilterSpec,

    /// Every view for the current filters (rebuilt on change).
    pub report: Report,

    /// Stable colours per dimension value, independent of filtering.
    colors: BTreeMap<Dimension, ColorMap>,

    /// Total registrations in the unfiltered dataset.
    pub coverage: u64,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: DashboardConfig, source: String) -> Self {
        let colors = Dimension::ALL
            .iter()
            .map(|&dim| (dim, ColorMap::new(dataset.unique_values(dim))))
            .collect();
        let coverage = dataset.records().iter().map(|r| u64::from(r.inscricoes)).sum();
        let report = Report::build(&dataset, &FilterSpec::new(), &config);

        AppState {
            dataset,
            config,
            source,
            filters: FilterSpec::new(),
            report,
            colors,
            coverage,
        }
    }

    /// Recompute every view from the current filters.
    pub fn refresh(&mut self) {
        let started = Instant::now();
        self.report = Report::build(&self.dataset, &self.filters, &self.config);
        log::debug!(
            "Recomputed report for {:?}: {} of {} rows in {:?}",
            self.filters,
            self.report.rows,
            self.dataset.len(),
            started.elapsed()
        );
    }

    /// Select a value for `dim` (`None` shows all) and recompute if it changed.
    pub fn set_filter(&mut self, dim: Dimension, value: Option<String>) {
        if self.filters.selected(dim) == value.as_deref() {
            return;
        }
        self.filters.set(dim, value);
        self.refresh();
    }

    /// Clear every filter.
    pub fn reset_filters(&mut self) {
        if self.filters.is_unrestricted() {
            return;
        }
        self.filters.clear();
        self.refresh();
    }

    pub fn color_for(&self, dim: Dimension, value: &str) -> Color32 {
        self.colors
            .get(&dim)
            .map_or(Color32::GRAY, |map| map.color_for(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario;

    fn state() -> AppState {
        AppState::new(Arc::new(scenario()), DashboardConfig::default(), "test".into())
    }

    #[test]
    fn starts_unfiltered() {
        let st = state();
        assert_eq!(st.report.rows, 3);
        assert_eq!(st.coverage, 135);
    }

    #[test]
    fn filter_change_rebuilds_report() {
        let mut st = state();
        st.set_filter(Dimension::Cidade, Some("Anápolis".into()));
        assert_eq!(st.report.rows, 2);
        assert_eq!(st.report.overview.total_vagas, 50);

        st.reset_filters();
        assert_eq!(st.report.rows, 3);
    }

    #[test]
    fn colours_survive_filtering() {
        let mut st = state();
        let before = st.color_for(Dimension::Turno, "Noturno");
        st.set_filter(Dimension::Turno, Some("Noturno".into()));
        assert_eq!(st.color_for(Dimension::Turno, "Noturno"), before);
        assert_eq!(st.color_for(Dimension::Turno, "Integral"), Color32::GRAY);
    }
}
