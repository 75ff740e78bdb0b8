use std::collections::BTreeMap;

use super::model::{Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Filter predicate: at most one selected value per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: dimension → selected value.
/// A dimension absent from the map means "show all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    selections: BTreeMap<Dimension, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpec::set`] for a concrete value.
    #[cfg(test)]
    pub fn with(mut self, dim: Dimension, value: impl Into<String>) -> Self {
        self.selections.insert(dim, value.into());
        self
    }

    /// Select a value for `dim`, or pass `None` to show all.
    pub fn set(&mut self, dim: Dimension, value: Option<String>) {
        match value {
            Some(v) => {
                self.selections.insert(dim, v);
            }
            None => {
                self.selections.remove(&dim);
            }
        }
    }

    pub fn selected(&self, dim: Dimension) -> Option<&str> {
        self.selections.get(&dim).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// True when no dimension is restricted.
    pub fn is_unrestricted(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (Dimension, &str)> {
        self.selections.iter().map(|(dim, v)| (*dim, v.as_str()))
    }

    /// A record passes when every set dimension equals its selected value
    /// exactly (case-sensitive).
    pub fn matches(&self, rec: &Record) -> bool {
        self.selections
            .iter()
            .all(|(dim, value)| rec.dimension(*dim) == value)
    }
}

// ---------------------------------------------------------------------------
// Selection – a read-only view over the dataset
// ---------------------------------------------------------------------------

/// Indices of records that passed a filter, in dataset order.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Selection<'a> {
    /// Every record of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        Selection {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Selected records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// Narrow the selection further; the original is left untouched.
    pub fn refine(&self, mut keep: impl FnMut(&Record) -> bool) -> Selection<'a> {
        let records = self.dataset.records();
        Selection {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&records[i]))
                .collect(),
        }
    }
}

/// Return the records that pass every set dimension of `spec`.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Selection<'a> {
    if spec.is_unrestricted() {
        return Selection::all(dataset);
    }
    Selection::all(dataset).refine(|rec| spec.matches(rec))
}

/// Keep records whose `dim` equals `value`.
pub fn where_equals<'a>(selection: &Selection<'a>, dim: Dimension, value: &str) -> Selection<'a> {
    selection.refine(|rec| rec.dimension(dim) == value)
}

/// Keep records whose course name contains `needle`, ignoring case.
pub fn course_contains<'a>(selection: &Selection<'a>, needle: &str) -> Selection<'a> {
    let needle = needle.to_lowercase();
    selection.refine(|rec| rec.curso.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario;

    #[test]
    fn unrestricted_filter_is_identity() {
        let ds = scenario();
        let sel = apply(&ds, &FilterSpec::new());
        assert_eq!(sel.indices(), &[0, 1, 2]);
    }

    #[test]
    fn set_dimensions_are_combined_with_and() {
        let ds = scenario();
        let spec = FilterSpec::new()
            .with(Dimension::Cidade, "Anápolis")
            .with(Dimension::Curso, "Sistemas de Informação");
        let sel = apply(&ds, &spec);
        assert_eq!(sel.indices(), &[2]);
    }

    #[test]
    fn filter_is_sound_and_complete() {
        let ds = scenario();
        let specs = [
            FilterSpec::new().with(Dimension::Cidade, "Anápolis"),
            FilterSpec::new().with(Dimension::Turno, "Noturno"),
            FilterSpec::new()
                .with(Dimension::TipoCurso, "Bacharelado")
                .with(Dimension::Cidade, "Goiânia"),
        ];
        for spec in &specs {
            let sel = apply(&ds, spec);
            for (i, rec) in ds.records().iter().enumerate() {
                assert_eq!(sel.indices().contains(&i), spec.matches(rec), "row {i} for {spec:?}");
            }
        }
    }

    #[test]
    fn equality_is_case_sensitive() {
        let ds = scenario();
        let sel = apply(&ds, &FilterSpec::new().with(Dimension::Cidade, "anápolis"));
        assert!(sel.is_empty());
    }

    #[test]
    fn unknown_value_matches_nothing() {
        let ds = scenario();
        let sel = apply(&ds, &FilterSpec::new().with(Dimension::Turno, "Vespertino"));
        assert!(sel.is_empty());
        assert_eq!(sel.records().count(), 0);
    }

    #[test]
    fn clearing_a_dimension_shows_all_again() {
        let mut spec = FilterSpec::new().with(Dimension::Cidade, "Goiânia");
        spec.set(Dimension::Cidade, None);
        assert!(spec.is_unrestricted());
        spec.set(Dimension::Turno, Some("Noturno".into()));
        assert_eq!(spec.selected(Dimension::Turno), Some("Noturno"));
        spec.clear();
        assert!(spec.is_unrestricted());
    }

    #[test]
    fn course_match_ignores_case() {
        let ds = scenario();
        let sel = course_contains(&Selection::all(&ds), "SISTEMAS");
        assert_eq!(sel.indices(), &[0, 2]);
    }

    #[test]
    fn course_match_runs_after_filter() {
        let ds = scenario();
        let base = apply(&ds, &FilterSpec::new().with(Dimension::Cidade, "Goiânia"));
        let sel = course_contains(&base, "sistemas");
        assert_eq!(sel.indices(), &[0]);
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn where_equals_narrows_selection() {
        let ds = scenario();
        let sel = where_equals(&Selection::all(&ds), Dimension::TipoCurso, "Licenciatura");
        assert_eq!(sel.indices(), &[1]);
    }
}
