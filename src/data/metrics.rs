use super::aggregate::Mean;
use super::filter::Selection;

/// Scalar metrics over a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineMetrics {
    pub total_vagas: u64,
    pub total_inscricoes: u64,
    /// Mean candidates-per-seat over rows with at least one registration.
    /// `None` when no such row exists.
    pub mean_candidatos_por_vaga: Option<f64>,
    pub offerings_with_registrations: usize,
    pub offerings: usize,
}

/// Outcome of a predicate-restricted view.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    /// The restriction matched no rows.
    Empty,
    Ready(T),
}

impl<T> Section<T> {
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            Section::Empty => None,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        matches!(self, Section::Empty)
    }
}

/// Compute seats, registrations and the registration-only mean ratio.
///
/// Rows with zero registrations count towards the sums but are left out of
/// the mean. Grouped means in [`super::aggregate::group_by`] keep them.
pub fn headline(selection: &Selection<'_>) -> HeadlineMetrics {
    let mut total_vagas = 0u64;
    let mut total_inscricoes = 0u64;
    let mut ratio = Mean::default();

    for rec in selection.records() {
        total_vagas += u64::from(rec.vagas);
        total_inscricoes += u64::from(rec.inscricoes);
        if rec.has_registrations() {
            ratio.push(rec.candidatos_por_vaga);
        }
    }

    HeadlineMetrics {
        total_vagas,
        total_inscricoes,
        mean_candidatos_por_vaga: ratio.value(),
        offerings_with_registrations: ratio.count(),
        offerings: selection.len(),
    }
}

/// Headline metrics for a restricted subset, or [`Section::Empty`] when
/// the restriction left nothing.
pub fn restricted(selection: &Selection<'_>) -> Section<HeadlineMetrics> {
    if selection.is_empty() {
        return Section::Empty;
    }
    Section::Ready(headline(selection))
}
