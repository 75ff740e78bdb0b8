use std::collections::BTreeMap;

use super::filter::Selection;
use super::model::{Dimension, Record};

// ---------------------------------------------------------------------------
// Mean accumulator
// ---------------------------------------------------------------------------

/// Running arithmetic mean. An empty accumulator has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` over zero samples instead of NaN.
    pub fn value(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

impl FromIterator<f64> for Mean {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut mean = Mean::default();
        for v in iter {
            mean.push(v);
        }
        mean
    }
}

// ---------------------------------------------------------------------------
// Grouped reduction
// ---------------------------------------------------------------------------

/// One row per distinct group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub vagas: u64,
    pub inscricoes: u64,
    /// Mean over every row of the group, zero-registration rows included.
    pub mean_candidatos_por_vaga: Option<f64>,
    pub rows: usize,
}

#[derive(Default)]
struct GroupAcc {
    vagas: u64,
    inscricoes: u64,
    ratio: Mean,
}

impl GroupAcc {
    fn add(&mut self, rec: &Record) {
        self.vagas += u64::from(rec.vagas);
        self.inscricoes += u64::from(rec.inscricoes);
        self.ratio.push(rec.candidatos_por_vaga);
    }
}

/// Group the selection by `key` and reduce seats (sum), registrations (sum)
/// and candidates-per-seat (mean). Groups come back sorted by key.
pub fn group_by(selection: &Selection<'_>, key: Dimension) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, GroupAcc> = BTreeMap::new();
    for rec in selection.records() {
        groups.entry(rec.dimension(key)).or_default().add(rec);
    }

    groups
        .into_iter()
        .map(|(k, acc)| GroupSummary {
            key: k.to_string(),
            vagas: acc.vagas,
            inscricoes: acc.inscricoes,
            mean_candidatos_por_vaga: acc.ratio.value(),
            rows: acc.ratio.count(),
        })
        .collect()
}

/// Stable sort by summed registrations, largest first, keeping at most
/// `limit` groups.
pub fn by_registrations_desc(mut groups: Vec<GroupSummary>, limit: Option<usize>) -> Vec<GroupSummary> {
    groups.sort_by(|a, b| b.inscricoes.cmp(&a.inscricoes));
    if let Some(n) = limit {
        groups.truncate(n);
    }
    groups
}
