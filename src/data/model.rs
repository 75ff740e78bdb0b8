use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Dimension – a categorical column
// ---------------------------------------------------------------------------

/// Categorical columns of the admission table. Filters and groupings are
/// always keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Curso,
    Cidade,
    TipoCurso,
    Turno,
    Modalidade,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Curso,
        Dimension::Cidade,
        Dimension::TipoCurso,
        Dimension::Turno,
        Dimension::Modalidade,
    ];

    /// Header name in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::Curso => "curso",
            Dimension::Cidade => "cidade",
            Dimension::TipoCurso => "tipo_curso",
            Dimension::Turno => "turno",
            Dimension::Modalidade => "modalidade",
        }
    }

    /// Human label used in widgets and table headers.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Curso => "Curso",
            Dimension::Cidade => "Cidade",
            Dimension::TipoCurso => "Tipo de Curso",
            Dimension::Turno => "Turno",
            Dimension::Modalidade => "Modalidade",
        }
    }

    /// Text of the "show all" entry in the filter selector.
    pub fn all_label(self) -> &'static str {
        match self {
            Dimension::Cidade | Dimension::Modalidade => "Todas",
            _ => "Todos",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Measure – a numeric column
// ---------------------------------------------------------------------------

/// Numeric columns usable as sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Vagas,
    Inscricoes,
    CandidatosPorVaga,
    TaxaOcupacao,
}

impl Measure {
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Vagas => "vagas",
            Measure::Inscricoes => "inscricoes",
            Measure::CandidatosPorVaga => "candidatos_por_vaga",
            Measure::TaxaOcupacao => "taxa_ocupacao",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::Vagas => "Vagas",
            Measure::Inscricoes => "Inscrições",
            Measure::CandidatosPorVaga => "Cand/Vaga",
            Measure::TaxaOcupacao => "Taxa Ocupação",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived ratios
// ---------------------------------------------------------------------------

/// Registrations per offered seat. Zero when no seats are offered.
pub fn candidates_per_seat(vagas: u32, inscricoes: u32) -> f64 {
    if vagas == 0 {
        return 0.0;
    }
    f64::from(inscricoes) / f64::from(vagas)
}

/// Percentage of seats claimed by registrations, capped at 100.
pub fn occupancy_rate(vagas: u32, inscricoes: u32) -> f64 {
    if vagas == 0 {
        return 0.0;
    }
    f64::from(inscricoes.min(vagas)) / f64::from(vagas) * 100.0
}

// ---------------------------------------------------------------------------
// Record – one row of the admission table
// ---------------------------------------------------------------------------

/// A single course/city/shift/modality offering.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub curso: String,
    pub cidade: String,
    pub tipo_curso: String,
    pub turno: String,
    pub modalidade: String,
    pub vagas: u32,
    pub inscricoes: u32,
    pub candidatos_por_vaga: f64,
    pub taxa_ocupacao: f64,
}

impl Record {
    /// Build a record from raw counts, deriving both ratios.
    pub fn new(
        curso: impl Into<String>,
        cidade: impl Into<String>,
        tipo_curso: impl Into<String>,
        turno: impl Into<String>,
        modalidade: impl Into<String>,
        vagas: u32,
        inscricoes: u32,
    ) -> Self {
        Record {
            curso: curso.into(),
            cidade: cidade.into(),
            tipo_curso: tipo_curso.into(),
            turno: turno.into(),
            modalidade: modalidade.into(),
            vagas,
            inscricoes,
            candidatos_por_vaga: candidates_per_seat(vagas, inscricoes),
            taxa_ocupacao: occupancy_rate(vagas, inscricoes),
        }
    }

    /// Value of a categorical column.
    pub fn dimension(&self, dim: Dimension) -> &str {
        match dim {
            Dimension::Curso => &self.curso,
            Dimension::Cidade => &self.cidade,
            Dimension::TipoCurso => &self.tipo_curso,
            Dimension::Turno => &self.turno,
            Dimension::Modalidade => &self.modalidade,
        }
    }

    /// Value of a numeric column as `f64`.
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Vagas => f64::from(self.vagas),
            Measure::Inscricoes => f64::from(self.inscricoes),
            Measure::CandidatosPorVaga => self.candidatos_por_vaga,
            Measure::TaxaOcupacao => self.taxa_ocupacao,
        }
    }

    pub fn has_registrations(&self) -> bool {
        self.inscricoes > 0
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full admission table with pre-computed category indices.
///
/// Never mutated after construction; share it as an `Arc<Dataset>`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// For each dimension the sorted set of distinct values.
    unique_values: BTreeMap<Dimension, BTreeSet<String>>,
}

impl Dataset {
    /// Build category indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = Dimension::ALL
            .iter()
            .map(|&dim| (dim, BTreeSet::new()))
            .collect();

        for rec in &records {
            for dim in Dimension::ALL {
                if let Some(values) = unique_values.get_mut(&dim) {
                    if !values.contains(rec.dimension(dim)) {
                        values.insert(rec.dimension(dim).to_string());
                    }
                }
            }
        }

        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct values of a dimension.
    pub fn unique_values(&self, dim: Dimension) -> impl Iterator<Item = &str> {
        self.unique_values
            .get(&dim)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    pub fn distinct_count(&self, dim: Dimension) -> usize {
        self.unique_values.get(&dim).map_or(0, BTreeSet::len)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario;

    #[test]
    fn ratios_are_zero_without_seats() {
        assert_eq!(candidates_per_seat(0, 15), 0.0);
        assert_eq!(occupancy_rate(0, 15), 0.0);
    }

    #[test]
    fn occupancy_is_capped() {
        assert_eq!(occupancy_rate(40, 120), 100.0);
        assert_eq!(occupancy_rate(30, 15), 50.0);
    }

    #[test]
    fn record_derives_ratios() {
        let rec = Record::new("Pedagogia", "Anápolis", "Licenciatura", "Matutino", "Presencial", 30, 15);
        assert_eq!(rec.candidatos_por_vaga, 0.5);
        assert_eq!(rec.measure(Measure::Inscricoes), 15.0);
        assert_eq!(rec.dimension(Dimension::Cidade), "Anápolis");
    }

    #[test]
    fn unique_values_are_sorted_and_distinct() {
        let ds = scenario();
        let cities: Vec<&str> = ds.unique_values(Dimension::Cidade).collect();
        assert_eq!(cities, vec!["Anápolis", "Goiânia"]);
        assert_eq!(ds.distinct_count(Dimension::Curso), 2);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn empty_dataset_still_lists_dimensions() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.unique_values(Dimension::Turno).count(), 0);
    }
}
