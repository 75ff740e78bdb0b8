use super::filter::Selection;
use super::model::{Measure, Record};

/// Which end of the ordering to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Largest,
    Smallest,
}

/// All selected records ordered by `key`. The sort is stable, so records
/// with equal keys keep their dataset order in both directions.
pub fn sorted_by<'a>(selection: &Selection<'a>, key: Measure, direction: Direction) -> Vec<&'a Record> {
    let mut rows: Vec<&'a Record> = selection.records().collect();
    match direction {
        Direction::Largest => rows.sort_by(|a, b| b.measure(key).total_cmp(&a.measure(key))),
        Direction::Smallest => rows.sort_by(|a, b| a.measure(key).total_cmp(&b.measure(key))),
    }
    rows
}

/// First `n` records by `key`; fewer when the selection is smaller.
pub fn top_n<'a>(selection: &Selection<'a>, key: Measure, n: usize, direction: Direction) -> Vec<&'a Record> {
    let mut rows = sorted_by(selection, key, direction);
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario;
    use crate::data::model::Dataset;

    fn names(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| format!("{}/{}", r.curso, r.cidade)).collect()
    }

    #[test]
    fn short_selection_returns_everything() {
        let ds = scenario();
        let rows = top_n(&Selection::all(&ds), Measure::CandidatosPorVaga, 10, Direction::Largest);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].candidatos_por_vaga, 3.0);
        assert_eq!(rows[2].candidatos_por_vaga, 0.0);
    }

    #[test]
    fn smallest_orders_ascending() {
        let ds = scenario();
        let rows = top_n(&Selection::all(&ds), Measure::Inscricoes, 2, Direction::Smallest);
        assert_eq!(
            names(&rows),
            vec!["Sistemas de Informação/Anápolis", "Pedagogia/Anápolis"]
        );
    }

    #[test]
    fn ties_keep_dataset_order() {
        let ds = Dataset::from_records(vec![
            Record::new("A", "X", "Bacharelado", "Noturno", "Presencial", 10, 10),
            Record::new("B", "X", "Bacharelado", "Noturno", "Presencial", 20, 20),
            Record::new("C", "X", "Bacharelado", "Noturno", "Presencial", 5, 15),
            Record::new("D", "X", "Bacharelado", "Noturno", "Presencial", 30, 30),
        ]);
        let sel = Selection::all(&ds);
        let largest = top_n(&sel, Measure::CandidatosPorVaga, 4, Direction::Largest);
        assert_eq!(names(&largest), vec!["C/X", "A/X", "B/X", "D/X"]);
        let smallest = top_n(&sel, Measure::CandidatosPorVaga, 3, Direction::Smallest);
        assert_eq!(names(&smallest), vec!["A/X", "B/X", "D/X"]);
    }

    #[test]
    fn both_ends_are_disjoint_with_distinct_keys() {
        let records: Vec<Record> = (0..12u32)
            .map(|i| Record::new(format!("C{i}"), "X", "Tecnólogo", "Noturno", "EaD", 10, (i * 7) % 12 * 3))
            .collect();
        let ds = Dataset::from_records(records);
        let sel = Selection::all(&ds);
        let n = 5;
        let top = names(&top_n(&sel, Measure::Inscricoes, n, Direction::Largest));
        let mut bottom = names(&top_n(&sel, Measure::Inscricoes, n, Direction::Smallest));
        bottom.reverse();
        assert!(top.iter().all(|name| !bottom.contains(name)));
    }

    #[test]
    fn zero_n_is_empty() {
        let ds = scenario();
        assert!(top_n(&Selection::all(&ds), Measure::Vagas, 0, Direction::Largest).is_empty());
    }
}
