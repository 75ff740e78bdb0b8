//! Presentation-ready reshaping of the filtered table.
//!
//! A [`Report`] is rebuilt from scratch on every filter change and holds
//! every table, chart and scalar the dashboard shows. Nothing here touches
//! egui; the `ui` module only reads these structures.

use crate::color::Ramp;
use crate::config::DashboardConfig;
use crate::data::aggregate::{by_registrations_desc, group_by, GroupSummary};
use crate::data::filter::{apply, course_contains, where_equals, FilterSpec, Selection};
use crate::data::metrics::{headline, restricted, HeadlineMetrics, Section};
use crate::data::model::{Dataset, Dimension, Measure, Record};
use crate::data::rank::{sorted_by, top_n, Direction};
use crate::format::{decimal2, round2};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Display columns, in the order a table lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Dim(Dimension),
    Value(Measure),
}

use Column::{Dim, Value};

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Dim(d) => d.label(),
            Value(m) => m.label(),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Value(_))
    }

    fn cell(self, rec: &Record) -> String {
        match self {
            Dim(d) => rec.dimension(d).to_string(),
            Value(Measure::Vagas) => rec.vagas.to_string(),
            Value(Measure::Inscricoes) => rec.inscricoes.to_string(),
            Value(m) => decimal2(rec.measure(m)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_records<'a>(columns: &[Column], records: impl IntoIterator<Item = &'a Record>) -> Self {
        Table {
            columns: columns.to_vec(),
            rows: records
                .into_iter()
                .map(|rec| columns.iter().map(|c| c.cell(rec)).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

const RANKING_COLUMNS: [Column; 6] = [
    Dim(Dimension::Curso),
    Dim(Dimension::Cidade),
    Dim(Dimension::Turno),
    Value(Measure::Vagas),
    Value(Measure::Inscricoes),
    Value(Measure::CandidatosPorVaga),
];

const IT_DETAIL_COLUMNS: [Column; 7] = [
    Dim(Dimension::Curso),
    Dim(Dimension::Cidade),
    Dim(Dimension::Turno),
    Value(Measure::Vagas),
    Value(Measure::Inscricoes),
    Value(Measure::CandidatosPorVaga),
    Dim(Dimension::Modalidade),
];

const DEMAND_COLUMNS: [Column; 4] = [
    Dim(Dimension::Curso),
    Dim(Dimension::Cidade),
    Value(Measure::Inscricoes),
    Value(Measure::CandidatosPorVaga),
];

const FULL_COLUMNS: [Column; 8] = [
    Dim(Dimension::Curso),
    Dim(Dimension::Cidade),
    Dim(Dimension::Turno),
    Dim(Dimension::Modalidade),
    Value(Measure::Vagas),
    Value(Measure::Inscricoes),
    Value(Measure::CandidatosPorVaga),
    Value(Measure::TaxaOcupacao),
];

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bars,
    HorizontalBars,
    GroupedBars,
    Donut,
}

/// How marks are coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coloring {
    /// One hue per category; categories are values of the dimension.
    Categories(Dimension),
    /// One hue per series; series names are values of the dimension when
    /// given, otherwise hues follow series order.
    Series(Option<Dimension>),
    /// By value on a ramp.
    Sequential(Ramp),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// One categorical axis and one or more numeric series over it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: String,
    pub kind: ChartKind,
    pub coloring: Coloring,
    pub category_label: &'static str,
    pub value_label: &'static str,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

fn registrations(g: &GroupSummary) -> f64 {
    g.inscricoes as f64
}

fn rounded_ratio(g: &GroupSummary) -> f64 {
    g.mean_candidatos_por_vaga.map(round2).unwrap_or(0.0)
}

struct ChartBuilder {
    id: &'static str,
    title: String,
    kind: ChartKind,
    coloring: Coloring,
    category_label: &'static str,
    value_label: &'static str,
}

impl ChartBuilder {
    fn new(id: &'static str, title: impl Into<String>, kind: ChartKind) -> Self {
        ChartBuilder {
            id,
            title: title.into(),
            kind,
            coloring: Coloring::Series(None),
            category_label: "",
            value_label: "",
        }
    }

    fn colored(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }

    fn labels(mut self, category: &'static str, value: &'static str) -> Self {
        self.category_label = category;
        self.value_label = value;
        self
    }

    /// One series read from each group.
    fn groups(self, groups: &[GroupSummary], name: &str, value: fn(&GroupSummary) -> f64) -> ChartSpec {
        let series = vec![Series {
            name: name.to_string(),
            values: groups.iter().map(value).collect(),
        }];
        self.finish(groups.iter().map(|g| g.key.clone()).collect(), series)
    }

    fn finish(self, categories: Vec<String>, series: Vec<Series>) -> ChartSpec {
        ChartSpec {
            id: self.id,
            title: self.title,
            kind: self.kind,
            coloring: self.coloring,
            category_label: self.category_label,
            value_label: self.value_label,
            categories,
            series,
        }
    }
}

/// Registrations per city with one series per course, in order of first
/// appearance. Repeated (course, city) pairs are summed.
fn registrations_by_city_and_course(selection: &Selection<'_>) -> (Vec<String>, Vec<Series>) {
    let mut cities: Vec<String> = Vec::new();
    let mut series: Vec<Series> = Vec::new();

    for rec in selection.records() {
        let city = match cities.iter().position(|c| *c == rec.cidade) {
            Some(i) => i,
            None => {
                cities.push(rec.cidade.clone());
                for s in &mut series {
                    s.values.push(0.0);
                }
                cities.len() - 1
            }
        };
        let course = match series.iter().position(|s| s.name == rec.curso) {
            Some(i) => i,
            None => {
                series.push(Series {
                    name: rec.curso.clone(),
                    values: vec![0.0; cities.len()],
                });
                series.len() - 1
            }
        };
        series[course].values[city] += f64::from(rec.inscricoes);
    }

    (cities, series)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CourseTypeView {
    pub groups: Vec<GroupSummary>,
    pub registrations: ChartSpec,
    pub ratio: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItView {
    pub metrics: HeadlineMetrics,
    pub detail: Table,
    pub by_city: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeachingView {
    pub metrics: HeadlineMetrics,
    pub most_sought: Table,
    pub least_sought: Table,
    pub top_courses: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityView {
    pub groups: Vec<GroupSummary>,
    pub registrations: ChartSpec,
    pub ratio: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftView {
    pub groups: Vec<GroupSummary>,
    pub share: ChartSpec,
    pub seats_vs_registrations: ChartSpec,
}

/// Every view of the dashboard for one filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: usize,
    pub overview: HeadlineMetrics,
    pub most_competitive: Table,
    pub least_demanded: Table,
    pub by_course_type: CourseTypeView,
    pub it_courses: Section<ItView>,
    pub teaching_degrees: Section<TeachingView>,
    pub by_city: CityView,
    pub by_shift: ShiftView,
    pub full_table: Table,
}

impl Report {
    pub fn build(dataset: &Dataset, filters: &FilterSpec, config: &DashboardConfig) -> Self {
        let selection = apply(dataset, filters);
        let n = config.ranking_size;

        Report {
            rows: selection.len(),
            overview: headline(&selection),
            most_competitive: Table::from_records(
                &RANKING_COLUMNS,
                top_n(&selection, Measure::CandidatosPorVaga, n, Direction::Largest),
            ),
            least_demanded: Table::from_records(
                &RANKING_COLUMNS,
                top_n(&selection, Measure::CandidatosPorVaga, n, Direction::Smallest),
            ),
            by_course_type: course_type_view(&selection),
            it_courses: it_view(&selection, &config.it_course_term),
            teaching_degrees: teaching_view(&selection, config),
            by_city: city_view(&selection, config.group_limit),
            by_shift: shift_view(&selection),
            full_table: Table::from_records(
                &FULL_COLUMNS,
                sorted_by(&selection, Measure::CandidatosPorVaga, Direction::Largest),
            ),
        }
    }
}

fn course_type_view(selection: &Selection<'_>) -> CourseTypeView {
    let groups = group_by(selection, Dimension::TipoCurso);
    CourseTypeView {
        registrations: ChartBuilder::new("type_registrations", "Inscrições por Tipo de Curso", ChartKind::Bars)
            .colored(Coloring::Categories(Dimension::TipoCurso))
            .labels("Tipo de Curso", "Número de Inscrições")
            .groups(&groups, "Inscrições", registrations),
        ratio: ChartBuilder::new(
            "type_ratio",
            "Média de Candidatos por Vaga (por Tipo)",
            ChartKind::Bars,
        )
        .colored(Coloring::Categories(Dimension::TipoCurso))
        .labels("Tipo de Curso", "Candidatos/Vaga")
        .groups(&groups, "Candidatos/Vaga", rounded_ratio),
        groups,
    }
}

fn it_view(selection: &Selection<'_>, term: &str) -> Section<ItView> {
    let it = course_contains(selection, term);
    let Section::Ready(metrics) = restricted(&it) else {
        return Section::Empty;
    };
    let (cities, series) = registrations_by_city_and_course(&it);
    Section::Ready(ItView {
        metrics,
        detail: Table::from_records(&IT_DETAIL_COLUMNS, it.records()),
        by_city: ChartBuilder::new("it_by_city", "Inscrições em Cursos de TI por Cidade", ChartKind::GroupedBars)
            .colored(Coloring::Series(Some(Dimension::Curso)))
            .labels("Cidade", "Número de Inscrições")
            .finish(cities, series),
    })
}

fn teaching_view(selection: &Selection<'_>, config: &DashboardConfig) -> Section<TeachingView> {
    let degrees = where_equals(selection, Dimension::TipoCurso, &config.teaching_degree_type);
    let Section::Ready(metrics) = restricted(&degrees) else {
        return Section::Empty;
    };
    let n = config.ranking_size;
    let courses = by_registrations_desc(group_by(&degrees, Dimension::Curso), Some(config.group_limit));
    Section::Ready(TeachingView {
        metrics,
        most_sought: Table::from_records(
            &DEMAND_COLUMNS,
            top_n(&degrees, Measure::Inscricoes, n, Direction::Largest),
        ),
        least_sought: Table::from_records(
            &DEMAND_COLUMNS,
            top_n(&degrees, Measure::Inscricoes, n, Direction::Smallest),
        ),
        top_courses: ChartBuilder::new(
            "teaching_courses",
            format!("Top {} {}s por Total de Inscrições", config.group_limit, config.teaching_degree_type),
            ChartKind::HorizontalBars,
        )
        .colored(Coloring::Sequential(Ramp::Blues))
        .labels("Curso", "Total de Inscrições")
        .groups(&courses, "Inscrições", registrations),
    })
}

fn city_view(selection: &Selection<'_>, limit: usize) -> CityView {
    let groups = by_registrations_desc(group_by(selection, Dimension::Cidade), Some(limit));
    CityView {
        registrations: ChartBuilder::new(
            "city_registrations",
            format!("Top {limit} Cidades por Número de Inscrições"),
            ChartKind::HorizontalBars,
        )
        .colored(Coloring::Sequential(Ramp::Viridis))
        .labels("Cidade", "Número de Inscrições")
        .groups(&groups, "Inscrições", registrations),
        ratio: ChartBuilder::new(
            "city_ratio",
            format!("Top {limit} Cidades por Candidatos/Vaga"),
            ChartKind::HorizontalBars,
        )
        .colored(Coloring::Sequential(Ramp::Reds))
        .labels("Cidade", "Candidatos por Vaga")
        .groups(&groups, "Candidatos/Vaga", rounded_ratio),
        groups,
    }
}

fn shift_view(selection: &Selection<'_>) -> ShiftView {
    let groups = group_by(selection, Dimension::Turno);
    let categories: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
    ShiftView {
        share: ChartBuilder::new("shift_share", "Distribuição de Inscrições por Turno", ChartKind::Donut)
            .colored(Coloring::Categories(Dimension::Turno))
            .labels("Turno", "Inscrições")
            .groups(&groups, "Inscrições", registrations),
        seats_vs_registrations: ChartBuilder::new("shift_bars", "Vagas vs Inscrições por Turno", ChartKind::GroupedBars)
            .labels("Turno", "Quantidade")
            .finish(
                categories,
                vec![
                    Series {
                        name: "Vagas".to_string(),
                        values: groups.iter().map(|g| g.vagas as f64).collect(),
                    },
                    Series {
                        name: "Inscrições".to_string(),
                        values: groups.iter().map(registrations).collect(),
                    },
                ],
            ),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::scenario;

    fn build(filters: &FilterSpec) -> Report {
        Report::build(&scenario(), filters, &DashboardConfig::default())
    }

    #[test]
    fn unfiltered_report_covers_every_view() {
        let report = build(&FilterSpec::new());
        assert_eq!(report.rows, 3);
        assert_eq!(report.overview.total_vagas, 90);
        assert_eq!(report.overview.total_inscricoes, 135);
        assert_eq!(report.overview.mean_candidatos_por_vaga, Some(1.75));
        assert_eq!(report.most_competitive.rows[0][0], "Sistemas de Informação");
        assert_eq!(report.most_competitive.rows[0][5], "3.00");
        assert_eq!(report.least_demanded.rows[0][4], "0");
        assert_eq!(report.full_table.rows.len(), 3);
        assert_eq!(report.full_table.columns.len(), 8);
    }

    #[test]
    fn it_section_uses_registration_only_mean() {
        let report = build(&FilterSpec::new());
        let it = report.it_courses.as_ready().unwrap();
        assert_eq!(it.metrics.total_vagas, 60);
        assert_eq!(it.metrics.total_inscricoes, 120);
        assert_eq!(it.metrics.mean_candidatos_por_vaga, Some(3.0));
        assert_eq!(it.detail.rows.len(), 2);
        assert_eq!(it.by_city.categories, vec!["Goiânia", "Anápolis"]);
        assert_eq!(it.by_city.series.len(), 1);
        assert_eq!(it.by_city.series[0].values, vec![120.0, 0.0]);
    }

    #[test]
    fn city_view_is_ordered_by_registrations() {
        let report = build(&FilterSpec::new());
        let keys: Vec<&str> = report.by_city.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Goiânia", "Anápolis"]);
        assert_eq!(report.by_city.ratio.series[0].values, vec![3.0, 0.25]);
    }

    #[test]
    fn teaching_section_ranks_by_registrations() {
        let report = build(&FilterSpec::new());
        let lic = report.teaching_degrees.as_ready().unwrap();
        assert_eq!(lic.metrics.total_vagas, 30);
        assert_eq!(lic.most_sought.rows, vec![vec!["Pedagogia", "Anápolis", "15", "0.50"]]);
        assert_eq!(lic.top_courses.categories, vec!["Pedagogia"]);
    }

    #[test]
    fn shift_view_pairs_seats_and_registrations() {
        let report = build(&FilterSpec::new());
        let chart = &report.by_shift.seats_vs_registrations;
        assert_eq!(chart.categories, vec!["Matutino", "Noturno"]);
        assert_eq!(chart.series[0].values, vec![30.0, 60.0]);
        assert_eq!(chart.series[1].values, vec![15.0, 120.0]);
        assert_eq!(chart.max_value(), 120.0);
    }

    #[test]
    fn filter_without_it_courses_yields_empty_section() {
        let report = build(&FilterSpec::new().with(Dimension::Curso, "Pedagogia"));
        assert!(report.it_courses.is_empty());
        assert!(report.teaching_degrees.as_ready().is_some());
    }

    #[test]
    fn empty_selection_degrades_to_no_data() {
        let report = build(&FilterSpec::new().with(Dimension::Cidade, "Formosa"));
        assert_eq!(report.rows, 0);
        assert_eq!(report.overview.mean_candidatos_por_vaga, None);
        assert!(report.most_competitive.is_empty());
        assert!(report.by_course_type.registrations.is_empty());
        assert!(report.it_courses.is_empty());
        assert!(report.teaching_degrees.is_empty());
        assert!(report.by_city.groups.is_empty());
        assert!(report.by_shift.share.is_empty());
        assert!(report.full_table.is_empty());
    }

    #[test]
    fn city_course_matrix_zero_fills_and_sums_pairs() {
        let offering = |curso: &str, cidade: &str, inscricoes| {
            Record::new(curso, cidade, "Bacharelado", "Noturno", "Presencial", 40, inscricoes)
        };
        let ds = Dataset::from_records(vec![
            offering("Sistemas de Informação", "Goiânia", 100),
            offering("Sistemas de Informação", "Anápolis", 50),
            offering("Ciência da Computação", "Formosa", 30),
            offering("Sistemas de Informação", "Goiânia", 20),
            offering("Ciência da Computação", "Anápolis", 10),
        ]);

        let (cities, series) = registrations_by_city_and_course(&Selection::all(&ds));

        assert_eq!(cities, vec!["Goiânia", "Anápolis", "Formosa"]);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sistemas de Informação", "Ciência da Computação"]);
        assert_eq!(series[0].values, vec![120.0, 50.0, 0.0]);
        assert_eq!(series[1].values, vec![0.0, 10.0, 30.0]);
    }
}
