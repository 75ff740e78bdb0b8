use eframe::egui::{Color32, Frame, RichText, Ui};

use crate::data::metrics::HeadlineMetrics;
use crate::format::{optional_decimal2, thousands};
use crate::state::AppState;

use super::charts::chart;
use super::tables::table;

const CHART_HEIGHT: f32 = 280.0;
const TABLE_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel – every section of the report
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading(RichText::new(&state.config.window_title).size(26.0));
    ui.label(RichText::new("Análise de Inscrições Deferidas por Curso e Cidade").size(16.0));
    Frame::group(ui.style())
        .fill(Color32::from_rgb(220, 245, 225))
        .show(ui, |ui: &mut Ui| {
            ui.colored_label(
                Color32::from_rgb(20, 90, 40),
                format!(
                    "Cobertura dos dados: {} inscrições em {} ofertas",
                    thousands(state.coverage),
                    thousands(state.dataset.len() as u64)
                ),
            );
        });
    ui.separator();

    overview(ui, state);
    ui.separator();
    insights(ui, state);
    ui.separator();
    course_types(ui, state);
    ui.separator();
    it_courses(ui, state);
    ui.separator();
    teaching_degrees(ui, state);
    ui.separator();
    cities(ui, state);
    ui.separator();
    shifts(ui, state);
    ui.separator();

    ui.heading("Dados Completos");
    table(ui, "full_table", &state.report.full_table, 420.0);

    ui.separator();
    ui.label(RichText::new("Fonte: Edital do Vestibular e Lista de Inscrições Deferidas").weak());
}

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

/// Seats, registrations and mean ratio, labelled for one section.
fn headline_row(ui: &mut Ui, metrics: &HeadlineMetrics, labels: [&str; 3]) {
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], labels[0], thousands(metrics.total_vagas));
        metric(&mut cols[1], labels[1], thousands(metrics.total_inscricoes));
        metric(&mut cols[2], labels[2], optional_decimal2(metrics.mean_candidatos_por_vaga));
    });
}

fn overview(ui: &mut Ui, state: &AppState) {
    let m = &state.report.overview;
    ui.heading("Métricas Gerais");
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total de Vagas", thousands(m.total_vagas));
        metric(&mut cols[1], "Total de Inscrições", thousands(m.total_inscricoes));
        metric(
            &mut cols[2],
            "Média Candidatos/Vaga",
            optional_decimal2(m.mean_candidatos_por_vaga),
        );
        metric(
            &mut cols[3],
            "Cursos com Inscrições",
            format!("{}/{}", m.offerings_with_registrations, m.offerings),
        );
    });
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn insights(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    ui.heading("Principais Insights");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Cursos Mais Concorridos");
        table(&mut cols[0], "most_competitive", &report.most_competitive, TABLE_HEIGHT);
        cols[1].strong("Cursos com Menor Procura");
        table(&mut cols[1], "least_demanded", &report.least_demanded, TABLE_HEIGHT);
    });
}

fn course_types(ui: &mut Ui, state: &AppState) {
    let view = &state.report.by_course_type;
    ui.heading("Análise por Tipo de Curso");
    ui.columns(2, |cols: &mut [Ui]| {
        chart(&mut cols[0], &view.registrations, state, CHART_HEIGHT);
        chart(&mut cols[1], &view.ratio, state, CHART_HEIGHT);
    });
}

fn it_courses(ui: &mut Ui, state: &AppState) {
    ui.heading("Análise Especial: Cursos de Tecnologia da Informação");
    let Some(view) = state.report.it_courses.as_ready() else {
        ui.label("Nenhum curso de TI encontrado com os filtros selecionados.");
        return;
    };

    headline_row(ui, &view.metrics, ["Vagas em TI", "Inscrições em TI", "Média Cand/Vaga TI"]);
    ui.strong("Detalhamento dos Cursos de TI");
    table(ui, "it_detail", &view.detail, TABLE_HEIGHT);
    chart(ui, &view.by_city, state, CHART_HEIGHT);
}

fn teaching_degrees(ui: &mut Ui, state: &AppState) {
    let kind = &state.config.teaching_degree_type;
    ui.heading(format!("Análise Especial: {kind}s"));
    let Some(view) = state.report.teaching_degrees.as_ready() else {
        ui.label(format!(
            "Nenhuma {} encontrada com os filtros selecionados.",
            kind.to_lowercase()
        ));
        return;
    };

    let seats = format!("Vagas em {kind}s");
    let registrations = format!("Inscrições em {kind}s");
    headline_row(ui, &view.metrics, [seats.as_str(), registrations.as_str(), "Média Cand/Vaga"]);
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong(format!("{kind}s Mais Procuradas"));
        table(&mut cols[0], "teaching_most", &view.most_sought, TABLE_HEIGHT);
        cols[1].strong(format!("{kind}s Menos Procuradas"));
        table(&mut cols[1], "teaching_least", &view.least_sought, TABLE_HEIGHT);
    });
    chart(ui, &view.top_courses, state, 360.0);
}

fn cities(ui: &mut Ui, state: &AppState) {
    let view = &state.report.by_city;
    ui.heading("Análise por Cidade");
    ui.columns(2, |cols: &mut [Ui]| {
        chart(&mut cols[0], &view.registrations, state, 360.0);
        chart(&mut cols[1], &view.ratio, state, 360.0);
    });
}

fn shifts(ui: &mut Ui, state: &AppState) {
    let view = &state.report.by_shift;
    ui.heading("Análise por Turno");
    ui.columns(2, |cols: &mut [Ui]| {
        chart(&mut cols[0], &view.share, state, CHART_HEIGHT);
        chart(&mut cols[1], &view.seats_vs_registrations, state, CHART_HEIGHT);
    });
}
