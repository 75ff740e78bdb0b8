pub mod charts;
pub mod dashboard;
pub mod panels;
pub mod tables;

/// Shown in place of an empty table or chart.
pub const NO_DATA: &str = "Sem dados para os filtros selecionados.";
