use std::sync::Arc;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::format::thousands;
use crate::state::{AppState, FILTER_DIMENSIONS};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    // Hold our own handle so the state can be mutated inside the loop.
    let dataset = Arc::clone(&state.dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in FILTER_DIMENSIONS {
                let current = state.filters.selected(dim).map(str::to_string);
                let mut chosen = current.clone();

                ui.strong(dim.label());
                egui::ComboBox::from_id_salt(dim.column_name())
                    .selected_text(current.as_deref().unwrap_or(dim.all_label()))
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut chosen, None, dim.all_label());
                        for value in dataset.unique_values(dim) {
                            ui.selectable_value(&mut chosen, Some(value.to_string()), value);
                        }
                    });

                if chosen != current {
                    state.set_filter(dim, chosen);
                }
                ui.add_space(6.0);
            }

            ui.separator();
            let has_filters = !state.filters.is_unrestricted();
            if ui
                .add_enabled(has_filters, egui::Button::new("Limpar filtros"))
                .clicked()
            {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Sair").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();
        ui.label(RichText::new(&state.source).monospace());
        ui.separator();
        ui.label(format!(
            "{} de {} ofertas visíveis",
            thousands(state.report.rows as u64),
            thousands(state.dataset.len() as u64)
        ));

        for (dim, value) in state.filters.active() {
            ui.separator();
            ui.label(RichText::new(format!("{}: {value}", dim.label())).italics());
        }
    });
}
