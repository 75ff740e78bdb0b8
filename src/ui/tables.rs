use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column as Width, TableBuilder};

use crate::report::Table;

use super::NO_DATA;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// Render a report table. Numeric columns are right-aligned; rows are
/// virtualised so the full dataset table stays cheap.
pub fn table(ui: &mut Ui, id: &str, table: &Table, max_height: f32) {
    if table.is_empty() {
        ui.label(RichText::new(NO_DATA).weak());
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(max_height)
            .cell_layout(Layout::left_to_right(Align::Center));

        for (i, col) in table.columns.iter().enumerate() {
            builder = builder.column(if i == 0 {
                Width::auto().at_least(160.0)
            } else if col.is_numeric() {
                Width::auto().at_least(60.0)
            } else {
                Width::auto().at_least(90.0)
            });
        }

        builder
            .header(22.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.header());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for (col, cell) in table.columns.iter().zip(cells) {
                        row.col(|ui: &mut Ui| {
                            if col.is_numeric() {
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                                    ui.label(cell);
                                });
                            } else {
                                ui.label(cell);
                            }
                        });
                    }
                });
            });
    });
}
