use eframe::egui::{self, Align, Layout, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, TableEvent};
use crate::table::{SortDirection, COLUMNS};

// ---------------------------------------------------------------------------
// Filtered data table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the paged, sortable, filterable table of the current selection.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtered Data");

    if state.dataset.is_none() {
        return;
    }

    let mut events = Vec::new();
    let n_rows = state.table_rows.len();
    let page_count = state.table.page_count(n_rows);
    let page = state.table.page;

    // ---- Pager ----
    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(page > 0, egui::Button::new("◀ Prev")).clicked() {
            events.push(TableEvent::GoToPage(page - 1));
        }
        ui.label(format!("Page {} of {page_count}  ({n_rows} rows)", page + 1));
        if ui
            .add_enabled(page + 1 < page_count, egui::Button::new("Next ▶"))
            .clicked()
        {
            events.push(TableEvent::GoToPage(page + 1));
        }
    });
    ui.separator();

    let page_rows = state.table.page(&state.table_rows);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(100.0).at_most(240.0).clip(true), COLUMNS.len())
        .min_scrolled_height(0.0)
        .header(48.0, |mut header| {
            for column in COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        let arrow = match state.table.sort_direction(column) {
                            Some(SortDirection::Ascending) => " ⏶",
                            Some(SortDirection::Descending) => " ⏷",
                            None => "",
                        };
                        if ui.button(format!("{column}{arrow}")).clicked() {
                            events.push(TableEvent::SortBy(column.to_string()));
                        }

                        let mut query = state.table.filters.get(column).cloned().unwrap_or_default();
                        let edit = TextEdit::singleline(&mut query).hint_text("filter data…");
                        if ui.add(edit).changed() {
                            events.push(TableEvent::SetFilter {
                                column: column.to_string(),
                                query,
                            });
                        }
                    });
                });
            }
        })
        .body(|mut body| {
            for row in page_rows {
                body.row(20.0, |mut table_row| {
                    for column in COLUMNS {
                        table_row.col(|ui: &mut Ui| {
                            if let Some(cell) = row.get(column) {
                                ui.label(cell.to_string());
                            }
                        });
                    }
                });
            }
        });

    for event in events {
        state.table_event(event);
    }
}
