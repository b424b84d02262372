use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, SelectionEvent};

// ---------------------------------------------------------------------------
// Left side panel – continent picker and year slider
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.label("Select continents and year to filter the data.");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Controls only emit events; state changes happen after rendering.
    let mut events = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year slider (snaps to known years) ----
            let years = dataset.year_list();
            ui.strong("Year");
            if let (Some(&first), Some(&last)) = (years.first(), years.last()) {
                let current = state
                    .selection
                    .year
                    .and_then(|y| years.iter().position(|&k| k == y));
                let mut idx = current.unwrap_or(years.len() - 1);

                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("◀").clicked() {
                        events.push(SelectionEvent::StepYear(-1));
                    }
                    let slider = egui::Slider::new(&mut idx, 0..=years.len() - 1).show_value(false);
                    if ui.add(slider).changed() {
                        events.push(SelectionEvent::SetYear(years[idx]));
                    }
                    if ui.small_button("▶").clicked() {
                        events.push(SelectionEvent::StepYear(1));
                    }
                });

                let shown = match state.selection.year {
                    Some(y) => y.to_string(),
                    None => "?".to_string(),
                };
                ui.label(RichText::new(shown).size(18.0).strong());
                ui.label(RichText::new(format!("{first} – {last}")).weak());
            }
            ui.separator();

            // ---- Continent multi-select ----
            let n_selected = state.selection.continents.len();
            let n_total = dataset.continents.len();
            let header_text = if n_selected == 0 {
                "Continent  (all)".to_string()
            } else {
                format!("Continent  ({n_selected}/{n_total})")
            };

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("continent_picker")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            events.push(SelectionEvent::SelectAllContinents);
                        }
                        if ui.small_button("None").clicked() {
                            events.push(SelectionEvent::ClearContinents);
                        }
                    });

                    for continent in &dataset.continents {
                        let mut checked = state.selection.continents.contains(continent);
                        let text =
                            RichText::new(continent).color(state.color_map.color_for(continent));
                        if ui.checkbox(&mut checked, text).changed() {
                            events.push(SelectionEvent::ToggleContinent(continent.clone()));
                        }
                    }
                });
        });

    for event in events {
        state.dispatch(event);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country-year data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
