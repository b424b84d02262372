use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, SelectionEvent};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GapminderApp {
    pub state: AppState,
}

impl GapminderApp {
    pub fn new(config: DashboardConfig) -> Self {
        let startup_path = config.dataset_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = startup_path {
            state.load_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for GapminderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Arrow keys step the year unless a text field has focus ----
        if !ctx.wants_keyboard_input() {
            let (left, right) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            if left {
                self.state.dispatch(SelectionEvent::StepYear(-1));
            }
            if right {
                self.state.dispatch(SelectionEvent::StepYear(1));
            }
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: table ----
        egui::TopBottomPanel::bottom("table_panel")
            .default_height(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::data_table(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::scatter_plot(ui, &self.state);
        });
    }
}
