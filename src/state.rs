use std::path::Path;
use std::sync::Arc;

use crate::chart::{project_chart, ChartSpec};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{filter, Selection};
use crate::data::model::Dataset;
use crate::table::{project_rows, TableRow, TableState};

// ---------------------------------------------------------------------------
// Events delivered by the controls
// ---------------------------------------------------------------------------

/// A change to one of the two filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    ToggleContinent(String),
    SelectAllContinents,
    ClearContinents,
    SetYear(i64),
    /// Move to the previous (negative) or next (positive) known year.
    StepYear(i32),
}

/// A change to the table's own sort/filter/paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    SortBy(String),
    SetFilter { column: String, query: String },
    GoToPage(usize),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is opened). Read-only once loaded.
    pub dataset: Option<Arc<Dataset>>,

    /// Current continent/year selection.
    pub selection: Selection,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Continent colours, fixed per dataset.
    pub color_map: ColorMap,

    /// Chart for the current selection.
    pub chart: Option<ChartSpec>,

    /// Table rows for the current selection, before table-level filtering.
    pub rows: Vec<TableRow>,

    /// Table sort/filter/paging.
    pub table: TableState,

    /// `rows` after the table's own filter and sort.
    pub table_rows: Vec<TableRow>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let table = TableState::new(config.page_size);
        Self {
            config,
            dataset: None,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            color_map: ColorMap::default(),
            chart: None,
            rows: Vec::new(),
            table,
            table_rows: Vec::new(),
            status_message: None,
        }
    }

    /// Load a file and install it. On failure the current dataset stays
    /// and the error is shown in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {} ({} continents, years {:?})",
                    dataset.len(),
                    path.display(),
                    dataset.continents.len(),
                    dataset.years
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: colours, startup selection, views.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.color_map = ColorMap::new(&dataset.continents);
        self.selection = Selection::initial(&dataset);
        self.table = TableState::new(self.config.page_size);
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.recompute();
    }

    /// Apply a control change and recompute everything derived from it.
    pub fn dispatch(&mut self, event: SelectionEvent) {
        log::debug!("selection event: {event:?}");
        match event {
            SelectionEvent::ToggleContinent(continent) => {
                if !self.selection.continents.remove(&continent) {
                    self.selection.continents.insert(continent);
                }
            }
            SelectionEvent::SelectAllContinents => {
                if let Some(ds) = &self.dataset {
                    self.selection.continents = ds.continents.clone();
                }
            }
            SelectionEvent::ClearContinents => self.selection.continents.clear(),
            SelectionEvent::SetYear(year) => self.selection.year = Some(year),
            SelectionEvent::StepYear(delta) => {
                if let Some(year) = self.stepped_year(delta) {
                    self.selection.year = Some(year);
                }
            }
        }
        self.recompute();
    }

    fn stepped_year(&self, delta: i32) -> Option<i64> {
        let years = self.dataset.as_ref()?.year_list();
        let current = self
            .selection
            .year
            .and_then(|y| years.iter().position(|&k| k == y));
        let Some(pos) = current else {
            return years.last().copied();
        };
        let target = (pos as i64 + i64::from(delta)).clamp(0, years.len() as i64 - 1);
        years.get(target as usize).copied()
    }

    /// Re-run the filter and both projections from scratch.
    pub fn recompute(&mut self) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        let view = filter(&ds, &self.selection);
        self.chart = Some(project_chart(
            &view,
            self.selection.year,
            &self.color_map,
            &self.config,
        ));
        self.rows = project_rows(&view);
        if view.is_empty() {
            log::debug!("selection {:?} matches no records", self.selection);
        } else {
            log::debug!(
                "selection {:?} matched {} of {} records",
                self.selection,
                view.len(),
                ds.len()
            );
        }
        self.visible_indices = view.indices().to_vec();
        self.refresh_table();
    }

    pub fn table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::SortBy(column) => self.table.cycle_sort(&column),
            TableEvent::SetFilter { column, query } => self.table.set_filter(&column, &query),
            TableEvent::GoToPage(page) => self.table.page = page,
        }
        self.refresh_table();
    }

    fn refresh_table(&mut self) {
        self.table_rows = self.table.apply(&self.rows);
        self.table.clamp_page(self.table_rows.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_dataset;
    use crate::table::CellValue;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state
    }

    fn chart_countries(state: &AppState) -> Vec<String> {
        state
            .chart
            .as_ref()
            .map(|c| c.points.iter().map(|p| p.country.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn startup_shows_latest_year_for_all_continents() {
        let state = loaded();
        assert_eq!(state.selection.year, Some(2007));
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(chart_countries(&state), vec!["A", "B"]);
        assert_eq!(state.rows.len(), 2);
        assert_eq!(state.table_rows.len(), 2);
    }

    #[test]
    fn toggling_a_continent_refilters() {
        let mut state = loaded();
        state.dispatch(SelectionEvent::ToggleContinent("Europe".into()));
        assert_eq!(chart_countries(&state), vec!["A"]);
        state.dispatch(SelectionEvent::ToggleContinent("Europe".into()));
        assert_eq!(chart_countries(&state), vec!["A", "B"]);
    }

    #[test]
    fn clearing_continents_shows_everything() {
        let mut state = loaded();
        state.dispatch(SelectionEvent::ClearContinents);
        assert!(state.selection.continents.is_empty());
        assert_eq!(state.visible_indices, vec![0, 1]);
        state.dispatch(SelectionEvent::SelectAllContinents);
        assert_eq!(state.selection.continents.len(), 2);
    }

    #[test]
    fn year_changes_update_chart_and_table() {
        let mut state = loaded();
        state.dispatch(SelectionEvent::SetYear(2002));
        assert_eq!(chart_countries(&state), vec!["C"]);
        assert_eq!(
            state.chart.as_ref().map(|c| c.title.as_str()),
            Some("Life Expectancy vs GDP per Capita (2002)")
        );
        assert_eq!(state.table_rows[0]["country"], CellValue::Text("C".into()));

        state.dispatch(SelectionEvent::SetYear(1999));
        assert!(state.visible_indices.is_empty());
        assert!(state.table_rows.is_empty());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn stepping_years_is_clamped() {
        let mut state = loaded();
        state.dispatch(SelectionEvent::StepYear(1));
        assert_eq!(state.selection.year, Some(2007));
        state.dispatch(SelectionEvent::StepYear(-1));
        assert_eq!(state.selection.year, Some(2002));
        state.dispatch(SelectionEvent::StepYear(-5));
        assert_eq!(state.selection.year, Some(2002));
    }

    #[test]
    fn table_events_leave_selection_alone() {
        let mut state = loaded();
        state.table_event(TableEvent::SetFilter {
            column: "country".into(),
            query: "b".into(),
        });
        assert_eq!(state.table_rows.len(), 1);
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.dispatch(SelectionEvent::ToggleContinent("Europe".into()));
        assert!(state.table_rows.is_empty());
        assert_eq!(state.rows.len(), 1);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        state.load_path(Path::new("missing-file.csv"));
        assert!(state.status_message.is_some());
        assert!(state.dataset.is_some());
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn events_before_loading_are_ignored() {
        let mut state = AppState::default();
        state.dispatch(SelectionEvent::SetYear(2007));
        assert!(state.chart.is_none());
        assert!(state.visible_indices.is_empty());
    }
}
