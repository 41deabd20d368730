use std::collections::VecDeque;

use crate::dispatch::{Failure, ViewData};
use crate::pipeline::{Selection, ViewOutcome, arrange};
use crate::sort_filter::SortState;
use crate::view::View;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub last_path: Option<String>,
    pub last_error: Option<String>,
}

/// Presentation-shell state. The pipeline itself never sees this; it receives a
/// [`Selection`] snapshot built from it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub period: Option<u32>,
    pub current_period: Option<u32>,
    pub sort: SortState,
    pub filter: String,
    pub filter_editing: bool,
    pub dataset: DatasetStatus,
    pub dispatched: Option<Result<ViewData, Failure>>,
    pub outcome: Option<ViewOutcome>,
    pub needs_dispatch: bool,
    pub selected_column: usize,
    pub scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::CurrentPeriod,
            period: None,
            current_period: None,
            sort: SortState::default(),
            filter: String::new(),
            filter_editing: false,
            dataset: DatasetStatus::Loading,
            dispatched: None,
            outcome: None,
            needs_dispatch: false,
            selected_column: 0,
            scroll: 0,
            logs: VecDeque::new(),
            help_overlay: false,
            export: ExportState::default(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Called once the snapshot is open. The week selector defaults to the current week.
    pub fn dataset_ready(&mut self, current_period: Option<u32>) {
        self.dataset = DatasetStatus::Ready;
        self.current_period = current_period;
        self.period = current_period;
        match current_period {
            Some(week) => self.push_log(format!("[INFO] Current week: {week}")),
            None => self.push_log("[WARN] Snapshot has no current week; week views disabled"),
        }
        self.needs_dispatch = true;
    }

    pub fn dataset_failed(&mut self, message: String) {
        self.push_log(format!("[WARN] Snapshot load failed: {message}"));
        self.dataset = DatasetStatus::Failed(message);
    }

    /// Snapshot of the current choices, or `None` when the view needs a week and none is
    /// known.
    pub fn selection(&self) -> Option<Selection> {
        let period = match (self.period, self.view.is_period_scoped()) {
            (Some(period), _) => period,
            (None, false) => 1,
            (None, true) => return None,
        };
        Some(Selection {
            view: self.view,
            period,
            sort: self.sort.clone(),
            filter: self.filter.clone(),
        })
    }

    pub fn set_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        self.view = view;
        self.filter_editing = false;
        self.scroll = 0;
        self.selected_column = 0;
        self.needs_dispatch = true;
    }

    pub fn next_view(&mut self) {
        self.set_view(self.view.next());
    }

    pub fn period_up(&mut self) {
        let (Some(period), Some(current)) = (self.period, self.current_period) else {
            return;
        };
        if period < current {
            self.period = Some(period + 1);
            self.needs_dispatch = true;
        }
    }

    pub fn period_down(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        if period > 1 {
            self.period = Some(period - 1);
            self.needs_dispatch = true;
        }
    }

    /// Columns the user can sort on in the current view.
    pub fn sortable_columns(&self) -> &[String] {
        match &self.outcome {
            Some(outcome) if outcome.view != View::MatchupDetails => &outcome.columns,
            _ => &[],
        }
    }

    pub fn select_column_next(&mut self) {
        let total = self.sortable_columns().len();
        if total > 0 {
            self.selected_column = (self.selected_column + 1) % total;
        }
    }

    pub fn select_column_prev(&mut self) {
        let total = self.sortable_columns().len();
        if total == 0 {
            return;
        }
        self.selected_column = if self.selected_column == 0 {
            total - 1
        } else {
            self.selected_column - 1
        };
    }

    pub fn toggle_sort_on_selected(&mut self) {
        let Some(column) = self.sortable_columns().get(self.selected_column).cloned() else {
            return;
        };
        self.sort.toggle(&column);
        self.push_log(format!(
            "[INFO] Sort: {column} {}",
            self.sort.direction.arrow()
        ));
        self.rearrange();
    }

    pub fn begin_filter(&mut self) {
        if self.view == View::Rosters {
            self.filter_editing = true;
        }
    }

    pub fn end_filter(&mut self) {
        self.filter_editing = false;
    }

    pub fn filter_push(&mut self, ch: char) {
        self.filter.push(ch);
        self.rearrange();
    }

    pub fn filter_pop(&mut self) {
        if self.filter.pop().is_some() {
            self.rearrange();
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Stores a fresh dispatch result and rebuilds the presented outcome from it.
    pub fn apply_dispatch(&mut self, dispatched: Result<ViewData, Failure>) {
        self.needs_dispatch = false;
        if let Err(failure) = &dispatched {
            self.push_log(format!("[WARN] {failure}"));
        }
        self.dispatched = Some(dispatched);
        self.rearrange();
        self.selected_column = self
            .selected_column
            .min(self.sortable_columns().len().saturating_sub(1));
    }

    /// Used when the view cannot be dispatched at all (no week known).
    pub fn clear_view(&mut self) {
        self.needs_dispatch = false;
        self.dispatched = None;
        self.outcome = None;
    }

    /// Re-applies sort, filter and derivation without querying again.
    pub fn rearrange(&mut self) {
        let (Some(selection), Some(dispatched)) = (self.selection(), self.dispatched.as_ref())
        else {
            self.outcome = None;
            return;
        };
        self.outcome = Some(arrange(&selection, dispatched));
    }

    /// Records how the last export went and logs it.
    pub fn export_finished(&mut self, result: Result<String, String>) {
        match result {
            Ok(path) => {
                self.push_log(format!("[INFO] Exported to {path}"));
                self.export.last_path = Some(path);
                self.export.last_error = None;
            }
            Err(err) => {
                self.push_log(format!("[WARN] Export failed: {err}"));
                self.export.last_error = Some(err);
            }
        }
    }

    /// Footer note for the last export, the error winning over an older success.
    pub fn export_status(&self) -> Option<String> {
        if let Some(err) = &self.export.last_error {
            return Some(format!("Export failed: {err}"));
        }
        self.export
            .last_path
            .as_ref()
            .map(|path| format!("Exported {path}"))
    }

    pub fn failure_message(&self) -> Option<String> {
        self.outcome
            .as_ref()
            .and_then(|outcome| outcome.failure.as_ref())
            .map(|failure| failure.to_string())
    }
}
