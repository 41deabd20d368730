use botblitz_viewer::dataset::Value;
use botblitz_viewer::dispatch::{Failure, ViewData};
use botblitz_viewer::normalize::Record;
use botblitz_viewer::pipeline::ViewBody;
use botblitz_viewer::sort_filter::SortDirection;
use botblitz_viewer::state::{AppState, DatasetStatus};
use botblitz_viewer::view::View;

fn roster_data() -> ViewData {
    let row = |name: &str, team: Value, points: f64| {
        Record::from_pairs([
            ("full_name", Value::Text(name.to_string())),
            ("teamName", team),
            ("totalPoints", Value::Real(points)),
        ])
    };
    ViewData {
        columns: vec![
            "full_name".to_string(),
            "teamName".to_string(),
            "totalPoints".to_string(),
        ],
        records: vec![
            row("Zed", Value::Text("Alpha".to_string()), 5.0),
            row("Amy", Value::Text("Alpha".to_string()), 9.0),
            row("Lou", Value::Null, 1.0),
        ],
    }
}

#[test]
fn ready_dataset_selects_current_week() {
    let mut state = AppState::new();
    assert_eq!(state.dataset, DatasetStatus::Loading);
    state.dataset_ready(Some(4));
    assert_eq!(state.period, Some(4));
    assert!(state.needs_dispatch);
    let selection = state.selection().expect("week known");
    assert_eq!(selection.period, 4);
    assert_eq!(selection.view, View::CurrentPeriod);
}

#[test]
fn week_selector_is_clamped_to_known_weeks() {
    let mut state = AppState::new();
    state.dataset_ready(Some(2));
    state.period_up();
    assert_eq!(state.period, Some(2));
    state.period_down();
    state.period_down();
    state.period_down();
    assert_eq!(state.period, Some(1));
}

#[test]
fn unknown_week_only_blocks_week_scoped_views() {
    let mut state = AppState::new();
    state.dataset_ready(None);
    assert!(state.selection().is_none());
    state.set_view(View::Rosters);
    assert_eq!(state.selection().map(|s| s.period), Some(1));
}

#[test]
fn sort_survives_view_switch() {
    let mut state = AppState::new();
    state.dataset_ready(Some(3));
    state.set_view(View::Rosters);
    state.apply_dispatch(Ok(roster_data()));
    state.select_column_next();
    state.select_column_next();
    state.toggle_sort_on_selected();
    state.toggle_sort_on_selected();
    assert_eq!(state.sort.column.as_deref(), Some("totalPoints"));
    assert_eq!(state.sort.direction, SortDirection::Descending);

    state.set_view(View::Leaderboard);
    assert_eq!(state.sort.column.as_deref(), Some("totalPoints"));
    assert!(state.needs_dispatch);
}

#[test]
fn filter_edits_rearrange_without_redispatch() {
    let mut state = AppState::new();
    state.dataset_ready(Some(3));
    state.set_view(View::Rosters);
    state.apply_dispatch(Ok(roster_data()));
    assert!(!state.needs_dispatch);

    state.begin_filter();
    assert!(state.filter_editing);
    state.filter_push('a');
    state.filter_push('m');
    assert!(!state.needs_dispatch);

    let outcome = state.outcome.as_ref().expect("outcome");
    let ViewBody::Rosters(groups) = &outcome.body else {
        panic!("expected roster groups");
    };
    let alpha: Vec<String> = groups
        .get("Alpha")
        .unwrap()
        .iter()
        .map(|r| r.text("full_name"))
        .collect();
    assert_eq!(alpha, ["Amy"]);
    assert!(groups.get("Undrafted").unwrap().is_empty());

    state.filter_pop();
    state.filter_pop();
    state.end_filter();
    assert_eq!(state.outcome.as_ref().map(|o| o.body.row_count()), Some(3));
}

#[test]
fn filter_mode_is_only_offered_on_rosters() {
    let mut state = AppState::new();
    state.dataset_ready(Some(3));
    state.begin_filter();
    assert!(!state.filter_editing);
}

#[test]
fn failures_are_kept_and_logged() {
    let mut state = AppState::new();
    state.dataset_ready(Some(3));
    state.set_view(View::MatchupDetails);
    state.apply_dispatch(Err(Failure::MalformedInput("bad".to_string())));
    assert_eq!(
        state.failure_message().as_deref(),
        Some("malformed input: bad")
    );
    assert!(state.logs.back().is_some_and(|line| line.starts_with("[WARN]")));
    assert!(state.sortable_columns().is_empty());
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::new();
    for idx in 0..500 {
        state.push_log(format!("[INFO] line {idx}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] line 499"));
}

#[test]
fn export_status_tracks_the_latest_attempt() {
    let mut state = AppState::new();
    assert_eq!(state.export_status(), None);

    state.export_finished(Ok("out/rosters.xlsx".to_string()));
    assert_eq!(
        state.export_status().as_deref(),
        Some("Exported out/rosters.xlsx")
    );

    state.export_finished(Err("disk full".to_string()));
    assert_eq!(
        state.export_status().as_deref(),
        Some("Export failed: disk full")
    );
    assert!(state.logs.back().is_some_and(|line| line.starts_with("[WARN]")));

    state.export_finished(Ok("out/again.xlsx".to_string()));
    assert_eq!(state.export.last_error, None);
    assert_eq!(
        state.export_status().as_deref(),
        Some("Exported out/again.xlsx")
    );
}
