use botblitz_viewer::dataset::{TabularResult, Value};
use botblitz_viewer::normalize::{Record, normalize};
use botblitz_viewer::roster_groups::{TEAM_COLUMN, UNDRAFTED, derive_roster_groups, group_by_team};
use botblitz_viewer::sort_filter::{SortDirection, SortState, filter_records, sort_records};

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn roster_result() -> TabularResult {
    TabularResult {
        columns: vec![
            "full_name".to_string(),
            "allowed_positions".to_string(),
            TEAM_COLUMN.to_string(),
            "totalPoints".to_string(),
        ],
        rows: vec![
            vec![text("QB Smith"), text(r#"["QB"]"#), text("Alpha"), Value::Real(38.5)],
            vec![text("Ray Runner"), text(r#"["RB"]"#), text("Alpha"), Value::Real(27.0)],
            vec![text("Walt Wide"), text(r#"["WR"]"#), text("Alpha"), Value::Null],
        ],
    }
}

fn names(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.text("full_name")).collect()
}

#[test]
fn normalize_keeps_one_record_per_row_with_all_keys() {
    let result = roster_result();
    let records = normalize(&result);
    assert_eq!(records.len(), result.rows.len());
    for record in &records {
        assert_eq!(record.columns(), result.columns.as_slice());
    }
    assert_eq!(records[2].get("totalPoints"), Some(&Value::Null));
}

#[test]
fn sort_is_idempotent_and_a_permutation() {
    let records = normalize(&roster_result());
    let once = sort_records(&records, "totalPoints", SortDirection::Descending);
    let twice = sort_records(&once, "totalPoints", SortDirection::Descending);
    assert_eq!(once, twice);
    assert_eq!(names(&once), ["QB Smith", "Ray Runner", "Walt Wide"]);

    let mut before = names(&records);
    let mut after = names(&once);
    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn descending_keeps_equal_keys_in_input_order() {
    let records: Vec<Record> = [("B", 1), ("A", 1), ("C", 2)]
        .into_iter()
        .map(|(name, key)| {
            Record::from_pairs([("name", text(name)), ("key", Value::Integer(key))])
        })
        .collect();
    let sorted = sort_records(&records, "key", SortDirection::Descending);
    let order: Vec<String> = sorted.iter().map(|r| r.text("name")).collect();
    assert_eq!(order, ["C", "B", "A"]);
}

#[test]
fn ascending_keeps_equal_keys_in_input_order() {
    let records: Vec<Record> = [("B", 1), ("A", 1), ("C", 2)]
        .into_iter()
        .map(|(name, key)| {
            Record::from_pairs([("name", text(name)), ("key", Value::Integer(key))])
        })
        .collect();
    let sorted = sort_records(&records, "key", SortDirection::Ascending);
    let order: Vec<String> = sorted.iter().map(|r| r.text("name")).collect();
    assert_eq!(order, ["B", "A", "C"]);
}

#[test]
fn toggling_three_times_restores_the_ascending_order() {
    let records = normalize(&roster_result());
    let mut state = SortState::default();
    state.toggle("totalPoints");
    let first = state.apply(&records);
    state.toggle("totalPoints");
    let second = state.apply(&first);
    state.toggle("totalPoints");
    let third = state.apply(&second);
    assert_eq!(state.direction, SortDirection::Ascending);
    assert_eq!(names(&first), ["Walt Wide", "Ray Runner", "QB Smith"]);
    assert_eq!(names(&second), ["QB Smith", "Ray Runner", "Walt Wide"]);
    assert_eq!(third, first);
}

#[test]
fn points_column_with_a_placeholder_still_orders_numbers_by_value() {
    let records: Vec<Record> = [("ten", text("10")), ("nine", Value::Integer(9)), ("na", text("n/a"))]
        .into_iter()
        .map(|(name, points)| Record::from_pairs([("full_name", text(name)), ("points", points)]))
        .collect();
    let sorted = sort_records(&records, "points", SortDirection::Ascending);
    assert_eq!(names(&sorted), ["nine", "ten", "na"]);
}

#[test]
fn text_sort_ignores_case() {
    let records: Vec<Record> = ["bravo", "Alpha", "Charlie"]
        .into_iter()
        .map(|name| Record::from_pairs([("full_name", text(name))]))
        .collect();
    let sorted = sort_records(&records, "full_name", SortDirection::Ascending);
    assert_eq!(names(&sorted), ["Alpha", "bravo", "Charlie"]);
}

#[test]
fn toggling_the_same_column_reverses_distinct_keys() {
    let records = normalize(&roster_result());
    let mut state = SortState::default();
    state.toggle("full_name");
    let ascending = state.apply(&records);
    state.toggle("full_name");
    let descending = state.apply(&records);
    let mut reversed = names(&ascending);
    reversed.reverse();
    assert_eq!(names(&descending), reversed);
}

#[test]
fn filter_is_case_insensitive_substring_over_given_columns() {
    let result = roster_result();
    let records = normalize(&result);
    let hits = filter_records(&records, &result.columns, "qb");
    assert_eq!(names(&hits), ["QB Smith"]);

    let only_names = vec!["full_name".to_string()];
    assert!(filter_records(&records, &only_names, "rb").is_empty());
    assert_eq!(filter_records(&records, &result.columns, "").len(), 3);
}

#[test]
fn filter_treats_null_as_blank() {
    let result = roster_result();
    let records = normalize(&result);
    assert!(filter_records(&records, &result.columns, "null").is_empty());
}

#[test]
fn undrafted_group_exists_when_every_player_is_drafted() {
    let records = normalize(&roster_result());
    let groups = group_by_team(&records);
    assert_eq!(groups.teams().collect::<Vec<_>>(), ["Alpha", UNDRAFTED]);
    assert_eq!(names(groups.get("Alpha").unwrap()), ["QB Smith", "Ray Runner", "Walt Wide"]);
    assert_eq!(groups.get(UNDRAFTED), Some(&[][..]));
}

#[test]
fn derived_groups_sort_then_filter() {
    let result = roster_result();
    let records = normalize(&result);
    let sort = SortState::by("totalPoints", SortDirection::Ascending);
    let groups = derive_roster_groups(&records, &result.columns, &sort, "r");
    assert_eq!(
        names(groups.get("Alpha").unwrap()),
        ["Walt Wide", "Ray Runner"]
    );
    assert_eq!(groups.len(), 2);
}
