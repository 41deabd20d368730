use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use botblitz_viewer::dataset::{TabularResult, Value};
use botblitz_viewer::normalize::{Record, normalize};
use botblitz_viewer::roster_groups::derive_roster_groups;
use botblitz_viewer::sort_filter::{SortDirection, SortState, sort_records};

const TEAMS: [&str; 12] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India",
    "Juliet", "Kilo", "",
];

fn roster_result(rows: usize) -> TabularResult {
    let positions = [r#"["QB"]"#, r#"["RB","WR"]"#, r#"["WR"]"#, r#"["TE"]"#, r#"["K"]"#];
    TabularResult {
        columns: vec![
            "id".to_string(),
            "full_name".to_string(),
            "allowed_positions".to_string(),
            "teamName".to_string(),
            "totalPoints".to_string(),
        ],
        rows: (0..rows)
            .map(|idx| {
                let team = TEAMS[idx % TEAMS.len()];
                vec![
                    Value::Text(format!("p{idx}")),
                    Value::Text(format!("Player {idx}")),
                    Value::Text(positions[idx % positions.len()].to_string()),
                    if team.is_empty() {
                        Value::Null
                    } else {
                        Value::Text(team.to_string())
                    },
                    Value::Real(((idx * 37) % 211) as f64 / 2.0),
                ]
            })
            .collect(),
    }
}

fn bench_normalize(c: &mut Criterion) {
    let result = roster_result(2_000);
    c.bench_function("normalize_2000", |b| {
        b.iter(|| {
            let records = normalize(black_box(&result));
            black_box(records.len());
        })
    });
}

fn bench_sort(c: &mut Criterion) {
    let records: Vec<Record> = normalize(&roster_result(2_000));
    c.bench_function("sort_numeric_desc", |b| {
        b.iter(|| {
            let sorted = sort_records(
                black_box(&records),
                "totalPoints",
                SortDirection::Descending,
            );
            black_box(sorted.len());
        })
    });
    c.bench_function("sort_text_asc", |b| {
        b.iter(|| {
            let sorted = sort_records(black_box(&records), "full_name", SortDirection::Ascending);
            black_box(sorted.len());
        })
    });
}

fn bench_roster_groups(c: &mut Criterion) {
    let result = roster_result(2_000);
    let records = normalize(&result);
    let sort = SortState::by("totalPoints", SortDirection::Descending);
    c.bench_function("roster_groups_sorted_filtered", |b| {
        b.iter(|| {
            let groups = derive_roster_groups(black_box(&records), &result.columns, &sort, "wr");
            black_box(groups.record_count());
        })
    });
}

criterion_group!(perf, bench_normalize, bench_sort, bench_roster_groups);
criterion_main!(perf);
