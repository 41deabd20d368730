use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::json;

use botblitz_viewer::config::{SnapshotSource, ViewerConfig};
use botblitz_viewer::dataset::current_period;
use botblitz_viewer::dispatch::Failure;
use botblitz_viewer::loader::load_snapshot;
use botblitz_viewer::matchup_bundles::MatchupBundle;
use botblitz_viewer::normalize::Record;
use botblitz_viewer::pipeline::{Selection, ViewBody, ViewOutcome, present};
use botblitz_viewer::sort_filter::{SortDirection, SortState};
use botblitz_viewer::view::{View, list_views};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }

    let view_key = arg_value(&args, "--view").unwrap_or_else(|| "current".to_string());
    let Some(view) = View::from_key(&view_key) else {
        return Err(anyhow!(Failure::MalformedInput(format!(
            "unknown view '{view_key}'"
        ))));
    };

    let source = match arg_value(&args, "--db") {
        Some(path) => SnapshotSource::Local(PathBuf::from(path)),
        None => ViewerConfig::from_env().source,
    };
    let dataset = load_snapshot(&source, |msg| eprintln!("{msg}"))?;

    let period = match arg_value(&args, "--week") {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("--week expects a positive integer, got '{raw}'"))?,
        None => match current_period(&dataset) {
            Some(week) => week,
            None if !view.is_period_scoped() => 1,
            None => return Err(anyhow!("snapshot has no current week; pass --week")),
        },
    };

    let mut selection = Selection::new(view, period);
    if let Some(raw) = arg_value(&args, "--sort") {
        selection.sort = parse_sort(&raw);
    }
    if let Some(filter) = arg_value(&args, "--filter") {
        selection.filter = filter;
    }

    let outcome = present(&selection, &dataset);
    if args.iter().any(|arg| arg == "--json") {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&selection, &outcome))?);
    } else {
        print_outcome(&selection, &outcome);
    }

    if outcome.failure.is_some() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_usage() {
    println!("usage: view_query [--db PATH] [--view KEY] [--week N] [--sort COL[:desc]] [--filter TEXT] [--json]");
    println!("views:");
    for (view, label) in list_views() {
        println!("  {:<12} {label}", view.key());
    }
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            return Some(raw.to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next.clone());
        }
    }
    None
}

fn parse_sort(raw: &str) -> SortState {
    match raw.rsplit_once(':') {
        Some((column, dir)) if dir.eq_ignore_ascii_case("desc") => {
            SortState::by(column, SortDirection::Descending)
        }
        Some((column, dir)) if dir.eq_ignore_ascii_case("asc") => {
            SortState::by(column, SortDirection::Ascending)
        }
        _ => SortState::by(raw, SortDirection::Ascending),
    }
}

fn outcome_json(selection: &Selection, outcome: &ViewOutcome) -> serde_json::Value {
    let body = match &outcome.body {
        ViewBody::Table(records) => json!({ "records": records }),
        ViewBody::Rosters(groups) => json!({
            "groups": groups
                .iter()
                .map(|group| json!({ "team": group.team, "records": group.records }))
                .collect::<Vec<_>>()
        }),
        ViewBody::Matchups(bundles) => json!({ "matchups": bundles }),
    };
    json!({
        "view": selection.view.key(),
        "week": selection.period,
        "sort": selection.sort,
        "filter": selection.filter,
        "columns": outcome.columns,
        "failure": outcome.failure.as_ref().map(|failure| failure.to_string()),
        "body": body,
    })
}

fn print_outcome(selection: &Selection, outcome: &ViewOutcome) {
    println!("{} | week {}", selection.view.label(), selection.period);
    if let Some(failure) = &outcome.failure {
        println!("! {failure}");
    }
    match &outcome.body {
        ViewBody::Table(records) => {
            if records.is_empty() {
                println!("(no data)");
            } else {
                print_table(&outcome.columns, records);
            }
        }
        ViewBody::Rosters(groups) => {
            for group in groups.iter() {
                println!();
                println!("== {} ({})", group.team, group.records.len());
                print_table(&outcome.columns, &group.records);
            }
        }
        ViewBody::Matchups(bundles) => {
            for bundle in bundles {
                println!();
                println!(
                    "== {} {:.2} vs {} {:.2} (starters {:.1} / {:.1})",
                    bundle.home_bot_name,
                    bundle.home_score,
                    bundle.visitor_bot_name,
                    bundle.visitor_score,
                    MatchupBundle::starter_points(&bundle.home_players),
                    MatchupBundle::starter_points(&bundle.visitor_players)
                );
                for (side, players) in [
                    ("home", &bundle.home_players),
                    ("visitor", &bundle.visitor_players),
                ] {
                    for entry in players {
                        println!(
                            "  {side:<8}{:<10}{:<26}{:<5}{:>7.1}{:>7.1}",
                            entry.slot,
                            entry.name,
                            entry.position,
                            entry.projected_points,
                            entry.points
                        );
                    }
                }
            }
        }
    }
}

fn print_table(columns: &[String], records: &[Record]) {
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            records
                .iter()
                .map(|record| record.text(column).chars().count())
                .max()
                .unwrap_or(0)
                .max(column.chars().count())
        })
        .collect();

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{column:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{header}");
    for record in records {
        let line = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:<width$}", record.text(column)))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }
}
