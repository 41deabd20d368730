use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::Value;
use crate::matchup_bundles::{MatchupBundle, RosterSlotEntry};
use crate::normalize::Record;
use crate::pipeline::{Selection, ViewBody, ViewOutcome};

const MAX_SHEET_NAME: usize = 31;

pub struct ExportReport {
    pub path: PathBuf,
    pub sheets: usize,
    pub rows: usize,
}

pub fn default_export_path(dir: &Path, selection: &Selection) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!(
        "botblitz_{}_week{}_{stamp}.xlsx",
        selection.view.key(),
        selection.period
    ))
}

pub fn export_outcome(path: &Path, outcome: &ViewOutcome) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();
    let mut sheets = 0usize;
    let mut rows = 0usize;

    match &outcome.body {
        ViewBody::Table(records) => {
            let sheet = workbook.add_worksheet();
            sheet.set_name(unique_sheet_name(outcome.view.label(), &mut used_names))?;
            rows += write_records(sheet, &outcome.columns, records)?;
            sheets += 1;
        }
        ViewBody::Rosters(groups) => {
            for group in groups.iter() {
                let sheet = workbook.add_worksheet();
                sheet.set_name(unique_sheet_name(&group.team, &mut used_names))?;
                rows += write_records(sheet, &outcome.columns, &group.records)?;
                sheets += 1;
            }
        }
        ViewBody::Matchups(bundles) => {
            let sheet = workbook.add_worksheet();
            sheet.set_name(unique_sheet_name("Matchups", &mut used_names))?;
            rows += write_matchups(sheet, bundles)?;
            sheets += 1;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(ExportReport {
        path: path.to_path_buf(),
        sheets,
        rows,
    })
}

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`, unique ignoring case.
pub fn unique_sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = raw
        .chars()
        .map(|ch| match ch {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2usize;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }
    candidate
}

fn write_records(sheet: &mut Worksheet, columns: &[String], records: &[Record]) -> Result<usize> {
    for (col_idx, column) in columns.iter().enumerate() {
        sheet
            .write_string(0, col_idx as u16, column)
            .with_context(|| format!("write header {column}"))?;
    }
    for (row_idx, record) in records.iter().enumerate() {
        let row = row_idx as u32 + 1;
        for (col_idx, column) in columns.iter().enumerate() {
            let col = col_idx as u16;
            match record.get(column) {
                Some(Value::Integer(n)) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                Some(Value::Real(n)) => {
                    sheet.write_number(row, col, *n)?;
                }
                Some(Value::Text(s)) => {
                    sheet.write_string(row, col, s)?;
                }
                Some(Value::Null) | None => {}
            }
        }
    }
    Ok(records.len())
}

fn write_matchups(sheet: &mut Worksheet, bundles: &[MatchupBundle]) -> Result<usize> {
    const HEADER: [&str; 9] = [
        "Matchup",
        "Side",
        "Team",
        "Team Score",
        "Slot",
        "Player",
        "Pos",
        "Projected",
        "Points",
    ];
    for (col_idx, title) in HEADER.iter().enumerate() {
        sheet.write_string(0, col_idx as u16, *title)?;
    }

    let mut row = 1u32;
    for bundle in bundles {
        let sides: [(&str, &str, f64, &[RosterSlotEntry]); 2] = [
            (
                "home",
                bundle.home_bot_name.as_str(),
                bundle.home_score,
                bundle.home_players.as_slice(),
            ),
            (
                "visitor",
                bundle.visitor_bot_name.as_str(),
                bundle.visitor_score,
                bundle.visitor_players.as_slice(),
            ),
        ];
        for (side, team, score, players) in sides {
            for entry in players {
                sheet.write_string(row, 0, &bundle.matchup_id)?;
                sheet.write_string(row, 1, side)?;
                sheet.write_string(row, 2, team)?;
                sheet.write_number(row, 3, score)?;
                sheet.write_string(row, 4, &entry.slot)?;
                sheet.write_string(row, 5, &entry.name)?;
                sheet.write_string(row, 6, &entry.position)?;
                sheet.write_number(row, 7, entry.projected_points)?;
                sheet.write_number(row, 8, entry.points)?;
                row += 1;
            }
        }
    }
    Ok((row - 1) as usize)
}
