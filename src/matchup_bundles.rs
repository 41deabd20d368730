use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::Value;
use crate::normalize::Record;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSlotEntry {
    pub name: String,
    pub position: String,
    pub slot: String,
    pub projected_points: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupBundle {
    pub matchup_id: String,
    pub home_bot_id: String,
    pub home_bot_name: String,
    pub visitor_bot_id: String,
    pub visitor_bot_name: String,
    pub home_score: f64,
    pub visitor_score: f64,
    pub home_players: Vec<RosterSlotEntry>,
    pub visitor_players: Vec<RosterSlotEntry>,
}

impl MatchupBundle {
    fn from_first_record(matchup_id: String, record: &Record) -> Self {
        Self {
            matchup_id,
            home_bot_id: record.text("home_bot_id"),
            home_bot_name: record.text("home_bot_name"),
            visitor_bot_id: record.text("visitor_bot_id"),
            visitor_bot_name: record.text("visitor_bot_name"),
            home_score: number_or_zero(record, "home_score"),
            visitor_score: number_or_zero(record, "visitor_score"),
            home_players: Vec::new(),
            visitor_players: Vec::new(),
        }
    }

    /// Points scored by starters (everything outside the bench) on one side.
    pub fn starter_points(players: &[RosterSlotEntry]) -> f64 {
        players
            .iter()
            .filter(|entry| !entry.slot.eq_ignore_ascii_case("BENCH"))
            .map(|entry| entry.points)
            .sum()
    }
}

fn number_or_zero(record: &Record, column: &str) -> f64 {
    record.get(column).and_then(Value::as_f64).unwrap_or(0.0)
}

/// First entry of a JSON-encoded position list, or empty when it does not parse.
pub fn primary_position(raw: &str) -> String {
    let Ok(list) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
        return String::new();
    };
    match list.first() {
        Some(serde_json::Value::String(pos)) => pos.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn slot_entry(record: &Record) -> RosterSlotEntry {
    RosterSlotEntry {
        name: record.text("full_name"),
        position: primary_position(&record.text("allowed_positions")),
        slot: record.text("slot"),
        projected_points: number_or_zero(record, "projected_points"),
        points: number_or_zero(record, "points"),
    }
}

/// One bundle per matchup id, in first-seen order. A record whose `bot_id` is not the home
/// bot lands on the visitor side.
pub fn assemble(records: &[Record]) -> Vec<MatchupBundle> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut bundles: Vec<MatchupBundle> = Vec::new();

    for record in records {
        let matchup_id = record.text("matchup_id");
        let slot = *index.entry(matchup_id.clone()).or_insert_with(|| {
            bundles.push(MatchupBundle::from_first_record(matchup_id, record));
            bundles.len() - 1
        });
        let bundle = &mut bundles[slot];
        let entry = slot_entry(record);
        if record.text("bot_id") == bundle.home_bot_id {
            bundle.home_players.push(entry);
        } else {
            bundle.visitor_players.push(entry);
        }
    }
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_position_takes_first_entry() {
        assert_eq!(primary_position(r#"["WR","RB"]"#), "WR");
        assert_eq!(primary_position("[]"), "");
        assert_eq!(primary_position("not json"), "");
        assert_eq!(primary_position(""), "");
    }

    #[test]
    fn unknown_owner_goes_to_visitor_side() {
        let record = |bot: &str| {
            Record::from_pairs([
                ("matchup_id", Value::Integer(9)),
                ("home_bot_id", Value::Text("h".to_string())),
                ("visitor_bot_id", Value::Text("v".to_string())),
                ("home_score", Value::Null),
                ("bot_id", Value::Text(bot.to_string())),
                ("full_name", Value::Text(format!("P-{bot}"))),
                ("points", Value::Real(4.5)),
            ])
        };
        let bundles = assemble(&[record("h"), record("stranger")]);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].home_score, 0.0);
        assert_eq!(bundles[0].home_players.len(), 1);
        assert_eq!(bundles[0].visitor_players[0].name, "P-stranger");
        assert_eq!(bundles[0].visitor_players[0].projected_points, 0.0);
    }

    #[test]
    fn starter_points_skip_the_bench() {
        let entry = |slot: &str, points: f64| RosterSlotEntry {
            name: slot.to_string(),
            position: String::new(),
            slot: slot.to_string(),
            projected_points: 0.0,
            points,
        };
        let players = [entry("QB", 14.0), entry("FLEX", 6.5), entry("BENCH", 20.0)];
        assert_eq!(MatchupBundle::starter_points(&players), 20.5);
        assert_eq!(MatchupBundle::starter_points(&[]), 0.0);
    }
}
