use std::collections::HashMap;

use crate::normalize::Record;
use crate::sort_filter::{SortState, collate, filter_records};

pub const UNDRAFTED: &str = "Undrafted";
pub const TEAM_COLUMN: &str = "teamName";

#[derive(Debug, Clone, PartialEq)]
pub struct TeamGroup {
    pub team: String,
    pub records: Vec<Record>,
}

/// Roster records partitioned by owning team. The `Undrafted` group always exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterGroups {
    groups: Vec<TeamGroup>,
}

impl RosterGroups {
    pub fn get(&self, team: &str) -> Option<&[Record]> {
        self.groups
            .iter()
            .find(|group| group.team == team)
            .map(|group| group.records.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.team.as_str())
    }

    /// Groups in display order: teams alphabetically, `Undrafted` last.
    pub fn iter(&self) -> impl Iterator<Item = &TeamGroup> {
        self.groups.iter()
    }

    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|group| group.records.len()).sum()
    }
}

fn team_key(record: &Record) -> String {
    let team = record.text(TEAM_COLUMN);
    if team.is_empty() {
        UNDRAFTED.to_string()
    } else {
        team
    }
}

/// Groups records by team, keeping input order inside each group.
pub fn group_by_team(records: &[Record]) -> RosterGroups {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<TeamGroup> = Vec::new();

    for record in records {
        let key = team_key(record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(TeamGroup {
                team: key,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record.clone());
    }

    if !index.contains_key(UNDRAFTED) {
        groups.push(TeamGroup {
            team: UNDRAFTED.to_string(),
            records: Vec::new(),
        });
    }

    groups.sort_by(|a, b| match (a.team == UNDRAFTED, b.team == UNDRAFTED) {
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        _ => collate(&a.team, &b.team),
    });
    RosterGroups { groups }
}

/// Groups, then sorts each group and filters the sorted rows against `columns`.
pub fn derive_roster_groups(
    records: &[Record],
    columns: &[String],
    sort: &SortState,
    filter_text: &str,
) -> RosterGroups {
    let mut grouped = group_by_team(records);
    for group in &mut grouped.groups {
        let sorted = sort.apply(&group.records);
        group.records = filter_records(&sorted, columns, filter_text);
    }
    grouped
}
