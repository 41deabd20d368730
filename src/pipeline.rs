use crate::dataset::Dataset;
use crate::dispatch::{Failure, ViewData, dispatch};
use crate::matchup_bundles::{MatchupBundle, assemble};
use crate::normalize::Record;
use crate::roster_groups::{RosterGroups, derive_roster_groups};
use crate::sort_filter::SortState;
use crate::view::View;

/// Everything the pipeline needs to know about the user's current choices.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub view: View,
    pub period: u32,
    pub sort: SortState,
    pub filter: String,
}

impl Selection {
    pub fn new(view: View, period: u32) -> Self {
        Self {
            view,
            period,
            sort: SortState::default(),
            filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Table(Vec<Record>),
    Rosters(RosterGroups),
    Matchups(Vec<MatchupBundle>),
}

impl ViewBody {
    pub fn row_count(&self) -> usize {
        match self {
            ViewBody::Table(records) => records.len(),
            ViewBody::Rosters(groups) => groups.record_count(),
            ViewBody::Matchups(bundles) => bundles
                .iter()
                .map(|b| b.home_players.len() + b.visitor_players.len())
                .sum(),
        }
    }
}

/// Presentable result of one selection. A failure still carries an (empty) body.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOutcome {
    pub view: View,
    pub columns: Vec<String>,
    pub body: ViewBody,
    pub failure: Option<Failure>,
}

fn shape(view: View, data: &ViewData, selection: &Selection) -> ViewBody {
    match view {
        View::CurrentPeriod | View::PriorPeriod | View::Leaderboard => {
            ViewBody::Table(selection.sort.apply(&data.records))
        }
        View::Rosters => ViewBody::Rosters(derive_roster_groups(
            &data.records,
            &data.columns,
            &selection.sort,
            &selection.filter,
        )),
        View::MatchupDetails => ViewBody::Matchups(assemble(&data.records)),
    }
}

/// Applies the selection's derivation, sort and filter to an already dispatched result.
pub fn arrange(selection: &Selection, dispatched: &Result<ViewData, Failure>) -> ViewOutcome {
    let empty = ViewData::default();
    let (data, failure) = match dispatched {
        Ok(data) => (data, None),
        Err(failure) => (&empty, Some(failure.clone())),
    };
    ViewOutcome {
        view: selection.view,
        columns: data.columns.clone(),
        body: shape(selection.view, data, selection),
        failure,
    }
}

pub fn present(selection: &Selection, ds: &dyn Dataset) -> ViewOutcome {
    let dispatched = dispatch(selection.view, selection.period, ds);
    arrange(selection, &dispatched)
}
