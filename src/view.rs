use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    CurrentPeriod,
    PriorPeriod,
    MatchupDetails,
    Leaderboard,
    Rosters,
}

impl View {
    pub const ALL: [View; 5] = [
        View::CurrentPeriod,
        View::PriorPeriod,
        View::MatchupDetails,
        View::Leaderboard,
        View::Rosters,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::CurrentPeriod => "Current Week",
            View::PriorPeriod => "Last Week",
            View::MatchupDetails => "Matchup Details",
            View::Leaderboard => "Leaderboard",
            View::Rosters => "Rosters",
        }
    }

    /// Stable identifier used on the command line and in export file names.
    pub fn key(self) -> &'static str {
        match self {
            View::CurrentPeriod => "current",
            View::PriorPeriod => "prior",
            View::MatchupDetails => "matchups",
            View::Leaderboard => "leaderboard",
            View::Rosters => "rosters",
        }
    }

    pub fn from_key(raw: &str) -> Option<View> {
        let key = raw.trim().to_ascii_lowercase();
        View::ALL.into_iter().find(|view| view.key() == key)
    }

    /// Whether the view's query depends on the selected week.
    pub fn is_period_scoped(self) -> bool {
        !matches!(self, View::Rosters)
    }

    pub fn next(self) -> View {
        let idx = View::ALL.iter().position(|v| *v == self).unwrap_or(0);
        View::ALL[(idx + 1) % View::ALL.len()]
    }
}

pub fn list_views() -> Vec<(View, &'static str)> {
    View::ALL.iter().map(|view| (*view, view.label())).collect()
}
