use crate::view::View;

/// Supplementary table required by the matchup breakdown. It is filled by the lineup
/// backfill job and is absent from older snapshots.
pub const LINEUPS_TABLE: &str = "weekly_lineups";

pub const LINEUPS_HINT: &str = "weekly_lineups is missing from this snapshot; run the lineup \
backfill job (backfill_lineups) against the season database and reload";

pub const CURRENT_WEEK_QUERY: &str = "SELECT current_fantasy_week FROM game_statuses LIMIT 1";

const MATCHUPS_TEMPLATE: &str = r#"
SELECT
  week,
  home_bot.name AS home_bot_name,
  home_score,
  visitor_bot.name AS visitor_bot_name,
  visitor_score,
  winning_bot.name AS winning_bot_name
FROM matchups AS m
LEFT JOIN bots AS home_bot ON m.home_bot_id = home_bot.id
LEFT JOIN bots AS visitor_bot ON m.visitor_bot_id = visitor_bot.id
LEFT JOIN bots AS winning_bot ON m.winning_bot_id = winning_bot.id
WHERE week = {week}
"#;

const LEADERBOARD_TEMPLATE: &str = r#"
WITH botScores AS (
  SELECT
    b.name AS name,
    SUM(IIF(b.id = m.home_bot_id, home_score, 0) + IIF(b.id = m.visitor_bot_id, visitor_score, 0)) AS totalPoints,
    SUM(IIF(b.id = m.winning_bot_id, 1, 0)) AS numWins,
    SUM(IIF(b.id != m.winning_bot_id, 1, 0)) AS numLosses
  FROM bots AS b
  INNER JOIN matchups AS m
    ON (b.id = m.visitor_bot_id OR b.id = m.home_bot_id)
  WHERE week < {week}
  GROUP BY 1
)
SELECT
  ROW_NUMBER() OVER (ORDER BY numWins DESC, totalPoints DESC) AS rank,
  *
FROM botScores
ORDER BY numWins DESC, totalPoints DESC
"#;

const ROSTERS_TEMPLATE: &str = r#"
WITH playerPoints AS (
  SELECT p.id, p.full_name, p.allowed_positions, p.current_bot_id, SUM(wk.FPTS) AS totalPoints
  FROM players AS p
  INNER JOIN weekly_stats AS wk ON p.id = wk.fantasypros_id
  GROUP BY 1, 2, 3, 4
)
SELECT p.id, p.full_name, p.allowed_positions, b.name AS teamName, totalPoints
FROM playerPoints AS p
LEFT JOIN bots AS b ON p.current_bot_id = b.id
ORDER BY b.name, p.full_name
"#;

const MATCHUP_DETAILS_TEMPLATE: &str = r#"
SELECT
  m.id AS matchup_id,
  m.home_bot_id,
  home_bot.name AS home_bot_name,
  m.home_score,
  m.visitor_bot_id,
  visitor_bot.name AS visitor_bot_name,
  m.visitor_score,
  wl.bot_id,
  CASE WHEN wl.bot_id = m.home_bot_id THEN 'home' ELSE 'visitor' END AS side,
  p.full_name,
  p.allowed_positions,
  wl.slot,
  wl.projected_points,
  wl.points
FROM matchups AS m
INNER JOIN weekly_lineups AS wl
  ON wl.week = m.week AND (wl.bot_id = m.home_bot_id OR wl.bot_id = m.visitor_bot_id)
LEFT JOIN players AS p ON p.id = wl.player_id
LEFT JOIN bots AS home_bot ON m.home_bot_id = home_bot.id
LEFT JOIN bots AS visitor_bot ON m.visitor_bot_id = visitor_bot.id
WHERE m.week = {week}
ORDER BY
  m.id,
  CASE WHEN wl.bot_id = m.home_bot_id THEN 0 ELSE 1 END,
  CASE wl.slot
    WHEN 'QB' THEN 0
    WHEN 'RB' THEN 1
    WHEN 'WR' THEN 2
    WHEN 'SUPERFLEX' THEN 3
    WHEN 'FLEX' THEN 4
    WHEN 'K' THEN 5
    WHEN 'DST' THEN 6
    WHEN 'BENCH' THEN 7
    ELSE 8
  END,
  p.full_name
"#;

/// Week offset applied to the selected period before substitution.
pub fn period_offset(view: View) -> i64 {
    match view {
        View::PriorPeriod => -1,
        _ => 0,
    }
}

fn template(view: View) -> &'static str {
    match view {
        View::CurrentPeriod | View::PriorPeriod => MATCHUPS_TEMPLATE,
        View::MatchupDetails => MATCHUP_DETAILS_TEMPLATE,
        View::Leaderboard => LEADERBOARD_TEMPLATE,
        View::Rosters => ROSTERS_TEMPLATE,
    }
}

/// Table that must exist before the view's query can run, if any.
pub fn required_table(view: View) -> Option<&'static str> {
    match view {
        View::MatchupDetails => Some(LINEUPS_TABLE),
        _ => None,
    }
}

/// Query text for `view` at the selected `period`. Only integers are ever interpolated.
pub fn query_text(view: View, period: u32) -> String {
    let week = i64::from(period) + period_offset(view);
    template(view).replace("{week}", &week.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prior_week_is_offset_by_one() {
        let sql = query_text(View::PriorPeriod, 4);
        assert!(sql.contains("WHERE week = 3"));
        let sql = query_text(View::PriorPeriod, 1);
        assert!(sql.contains("WHERE week = 0"));
    }

    #[test]
    fn every_placeholder_is_substituted() {
        for view in View::ALL {
            assert!(!query_text(view, 7).contains("{week}"), "{view:?}");
        }
    }

    #[test]
    fn only_matchup_details_needs_lineups() {
        assert_eq!(required_table(View::MatchupDetails), Some(LINEUPS_TABLE));
        assert_eq!(required_table(View::Rosters), None);
    }
}
