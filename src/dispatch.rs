use crate::dataset::{Dataset, DatasetError, TabularResult};
use crate::normalize::{Record, normalize};
use crate::query_catalog::{self, LINEUPS_HINT};
use crate::view::View;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    #[error("{} unavailable: missing table {table}. {hint}", .view.label())]
    MissingCapability {
        view: View,
        table: String,
        hint: String,
    },
    #[error("query failed: {message}")]
    QueryExecution {
        message: String,
        missing_table: Option<String>,
    },
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl Failure {
    fn from_dataset(err: DatasetError) -> Self {
        let message = err.to_string();
        let missing_table = missing_table_name(&message);
        Failure::QueryExecution {
            message,
            missing_table,
        }
    }
}

/// Normalized output of one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewData {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Runs the query for `view` at `period`. Zero rows is a successful, empty result.
pub fn resolve(view: View, period: u32, ds: &dyn Dataset) -> Result<TabularResult, Failure> {
    if period < 1 {
        tracing::warn!(view = view.key(), period, "rejected period below 1");
        return Err(Failure::MalformedInput(format!(
            "period must be at least 1, got {period}"
        )));
    }

    if let Some(table) = query_catalog::required_table(view)
        && !ds.table_exists(table)
    {
        tracing::warn!(view = view.key(), table, "capability precheck failed");
        return Err(Failure::MissingCapability {
            view,
            table: table.to_string(),
            hint: LINEUPS_HINT.to_string(),
        });
    }

    let sql = query_catalog::query_text(view, period);
    tracing::debug!(view = view.key(), period, "dispatching view query");
    match ds.execute(&sql) {
        Ok(result) => Ok(result),
        Err(err) => {
            let failure = Failure::from_dataset(err);
            tracing::warn!(view = view.key(), period, %failure, "view query failed");
            Err(failure)
        }
    }
}

pub fn dispatch(view: View, period: u32, ds: &dyn Dataset) -> Result<ViewData, Failure> {
    let result = resolve(view, period, ds)?;
    let records = normalize(&result);
    Ok(ViewData {
        columns: result.columns,
        records,
    })
}

/// Entry point for callers holding a raw view identifier.
pub fn dispatch_key(key: &str, period: u32, ds: &dyn Dataset) -> Result<ViewData, Failure> {
    let Some(view) = View::from_key(key) else {
        return Err(Failure::MalformedInput(format!("unknown view '{key}'")));
    };
    dispatch(view, period, ds)
}

fn missing_table_name(message: &str) -> Option<String> {
    const MARKER: &str = "no such table:";
    let idx = message.find(MARKER)?;
    let name = message[idx + MARKER.len()..]
        .split_whitespace()
        .next()?
        .trim_matches(|ch: char| ch == '"' || ch == '\'' || ch == '`');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::missing_table_name;

    #[test]
    fn missing_table_name_is_extracted() {
        assert_eq!(
            missing_table_name("no such table: weekly_stats"),
            Some("weekly_stats".to_string())
        );
        assert_eq!(
            missing_table_name("prepare failed: no such table: main.bots in query"),
            Some("main.bots".to_string())
        );
        assert_eq!(missing_table_name("near \"SELEC\": syntax error"), None);
    }
}
