use std::fmt;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;

use crate::query_catalog::CURRENT_WEEK_QUERY;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("open snapshot {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
}

/// A single cell as produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading of the cell. Text counts when it parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(n) => Some(*n as f64),
            Value::Real(n) => Some(*n),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Real(n) if n.fract() == 0.0 => Some(*n as i64),
            Value::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(raw: ValueRef<'_>) -> Self {
        match raw {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(n) => Value::Real(n),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Column names plus positionally aligned row tuples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TabularResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only relational resource the view pipeline runs against.
pub trait Dataset {
    fn execute(&self, sql: &str) -> Result<TabularResult, DatasetError>;

    fn table_exists(&self, name: &str) -> bool;
}

pub struct SqliteDataset {
    conn: Connection,
}

impl fmt::Debug for SqliteDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDataset")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteDataset {
    pub fn open_read_only(path: &Path) -> Result<Self, DatasetError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Dataset for SqliteDataset {
    fn execute(&self, sql: &str) -> Result<TabularResult, DatasetError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        if columns.is_empty() {
            stmt.execute([])?;
            return Ok(TabularResult::empty());
        }

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(Value::from(row.get_ref(idx)?));
            }
            rows.push(values);
        }
        Ok(TabularResult { columns, rows })
    }

    fn table_exists(&self, name: &str) -> bool {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional();
        match found {
            Ok(hit) => hit.is_some(),
            Err(err) => {
                tracing::warn!(table = name, error = %err, "table lookup failed");
                false
            }
        }
    }
}

/// Current fantasy week recorded in the snapshot, if one is known.
pub fn current_period(ds: &dyn Dataset) -> Option<u32> {
    let result = match ds.execute(CURRENT_WEEK_QUERY) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, "current week lookup failed");
            return None;
        }
    };
    let week = result.rows.first()?.first()?.as_i64()?;
    u32::try_from(week).ok().filter(|week| *week >= 1)
}
