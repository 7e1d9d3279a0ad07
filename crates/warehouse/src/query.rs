use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// Column definition of a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    /// Postgres type name (e.g. "TEXT", "INT8").
    pub data_type: String,
}

/// Tabular query result.
///
/// Every cell is rendered to text; `None` is SQL NULL. Column ordering in
/// each row matches `columns`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<QueryColumn>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// Build a result from fetched rows.
    ///
    /// Column definitions come from the first row, so an empty fetch yields
    /// a result with no columns.
    pub fn from_rows(rows: &[PgRow]) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| QueryColumn {
                        name: c.name().to_string(),
                        data_type: c.type_info().name().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| cell_text(row, i)).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Value at `row` in column `col`; `None` when out of range or NULL.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let col_idx = self.column_index(col)?;
        self.rows.get(row)?.get(col_idx)?.as_deref()
    }
}

/// Render one cell as text, trying the types the dashboard queries return.
fn cell_text(row: &PgRow, idx: usize) -> Option<String> {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v;
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(|b| b.to_string());
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return v.map(|d| d.format("%Y-%m-%d").to_string());
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v.map(|t| t.to_string());
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return v.map(|t| t.to_rfc3339());
    }
    None
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        // `{:<w$}` pads by char, so widths are counted in chars too.
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.as_deref().unwrap_or("NULL").chars().count());
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", col.name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{:<width$}", cell.as_deref().unwrap_or("NULL"), width = widths[i])?;
            }
            writeln!(f)?;
        }

        write!(f, "({} rows)", self.rows.len())
    }
}

#[cfg(test)]
pub(crate) fn result(columns: &[&str], rows: &[&[Option<&str>]]) -> QueryResult {
    QueryResult {
        columns: columns
            .iter()
            .map(|name| QueryColumn {
                name: name.to_string(),
                data_type: "TEXT".into(),
            })
            .collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
            .collect(),
    }
}
