//! In-memory table of named, typed columns with positional rows
//!
//! The table owns all data and type state. Columns have equal lengths at all
//! times; row *i* across every column belongs to the same record. Operations
//! that reorder or drop rows (`sorted`, `filtered`) consume the table and
//! return a new, reindexed instance; the remaining operations mutate in
//! place.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::aggregate::Stat;
use crate::column::{Cells, Column, ColumnKind};
use crate::error::{Error, Result};
use crate::filter::Condition;

/// Tokens treated as missing markers when loading raw data
const MISSING_TOKENS: [&str; 5] = ["", "na", "n/a", "nan", "null"];

/// An in-memory, mutable, ordered collection of named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Columns in load order
    columns: Vec<Column>,
}

impl Default for Table {
    /// An empty table with no columns
    fn default() -> Self {
        Self {
            columns: Vec::new(),
        }
    }
}

impl Table {
    /// Create a table from pre-built columns
    ///
    /// Columns must have unique names and equal lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut names = HashSet::new();
        for column in &columns {
            if !names.insert(column.name().to_string()) {
                return Err(Error::MalformedTable(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            for column in &columns {
                if column.len() != expected {
                    return Err(Error::MalformedTable(format!(
                        "column '{}' has {} rows, expected {}",
                        column.name(),
                        column.len(),
                        expected
                    )));
                }
            }
        }
        Ok(Self { columns })
    }

    /// Build a normalized table from raw string records
    ///
    /// `records` are row-major field values; missing markers (empty string,
    /// `na`, `n/a`, `nan`, `null`, case-insensitive) become absent cells.
    /// Columns whose every cell is absent are dropped. A surviving column is
    /// numeric when all of its present tokens parse as finite numbers,
    /// otherwise text.
    pub fn from_records(headers: &[String], records: &[Vec<String>]) -> Result<Self> {
        for (row, record) in records.iter().enumerate() {
            if record.len() != headers.len() {
                return Err(Error::MalformedTable(format!(
                    "record at row {} has {} fields, expected {}",
                    row,
                    record.len(),
                    headers.len()
                )));
            }
        }

        let mut columns = Vec::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            let raw: Vec<Option<String>> = records
                .iter()
                .map(|record| {
                    let field = record[index].trim();
                    if MISSING_TOKENS.contains(&field.to_lowercase().as_str()) {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();

            if raw.iter().all(Option::is_none) {
                debug!(column = %name, "dropping all-absent column");
                continue;
            }

            columns.push(infer_column(name, raw));
        }

        Self::new(columns)
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns) shape
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// Columns in table order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Re-run load-time normalization
    ///
    /// Kinds are fixed at inference time, so on an already-normalized table
    /// this only drops columns whose every cell is absent; running it twice
    /// produces the same table.
    pub fn normalize(&mut self) {
        self.columns.retain(|column| {
            let keep = column.null_count() < column.len() || column.is_empty();
            if !keep {
                debug!(column = %column.name(), "dropping all-absent column");
            }
            keep
        });
    }

    /// Replace absent cells with the column mean (numeric) or the most
    /// frequent value (text)
    ///
    /// Columns without absent cells are untouched. Afterwards no cell in the
    /// table is absent. The table shape is unchanged.
    pub fn replace_missing(&mut self) {
        for column in &mut self.columns {
            if !column.has_nulls() {
                continue;
            }
            match column.kind() {
                ColumnKind::Numeric => {
                    if let Some(mean) = column.mean() {
                        debug!(column = %column.name(), mean, "imputing numeric column");
                        column.fill_numeric(mean);
                    }
                }
                ColumnKind::Text => {
                    if let Some(mode) = column.mode() {
                        debug!(column = %column.name(), mode = %mode, "imputing text column");
                        column.fill_text(&mode);
                    }
                }
            }
        }
    }

    /// Remove rows where every cell is absent, preserving the order of the
    /// remaining rows
    pub fn remove_empty_rows(&mut self) {
        let num_rows = self.num_rows();
        let keep: Vec<bool> = (0..num_rows)
            .map(|row| {
                self.columns
                    .iter()
                    .any(|column| !column.cells().is_absent(row))
            })
            .collect();

        if keep.iter().all(|&kept| kept) {
            return;
        }

        let removed = keep.iter().filter(|&&kept| !kept).count();
        debug!(removed, "removing empty rows");
        for column in &mut self.columns {
            column.retain_rows(&keep);
        }
    }

    /// Stable sort by one column, consuming the table
    ///
    /// Numeric columns compare numerically, text columns lexicographically;
    /// absent cells order last either way. Ties preserve the prior relative
    /// order. The returned table is reindexed from 0.
    pub fn sorted(self, column_name: &str, ascending: bool) -> Result<Self> {
        let column = self.column(column_name)?;

        let mut indices: Vec<usize> = (0..self.num_rows()).collect();
        match column.cells() {
            Cells::Numeric(values) => {
                indices.sort_by(|&a, &b| {
                    compare_absent_last(&values[a], &values[b], ascending, |x, y| x.total_cmp(y))
                });
            }
            Cells::Text(values) => {
                indices.sort_by(|&a, &b| {
                    compare_absent_last(&values[a], &values[b], ascending, |x, y| {
                        x.as_str().cmp(y.as_str())
                    })
                });
            }
        }

        let columns = self
            .columns
            .iter()
            .map(|column| column.select(&indices))
            .collect();
        Ok(Self { columns })
    }

    /// Keep only the rows matching `condition`, consuming the table
    ///
    /// The condition value is coerced once against the column's kind, then
    /// compared per row; rows whose cell is absent never match. The returned
    /// table is reindexed from 0. The column kind decides the comparison
    /// path exhaustively, so no uncontrolled evaluation can occur.
    pub fn filtered(self, condition: &Condition) -> Result<Self> {
        let column = self.column(&condition.column)?;
        let op = condition.op;

        let keep: Vec<bool> = match column.cells() {
            Cells::Numeric(values) => {
                let target = condition.numeric_value()?;
                values
                    .iter()
                    .map(|cell| {
                        cell.map_or(false, |value| op.matches(value.total_cmp(&target)))
                    })
                    .collect()
            }
            Cells::Text(values) => values
                .iter()
                .map(|cell| {
                    cell.as_deref()
                        .map_or(false, |value| op.matches(value.cmp(&condition.value)))
                })
                .collect(),
        };

        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(row, &kept)| kept.then_some(row))
            .collect();
        debug!(condition = %condition, kept = indices.len(), "filtered rows");

        let columns = self
            .columns
            .iter()
            .map(|column| column.select(&indices))
            .collect();
        Ok(Self { columns })
    }

    /// Aggregate a column into a single scalar
    ///
    /// Operates over present values only. `count` is defined for any column
    /// kind; the other statistics require a numeric column.
    pub fn aggregate(&self, column_name: &str, stat: Stat) -> Result<f64> {
        let column = self.column(column_name)?;
        match column.cells() {
            Cells::Numeric(values) => {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                Ok(stat.apply(&present))
            }
            Cells::Text(values) => {
                if stat.applies_to_text() {
                    Ok(values.iter().flatten().count() as f64)
                } else {
                    Err(Error::UnsupportedColumnType {
                        column: column_name.to_string(),
                    })
                }
            }
        }
    }

    /// Read-only view of the first `n` rows (`n` of 0 falls back to 5)
    pub fn head(&self, n: usize) -> TableView<'_> {
        let n = effective_rows(n);
        TableView {
            table: self,
            start: 0,
            end: n.min(self.num_rows()),
        }
    }

    /// Read-only view of the last `n` rows (`n` of 0 falls back to 5)
    pub fn tail(&self, n: usize) -> TableView<'_> {
        let n = effective_rows(n);
        TableView {
            table: self,
            start: self.num_rows().saturating_sub(n),
            end: self.num_rows(),
        }
    }
}

/// Row count with the non-positive fallback applied
fn effective_rows(n: usize) -> usize {
    if n == 0 {
        5
    } else {
        n
    }
}

/// Infer the kind of a raw column and coerce its cells
fn infer_column(name: &str, raw: Vec<Option<String>>) -> Column {
    let numeric = raw
        .iter()
        .flatten()
        .all(|token| matches!(token.parse::<f64>(), Ok(value) if value.is_finite()));

    if numeric {
        let values = raw
            .into_iter()
            .map(|token| token.and_then(|t| t.parse::<f64>().ok()))
            .collect();
        Column::numeric(name, values)
    } else {
        Column::text(name, raw)
    }
}

/// Compare two optional cells with absent values ordered last
///
/// `ascending` flips the ordering of present values only; absent cells stay
/// last in both directions.
fn compare_absent_last<T, F>(a: &Option<T>, b: &Option<T>, ascending: bool, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            if ascending {
                cmp(x, y)
            } else {
                cmp(y, x)
            }
        }
    }
}

/// Borrowed, read-only view over a contiguous row range of a table
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    /// The viewed table
    table: &'a Table,

    /// First row of the view
    start: usize,

    /// One past the last row of the view
    end: usize,
}

impl TableView<'_> {
    /// Number of rows in the view
    pub fn num_rows(&self) -> usize {
        self.end - self.start
    }

    /// Row positions covered by the view
    pub fn row_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for TableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.table.columns();

        // Column widths: max of header and rendered cells; absent renders empty
        let mut widths: Vec<usize> = columns.iter().map(|c| c.name().len()).collect();
        let index_width = self.end.saturating_sub(1).to_string().len().max(1);
        let mut rendered: Vec<Vec<String>> = Vec::with_capacity(self.num_rows());
        for row in self.row_range() {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| column.cell_as_string(row).unwrap_or_default())
                .collect();
            for (width, cell) in widths.iter_mut().zip(&cells) {
                *width = (*width).max(cell.len());
            }
            rendered.push(cells);
        }

        write!(f, "{:index_width$}", "")?;
        for (column, &width) in columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name())?;
        }
        writeln!(f)?;

        for (offset, cells) in rendered.iter().enumerate() {
            write!(f, "{:>index_width$}", self.start + offset)?;
            for (cell, &width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        // The fixed sample from the original behavior checks: one numeric
        // column with a single absent cell plus a text column with one gap.
        Table::new(vec![
            Column::numeric("age", vec![Some(5.0), None, Some(15.0), Some(20.0), Some(10.0)]),
            Column::text(
                "city",
                vec![
                    Some("rome".to_string()),
                    Some("oslo".to_string()),
                    None,
                    Some("oslo".to_string()),
                    Some("rome".to_string()),
                ],
            ),
        ])
        .unwrap()
    }

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_records_infers_kinds() {
        let headers = vec!["id".to_string(), "name".to_string(), "score".to_string()];
        let records = raw(&[
            &["1", "alice", "10.5"],
            &["2", "bob", ""],
            &["3", "carol", "30.9"],
        ]);
        let table = Table::from_records(&headers, &records).unwrap();

        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column("id").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("name").unwrap().kind(), ColumnKind::Text);
        let score = table.column("score").unwrap();
        assert_eq!(score.kind(), ColumnKind::Numeric);
        assert_eq!(score.null_count(), 1);
    }

    #[test]
    fn test_from_records_drops_all_absent_column() {
        let headers = vec!["a".to_string(), "blank".to_string()];
        let records = raw(&[&["1", ""], &["2", "nan"], &["3", "NULL"]]);
        let table = Table::from_records(&headers, &records).unwrap();

        assert_eq!(table.num_columns(), 1);
        assert!(matches!(
            table.column("blank"),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_from_records_mixed_tokens_become_text() {
        let headers = vec!["v".to_string()];
        let records = raw(&[&["1"], &["two"], &["3"]]);
        let table = Table::from_records(&headers, &records).unwrap();
        assert_eq!(table.column("v").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut table = sample_table();
        table.normalize();
        let once = table.clone();
        table.normalize();
        assert_eq!(table, once);
    }

    #[test]
    fn test_replace_missing_fills_every_cell() {
        let mut table = sample_table();
        let shape = table.shape();
        table.replace_missing();

        assert_eq!(table.shape(), shape);
        for column in table.columns() {
            assert_eq!(column.null_count(), 0);
        }
        // Numeric gap filled with the mean of the present values
        let age = table.column("age").unwrap().numeric_values().unwrap();
        assert_eq!(age[1], Some(12.5));
        // Text gap filled with the mode; tie broken by first-encountered
        let city = table.column("city").unwrap().text_values().unwrap();
        assert_eq!(city[2].as_deref(), Some("rome"));
    }

    #[test]
    fn test_replace_missing_leaves_complete_columns_untouched() {
        let mut table = Table::new(vec![Column::numeric(
            "x",
            vec![Some(1.0), Some(2.0)],
        )])
        .unwrap();
        let before = table.clone();
        table.replace_missing();
        assert_eq!(table, before);
    }

    #[test]
    fn test_remove_empty_rows_keeps_partial_rows() {
        let mut table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), None, None, Some(4.0)]),
            Column::text(
                "b",
                vec![Some("x".to_string()), None, Some("z".to_string()), None],
            ),
        ])
        .unwrap();

        table.remove_empty_rows();

        // Row 1 was fully absent; row 2 was partial and stays
        assert_eq!(table.shape(), (3, 2));
        let a = table.column("a").unwrap().numeric_values().unwrap();
        assert_eq!(a, &[Some(1.0), None, Some(4.0)]);
    }

    #[test]
    fn test_sort_ascending_is_non_decreasing() {
        let table = sample_table().sorted("age", true).unwrap();
        let age = table.column("age").unwrap().numeric_values().unwrap();
        let present: Vec<f64> = age.iter().flatten().copied().collect();
        assert!(present.windows(2).all(|w| w[0] <= w[1]));
        // Absent cells order last
        assert_eq!(age.last().unwrap(), &None);
    }

    #[test]
    fn test_sort_descending_keeps_absent_last() {
        let table = sample_table().sorted("age", false).unwrap();
        let age = table.column("age").unwrap().numeric_values().unwrap();
        assert_eq!(age[0], Some(20.0));
        assert_eq!(age.last().unwrap(), &None);
    }

    #[test]
    fn test_sort_is_stable() {
        let table = Table::new(vec![
            Column::numeric("key", vec![Some(1.0), Some(0.0), Some(1.0), Some(0.0)]),
            Column::text(
                "tag",
                vec![
                    Some("a".to_string()),
                    Some("b".to_string()),
                    Some("c".to_string()),
                    Some("d".to_string()),
                ],
            ),
        ])
        .unwrap();

        let sorted = table.sorted("key", true).unwrap();
        let tag = sorted.column("tag").unwrap().text_values().unwrap();
        let order: Vec<&str> = tag.iter().flatten().map(String::as_str).collect();
        assert_eq!(order, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_moves_whole_rows() {
        let sorted = sample_table().sorted("age", true).unwrap();
        let age = sorted.column("age").unwrap().numeric_values().unwrap();
        let city = sorted.column("city").unwrap().text_values().unwrap();
        assert_eq!(age[0], Some(5.0));
        assert_eq!(city[0].as_deref(), Some("rome"));
        assert_eq!(age[1], Some(10.0));
        assert_eq!(city[1].as_deref(), Some("rome"));
    }

    #[test]
    fn test_sort_unknown_column() {
        assert!(matches!(
            sample_table().sorted("height", true),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_filter_numeric_greater_than() {
        let condition = Condition::new("age", ">", "10").unwrap();
        let table = sample_table().filtered(&condition).unwrap();

        // The absent cell never matches
        assert_eq!(table.num_rows(), 2);
        let age = table.column("age").unwrap().numeric_values().unwrap();
        assert!(age.iter().flatten().all(|&v| v > 10.0));
    }

    #[test]
    fn test_filter_text_equality() {
        let condition = Condition::new("city", "==", "rome").unwrap();
        let table = sample_table().filtered(&condition).unwrap();
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_filter_value_must_be_numeric_for_numeric_column() {
        let condition = Condition::new("age", ">", "ten").unwrap();
        assert!(matches!(
            sample_table().filtered(&condition),
            Err(Error::InvalidFilterValue { .. })
        ));
    }

    #[test]
    fn test_aggregate_mean_matches_recomputation() {
        let table = sample_table();
        let mean = table.aggregate("age", Stat::Mean).unwrap();
        assert_eq!(mean, (5.0 + 15.0 + 20.0 + 10.0) / 4.0);
    }

    #[test]
    fn test_aggregate_count_on_text_column() {
        let table = sample_table();
        assert_eq!(table.aggregate("city", Stat::Count).unwrap(), 4.0);
    }

    #[test]
    fn test_aggregate_sum_on_text_column_is_rejected() {
        assert!(matches!(
            sample_table().aggregate("city", Stat::Sum),
            Err(Error::UnsupportedColumnType { .. })
        ));
    }

    #[test]
    fn test_aggregate_std_of_single_value_is_nan() {
        let table = Table::new(vec![Column::numeric("x", vec![Some(1.0)])]).unwrap();
        assert!(table.aggregate("x", Stat::Std).unwrap().is_nan());
        assert!(table.aggregate("x", Stat::Var).unwrap().is_nan());
    }

    #[test]
    fn test_head_and_tail_views() {
        let table = sample_table();
        assert_eq!(table.head(3).num_rows(), 3);
        assert_eq!(table.tail(2).row_range(), 3..5);
        // Larger than the table clamps
        assert_eq!(table.head(100).num_rows(), 5);
        // Zero falls back to the default of 5
        assert_eq!(table.head(0).num_rows(), 5);
        // Views do not mutate
        assert_eq!(table.shape(), (5, 2));
    }

    #[test]
    fn test_view_renders_header_and_rows() {
        let table = sample_table();
        let text = table.head(2).to_string();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("age"));
        assert!(header.contains("city"));
        assert!(lines.next().unwrap().starts_with('0'));
        assert!(lines.next().unwrap().starts_with('1'));
    }

    #[test]
    fn test_impute_filter_aggregate_scenario() {
        // age = [5, null, 15, 20, 10]: mean-fill the null with 12.5, filter
        // age > 10 keeps three rows, their sum is 47.5.
        let mut table = sample_table();
        table.replace_missing();
        let condition = Condition::new("age", ">", "10").unwrap();
        let table = table.filtered(&condition).unwrap();

        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.aggregate("age", Stat::Sum).unwrap(), 47.5);
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = Table::new(vec![
            Column::numeric("x", vec![Some(1.0)]),
            Column::numeric("x", vec![Some(2.0)]),
        ]);
        assert!(matches!(result, Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_unequal_column_lengths_rejected() {
        let result = Table::new(vec![
            Column::numeric("x", vec![Some(1.0)]),
            Column::numeric("y", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(matches!(result, Err(Error::MalformedTable(_))));
    }
}
