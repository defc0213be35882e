//! Column implementation for storing typed, nullable cell values

use std::collections::HashMap;
use std::fmt;

/// Element kind of a column, fixed at normalization time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every present cell is a finite number
    Numeric,

    /// Every present cell is a string
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Typed cell storage for a column
///
/// `None` is the explicit missing marker, distinct from a valid zero or any
/// string value. The variant is fixed when the column is normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Cells {
    /// Numeric cells; present values are finite
    Numeric(Vec<Option<f64>>),

    /// Text cells
    Text(Vec<Option<String>>),
}

impl Cells {
    /// Number of cells (present or absent)
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    /// Check if the storage holds no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the cell at `index` is absent
    pub fn is_absent(&self, index: usize) -> bool {
        match self {
            Self::Numeric(values) => values.get(index).map_or(true, Option::is_none),
            Self::Text(values) => values.get(index).map_or(true, Option::is_none),
        }
    }
}

/// A named column of typed, nullable cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name of the column
    name: String,

    /// Cell values
    cells: Cells,
}

impl Column {
    /// Create a numeric column
    pub fn numeric(name: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            cells: Cells::Numeric(values),
        }
    }

    /// Create a text column
    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.to_string(),
            cells: Cells::Text(values),
        }
    }

    /// Get the name of this column
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the element kind of this column
    pub fn kind(&self) -> ColumnKind {
        match self.cells {
            Cells::Numeric(_) => ColumnKind::Numeric,
            Cells::Text(_) => ColumnKind::Text,
        }
    }

    /// Get the cell storage
    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// Get the length of this column (number of cells)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if this column is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get the number of absent cells in this column
    pub fn null_count(&self) -> usize {
        match &self.cells {
            Cells::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            Cells::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Check if this column has any absent cells
    pub fn has_nulls(&self) -> bool {
        self.null_count() > 0
    }

    /// Get the numeric values when this is a numeric column
    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match &self.cells {
            Cells::Numeric(values) => Some(values),
            Cells::Text(_) => None,
        }
    }

    /// Get the text values when this is a text column
    pub fn text_values(&self) -> Option<&[Option<String>]> {
        match &self.cells {
            Cells::Text(values) => Some(values),
            Cells::Numeric(_) => None,
        }
    }

    /// Render the cell at `index` as a string, `None` when absent
    pub fn cell_as_string(&self, index: usize) -> Option<String> {
        match &self.cells {
            Cells::Numeric(values) => values.get(index)?.map(|v| format_number(v)),
            Cells::Text(values) => values.get(index)?.clone(),
        }
    }

    /// Arithmetic mean of present numeric values
    ///
    /// `None` for text columns or when no value is present.
    pub fn mean(&self) -> Option<f64> {
        let values = self.numeric_values()?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }

    /// Most frequent present text value, ties broken by insertion order
    ///
    /// `None` for numeric columns or when no value is present.
    pub fn mode(&self) -> Option<String> {
        let values = self.text_values()?;

        // Track count and first occurrence position per distinct value
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, value) in values.iter().enumerate() {
            if let Some(value) = value {
                let entry = counts.entry(value.as_str()).or_insert((0, position));
                entry.0 += 1;
            }
        }

        counts
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(value, _)| value.to_string())
    }

    /// Replace every absent cell with `value`, for numeric columns
    pub(crate) fn fill_numeric(&mut self, value: f64) {
        if let Cells::Numeric(values) = &mut self.cells {
            for cell in values.iter_mut() {
                if cell.is_none() {
                    *cell = Some(value);
                }
            }
        }
    }

    /// Replace every absent cell with `value`, for text columns
    pub(crate) fn fill_text(&mut self, value: &str) {
        if let Cells::Text(values) = &mut self.cells {
            for cell in values.iter_mut() {
                if cell.is_none() {
                    *cell = Some(value.to_string());
                }
            }
        }
    }

    /// Build a new column containing the cells at `indices`, in order
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        let cells = match &self.cells {
            Cells::Numeric(values) => {
                Cells::Numeric(indices.iter().map(|&i| values[i]).collect())
            }
            Cells::Text(values) => {
                Cells::Text(indices.iter().map(|&i| values[i].clone()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            cells,
        }
    }

    /// Keep only the cells whose position is marked `true` in `keep`
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        match &mut self.cells {
            Cells::Numeric(values) => {
                let mut position = 0;
                values.retain(|_| {
                    let kept = keep[position];
                    position += 1;
                    kept
                });
            }
            Cells::Text(values) => {
                let mut position = 0;
                values.retain(|_| {
                    let kept = keep[position];
                    position += 1;
                    kept
                });
            }
        }
    }
}

/// Format a number the way it is written back to delimited text
///
/// Integral values print without a trailing `.0` so that a load/save
/// round-trip of integer-looking data stays stable.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_ignores_absent() {
        let column = Column::numeric("age", vec![Some(5.0), None, Some(15.0), Some(20.0)]);
        assert_eq!(column.mean(), Some(40.0 / 3.0));
    }

    #[test]
    fn test_mean_of_text_column_is_none() {
        let column = Column::text("name", vec![Some("a".to_string())]);
        assert_eq!(column.mean(), None);
    }

    #[test]
    fn test_mode_breaks_ties_by_insertion_order() {
        let column = Column::text(
            "city",
            vec![
                Some("rome".to_string()),
                Some("oslo".to_string()),
                None,
                Some("oslo".to_string()),
                Some("rome".to_string()),
            ],
        );
        // Both appear twice, "rome" was seen first
        assert_eq!(column.mode(), Some("rome".to_string()));
    }

    #[test]
    fn test_mode_picks_most_frequent() {
        let column = Column::text(
            "city",
            vec![
                Some("rome".to_string()),
                Some("oslo".to_string()),
                Some("oslo".to_string()),
            ],
        );
        assert_eq!(column.mode(), Some("oslo".to_string()));
    }

    #[test]
    fn test_null_count() {
        let column = Column::numeric("x", vec![None, Some(1.0), None]);
        assert_eq!(column.null_count(), 2);
        assert!(column.has_nulls());
    }

    #[test]
    fn test_format_number_drops_integral_fraction() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(12.5), "12.5");
    }
}
