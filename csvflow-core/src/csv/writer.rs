//! CSV writer implementation

use std::path::Path;

use ::csv::WriterBuilder;
use tracing::debug;

use crate::error::Result;
use crate::table::Table;

/// Options for saving a table as delimited text
#[derive(Debug, Clone, Copy)]
pub struct CsvWriteOptions {
    /// Column separator byte
    pub delimiter: u8,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Serialize the table to `path` as UTF-8 delimited text
///
/// Columns are written in table order with one header row and no row index;
/// absent cells become empty fields. The in-memory table is not mutated and
/// the file handle is released before returning.
pub fn write_table(table: &Table, path: &Path, options: &CsvWriteOptions) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;

    writer.write_record(table.column_names())?;

    for row in 0..table.num_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.cell_as_string(row).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!(path = %path.display(), rows = table.num_rows(), "saved table");
    Ok(())
}
