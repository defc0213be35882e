//! CSV reader implementation

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ::csv::{ByteRecord, ReaderBuilder};
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::Table;

/// Options for loading a delimited text file
#[derive(Debug, Clone, Copy)]
pub struct CsvReadOptions {
    /// Column separator byte
    pub delimiter: u8,

    /// Text encoding of the source file
    pub encoding: &'static Encoding,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: UTF_8,
        }
    }
}

/// Resolve an encoding label (e.g. `utf-8`, `latin1`) to an encoding
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Load a file into a normalized [`Table`]
///
/// The file handle is held only for the duration of this call.
pub fn read_table(path: &Path, options: &CsvReadOptions) -> Result<Table> {
    let file = File::open(path)?;
    read_table_from_reader(BufReader::new(file), options)
}

/// Load a normalized [`Table`] from any byte reader
///
/// The first record is the header row; fields are decoded through the
/// configured encoding before type inference runs.
pub fn read_table_from_reader<R: Read>(reader: R, options: &CsvReadOptions) -> Result<Table> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|field| decode_field(field, options.encoding))
        .collect();

    let mut records = Vec::new();
    let mut record = ByteRecord::new();
    while csv_reader.read_byte_record(&mut record)? {
        let row: Vec<String> = record
            .iter()
            .map(|field| decode_field(field, options.encoding))
            .collect();
        records.push(row);
    }

    debug!(
        rows = records.len(),
        columns = headers.len(),
        encoding = options.encoding.name(),
        "loaded delimited data"
    );

    Table::from_records(&headers, &records)
}

/// Decode one field through the configured encoding
///
/// Malformed sequences are replaced rather than treated as fatal.
fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}
