//! Delimited-text load and save
//!
//! Loading decodes byte records through a caller-selected encoding, treats
//! the first row as the header, and hands the raw fields to
//! [`Table::from_records`](crate::Table::from_records) for normalization.
//! Saving writes the current table state back out with a header row and no
//! row index.

mod reader;
mod writer;

pub use reader::{read_table, read_table_from_reader, resolve_encoding, CsvReadOptions};
pub use writer::{write_table, CsvWriteOptions};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::column::ColumnKind;

    #[test]
    fn test_read_basic() {
        let data = "\
id,name,score
1,alice,10.5
2,bob,20.1
3,carol,30.9
";
        let table =
            read_table_from_reader(Cursor::new(data.as_bytes()), &CsvReadOptions::default())
                .unwrap();

        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column_names(), ["id", "name", "score"]);
        assert_eq!(table.column("id").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("name").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn test_read_custom_delimiter() {
        let data = "a;b\n1;x\n2;y\n";
        let options = CsvReadOptions {
            delimiter: b';',
            ..Default::default()
        };
        let table = read_table_from_reader(Cursor::new(data.as_bytes()), &options).unwrap();
        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn test_read_empty_fields_become_absent() {
        let data = "age,city\n5,rome\n,oslo\n15,\n";
        let table =
            read_table_from_reader(Cursor::new(data.as_bytes()), &CsvReadOptions::default())
                .unwrap();
        assert_eq!(table.column("age").unwrap().null_count(), 1);
        assert_eq!(table.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_resolve_encoding_labels() {
        assert!(resolve_encoding("utf-8").is_ok());
        assert!(resolve_encoding("latin1").is_ok());
        assert!(resolve_encoding("not-a-charset").is_err());
    }

    #[test]
    fn test_read_latin1() {
        // "café" encoded as latin-1: the é is a single 0xE9 byte
        let data = b"word\ncaf\xe9\n";
        let options = CsvReadOptions {
            encoding: resolve_encoding("latin1").unwrap(),
            ..Default::default()
        };
        let table = read_table_from_reader(Cursor::new(&data[..]), &options).unwrap();
        let words = table.column("word").unwrap().text_values().unwrap();
        assert_eq!(words[0].as_deref(), Some("café"));
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let data = "age,city\n5,rome\n,oslo\n15,paris\n20,oslo\n10,rome\n";
        let table =
            read_table_from_reader(Cursor::new(data.as_bytes()), &CsvReadOptions::default())
                .unwrap();
        let shape = table.shape();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&table, &path, &CsvWriteOptions::default()).unwrap();

        let reloaded = read_table(&path, &CsvReadOptions::default()).unwrap();
        assert_eq!(reloaded.shape(), shape);
    }

    #[test]
    fn test_write_keeps_absent_cells_empty() {
        let data = "age,city\n5,rome\n,oslo\n15,paris\n";
        let table =
            read_table_from_reader(Cursor::new(data.as_bytes()), &CsvReadOptions::default())
                .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&table, &path, &CsvWriteOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "age,city\n5,rome\n,oslo\n15,paris\n");
    }
}
