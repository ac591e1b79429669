//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger operations from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding `Result<Operation, LedgerError>`
//! for each CSV row:
//!
//! ```no_run
//! use rust_ledger_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(operation) => println!("Applying: {:?}", operation),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (`FileNotFound`, `IoError`) are returned from `new()`
//! - Individual row errors are yielded as `ParseError` carrying the line number

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, Operation};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with the file.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Open a CSV file for streaming iteration
    ///
    /// The CSV reader trims whitespace from all fields, accepts rows with
    /// trailing columns omitted, and uses an 8KB buffer.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(LedgerError::FileNotFound)` if the file does not exist
    /// * `Err(LedgerError::IoError)` if it could not be opened otherwise
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::open_failed(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Operation, LedgerError>;

    /// Next operation from the file
    ///
    /// Line numbers in errors count the header as line 1.
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        let row = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num as u64 + 1;

        match row {
            Ok(csv_record) => Some(
                convert_csv_record(csv_record).map_err(|e| LedgerError::parse_error(line, e)),
            ),
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallerId, OperationType};
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "type,caller,account,to,amount,name\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(LedgerError::FileNotFound { path }) if path == "nonexistent.csv"));
    }

    #[test]
    fn test_sync_reader_iterates_all_operation_types() {
        let file = create_temp_csv(&format!(
            "{HEADER}\
             open,,,,100,Alice\n\
             deposit,1,1,,50,\n\
             withdraw,1,1,,25,\n\
             transfer,1,1,2,10,\n"
        ));

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<Operation> = reader.filter_map(Result::ok).collect();

        let types: Vec<OperationType> = operations.iter().map(|op| op.operation_type()).collect();
        assert_eq!(
            types,
            vec![
                OperationType::Open,
                OperationType::Deposit,
                OperationType::Withdraw,
                OperationType::Transfer,
            ]
        );
        assert_eq!(
            operations[3],
            Operation::Transfer {
                from: 1,
                to: 2,
                amount: Decimal::new(10, 0),
                caller: CallerId::new(1),
            }
        );
    }

    #[test]
    fn test_sync_reader_accepts_short_rows() {
        // Trailing empty columns omitted entirely
        let file = create_temp_csv(&format!("{HEADER}deposit,1,1,,50\n"));

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 1);
        assert!(records[0].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv(&format!("{HEADER}  open  , , , 100.0 ,  Alice  \n"));

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(
            records[0],
            Ok(Operation::Open {
                name: "Alice".to_string(),
                initial_balance: Decimal::new(1000, 1),
            })
        );
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let file = create_temp_csv(&format!(
            "{HEADER}\
             open,,,,100,Alice\n\
             deposit,1,1,,invalid,\n\
             deposit,x,1,,5,\n\
             deposit,1,1,,5,\n"
        ));

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        let amount_error = records[1].as_ref().unwrap_err();
        assert!(matches!(amount_error, LedgerError::ParseError { line: Some(3), .. }));
        assert!(amount_error.to_string().contains("Invalid amount"));
        let caller_error = records[2].as_ref().unwrap_err();
        assert!(matches!(caller_error, LedgerError::ParseError { line: Some(4), .. }));
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv(HEADER);

        let reader = SyncReader::new(file.path()).unwrap();

        assert_eq!(reader.count(), 0);
    }
}
