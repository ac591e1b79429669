//! Synchronous processing strategy
//!
//! Streams operations from the CSV file with `SyncReader` and applies them one
//! at a time, in file order, to a single `LedgerEngine`. Results are identical
//! to a sequential series of direct engine calls.

use crate::core::{AccountStore, LedgerEngine};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ReplaySummary};
use crate::types::DEFAULT_CURRENCY;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::default();
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    currency: String,
}

impl SyncProcessingStrategy {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

impl Default for SyncProcessingStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplaySummary, String> {
        let engine =
            LedgerEngine::with_store(Arc::new(AccountStore::with_currency(self.currency.as_str())));
        let reader = SyncReader::new(input_path).map_err(|e| e.to_string())?;
        let mut summary = ReplaySummary::default();

        for result in reader {
            match result {
                Ok(operation) => {
                    let op_type = operation.operation_type();
                    match engine.apply(operation) {
                        Ok(_) => summary.applied += 1,
                        Err(e) => {
                            summary.rejected += 1;
                            warn!(operation = op_type.as_str(), error = %e, "operation rejected");
                        }
                    }
                }
                Err(e) => {
                    summary.malformed += 1;
                    warn!(error = %e, "skipping malformed row");
                }
            }
        }

        write_accounts_csv(&engine.get_accounts(), output).map_err(|e| e.to_string())?;

        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            malformed = summary.malformed,
            "replay finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn run(strategy: &SyncProcessingStrategy, content: &str) -> (ReplaySummary, String) {
        let file = create_temp_csv(content);
        let mut output = Vec::new();
        let summary = strategy.process(file.path(), &mut output).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_sync_strategy_replays_operations() {
        let (summary, output) = run(
            &SyncProcessingStrategy::default(),
            &format!(
                "{HEADER}\
                 open,,,,100,Alice\n\
                 deposit,1,1,,50,\n\
                 open,,,,0,Bob\n\
                 transfer,1,1,2,50,\n"
            ),
        );

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 4,
                rejected: 0,
                malformed: 0,
            }
        );
        assert_eq!(
            output,
            "id,name,balance,currency\n1,Alice,100.0000,USD\n2,Bob,50.0000,USD\n"
        );
    }

    #[test]
    fn test_sync_strategy_counts_rejections_and_malformed_rows() {
        let (summary, output) = run(
            &SyncProcessingStrategy::default(),
            &format!(
                "{HEADER}\
                 open,,,,100,Alice\n\
                 withdraw,1,1,,200,\n\
                 deposit,2,1,,10,\n\
                 deposit,1,1,,ten,\n"
            ),
        );

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 1,
                rejected: 2,
                malformed: 1,
            }
        );
        assert_eq!(output, "id,name,balance,currency\n1,Alice,100.0000,USD\n");
    }

    #[test]
    fn test_sync_strategy_uses_configured_currency() {
        let (_summary, output) = run(
            &SyncProcessingStrategy::new("EUR"),
            &format!("{HEADER}open,,,,1,Alice\n"),
        );

        assert_eq!(output, "id,name,balance,currency\n1,Alice,1.0000,EUR\n");
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "File not found: nonexistent.csv");
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
