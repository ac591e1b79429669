//! Asynchronous batch processing strategy
//!
//! Replays operations in batches on a tokio multi-threaded runtime. Batches
//! are applied one after another; inside a batch the `BatchProcessor` runs
//! operations on different accounts concurrently.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (account partitioning + tokio tasks)
//!     └── LedgerEngine (shared, thread-safe)
//!         └── AccountStore (DashMap + per-account locks)
//! ```

use crate::core::{AccountStore, BatchProcessor, LedgerEngine};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{ProcessingStrategy, ReplaySummary};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads for the runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    currency: String,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, currency: impl Into<String>) -> Self {
        Self {
            config,
            currency: currency.into(),
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplaySummary, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let store = Arc::new(AccountStore::with_currency(self.currency.as_str()));
            let engine = Arc::new(LedgerEngine::with_store(Arc::clone(&store)));
            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::open_failed(input_path, e).to_string())?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut summary = ReplaySummary::default();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Finish the batch before reading the next one so that rows
                // for an account never overtake earlier rows in another batch
                for processed in processor.process_batch(batch).await {
                    match processed.result {
                        Ok(_) => summary.applied += 1,
                        Err(e) => {
                            summary.rejected += 1;
                            warn!(
                                operation = processed.operation.operation_type().as_str(),
                                error = %e,
                                "operation rejected"
                            );
                        }
                    }
                }
            }
            summary.malformed = reader.skipped();

            write_accounts_csv(&store.get_all_accounts(), output).map_err(|e| e.to_string())?;

            info!(
                applied = summary.applied,
                rejected = summary.rejected,
                malformed = summary.malformed,
                "replay finished"
            );
            Ok(summary)
        })
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

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        let default = BatchConfig::default();

        assert_eq!(config.batch_size, default.batch_size);
        assert_eq!(config.max_concurrent_batches, default.max_concurrent_batches);
    }

    #[test]
    fn test_async_strategy_replays_operations() {
        let file = create_temp_csv(&format!(
            "{HEADER}\
             open,,,,100,Alice\n\
             deposit,1,1,,50,\n\
             open,,,,0,Bob\n\
             transfer,1,1,2,50,\n\
             deposit,1,2,,10,\n"
        ));
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), "USD");
        let mut output = Vec::new();

        let summary = strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 4,
                rejected: 1,
                malformed: 0,
            }
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,name,balance,currency\n1,Alice,100.0000,USD\n2,Bob,50.0000,USD\n"
        );
    }

    #[test]
    fn test_async_strategy_maintains_ordering_across_batches() {
        let file = create_temp_csv(&format!(
            "{HEADER}\
             open,,,,100,Alice\n\
             open,,,,50,Bob\n\
             withdraw,1,1,,30,\n\
             deposit,2,2,,25,\n\
             withdraw,1,1,,20,\n\
             withdraw,1,1,,50,\n\
             withdraw,2,2,,75,\n"
        ));

        // Small batches force each account's rows across several batches
        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 2), "USD");
        let mut output = Vec::new();

        let summary = strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(summary.applied, 7);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,name,balance,currency\n1,Alice,0.0000,USD\n2,Bob,0.0000,USD\n"
        );
    }

    #[test]
    fn test_async_strategy_counts_malformed_rows() {
        let file = create_temp_csv(&format!("{HEADER}open,,,,1,Alice\nopen,,,,x,Bob\n"));
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), "USD");
        let mut output = Vec::new();

        let summary = strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.malformed, 1);
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), "USD");
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "File not found: nonexistent.csv");
    }
}
