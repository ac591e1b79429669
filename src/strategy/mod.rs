//! Processing strategy module for operation replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing both CSV parsing and ledger processing. This allows different
//! implementations (synchronous, asynchronous batch) to be selected at runtime.

use crate::cli::StrategyType;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Counts of what happened during one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations the engine committed
    pub applied: usize,
    /// Operations the engine rejected (not found, unauthorized, ...)
    pub rejected: usize,
    /// Rows that could not be parsed into an operation
    pub malformed: usize,
}

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads operations from a CSV file, applies them to a fresh
/// ledger, and writes the final account table to `output`.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the operations in `input_path` and write the resulting accounts
    ///
    /// # Returns
    ///
    /// * `Ok(ReplaySummary)` if the run completed; individual operation
    ///   failures are logged and counted, not returned
    /// * `Err(String)` if a fatal error occurred (input cannot be opened,
    ///   output cannot be written, runtime cannot start)
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplaySummary, String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sync or Async
/// * `config` - Optional batch configuration (ignored for sync)
/// * `currency` - Currency assigned to every account the run opens
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    currency: &str,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(currency)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, currency))
        }
    }
}
