//! Batch processing with account-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which applies a batch of
//! operations concurrently while keeping the per-account order of the input.
//!
//! # Design
//!
//! A batch is cut into segments at every `Open`. Opens run one at a time, in
//! input order, so ids are allocated exactly as a sequential replay would and
//! an account exists before any later row addresses it. Within a segment the
//! operations are partitioned by their primary account (the debited account
//! for withdraw and transfer, the credited one for deposit); partitions run
//! concurrently as tokio tasks and each partition runs sequentially.
//!
//! A transfer links its two accounts: every operation on either of them lands
//! in the same partition (union-find over the segment's transfers). No two
//! partitions share an account, so each partition sees exactly the balances a
//! sequential replay would and the final state matches it.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<LedgerEngine>  (shared, thread-safe engine)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::core::engine::LedgerEngine;
use crate::types::{AccountId, LedgerError, Operation, OperationOutcome};

/// Result of applying a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was applied
    pub operation: Operation,

    /// The outcome (success or error)
    pub result: Result<OperationOutcome, LedgerError>,
}

/// Batch processor with account-based partitioning
///
/// Cloneable; all clones share the same engine.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: Arc<LedgerEngine>,
}

impl BatchProcessor {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }

    /// Partition operations by connected accounts
    ///
    /// Accounts joined by a transfer share a partition, keyed by the smallest
    /// account id in the group. Each operation appears in exactly one
    /// partition and partitions keep the input order. `Open` has no primary
    /// account and is not expected here; it is grouped under id 0, which the
    /// store never allocates.
    pub fn partition_by_account(
        &self,
        operations: Vec<Operation>,
    ) -> HashMap<AccountId, Vec<Operation>> {
        let mut groups = AccountGroups::default();
        for operation in &operations {
            if let Operation::Transfer { from, to, .. } = operation {
                groups.union(*from, *to);
            }
        }

        let mut partitions: HashMap<AccountId, Vec<Operation>> = HashMap::new();
        for operation in operations {
            let key = operation
                .primary_account()
                .map(|account| groups.find(account))
                .unwrap_or(0);
            partitions.entry(key).or_default().push(operation);
        }

        partitions
    }

    /// Apply operations sequentially in input order
    ///
    /// Every operation is applied even if earlier ones fail; results keep the
    /// input order.
    pub async fn process_account_operations(
        &self,
        operations: Vec<Operation>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(operations.len());

        for operation in operations {
            let result = self.engine.apply(operation.clone());
            results.push(ProcessingResult { operation, result });
        }

        results
    }

    /// Apply a batch of operations
    ///
    /// Opens run in input order; everything between two opens runs
    /// concurrently across accounts.
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per input operation. Results of a concurrent
    /// segment are grouped by partition, so they may not follow input order.
    pub async fn process_batch(&self, batch: Vec<Operation>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        let mut segment = Vec::new();

        for operation in batch {
            if matches!(operation, Operation::Open { .. }) {
                let pending = std::mem::take(&mut segment);
                results.extend(self.process_segment(pending).await);

                let result = self.engine.apply(operation.clone());
                results.push(ProcessingResult { operation, result });
            } else {
                segment.push(operation);
            }
        }

        results.extend(self.process_segment(segment).await);
        results
    }

    async fn process_segment(&self, segment: Vec<Operation>) -> Vec<ProcessingResult> {
        if segment.is_empty() {
            return Vec::new();
        }

        let partitions = self.partition_by_account(segment);

        let mut tasks = Vec::with_capacity(partitions.len());
        for (_account, operations) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_account_operations(operations).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(partition_results) => results.extend(partition_results),
                Err(e) => error!(error = ?e, "partition task panicked"),
            }
        }

        results
    }
}

/// Disjoint sets of account ids; the root of a set is its smallest id
#[derive(Debug, Default)]
struct AccountGroups {
    parent: HashMap<AccountId, AccountId>,
}

impl AccountGroups {
    fn find(&mut self, account: AccountId) -> AccountId {
        let mut root = account;
        while let Some(&parent) = self.parent.get(&root) {
            if parent == root {
                break;
            }
            root = parent;
        }

        // Path compression
        let mut current = account;
        while current != root {
            let next = self.parent.get(&current).copied().unwrap_or(root);
            self.parent.insert(current, root);
            current = next;
        }

        root
    }

    fn union(&mut self, a: AccountId, b: AccountId) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        let (root, child) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent.insert(child, root);
        self.parent.insert(root, root);
    }
}
