use alloy::primitives::Address;

use crate::{tx::FuzzTx, Result};

/// What one worker got through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub submitted: u64,
    pub contract_creations: u64,
    pub with_access_list: u64,
    pub blobs: u64,
    /// Whether the last tx was seen mined before the confirmation timeout.
    pub confirmed: bool,
}

impl WorkerStats {
    pub fn record(&mut self, tx: &FuzzTx) {
        self.submitted += 1;
        if tx.is_contract_creation() {
            self.contract_creations += 1;
        }
        if !tx.access_list().0.is_empty() {
            self.with_access_list += 1;
        }
        if matches!(tx, FuzzTx::Blob(_)) {
            self.blobs += 1;
        }
    }
}

/// Result of a single worker, tagged with the account it ran for.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub index: usize,
    pub address: Address,
    pub result: Result<WorkerStats>,
}

/// Outcomes of every worker of one spam invocation, in account order.
#[derive(Debug, Default)]
pub struct SpamReport {
    pub outcomes: Vec<WorkerOutcome>,
}

impl SpamReport {
    pub fn new(outcomes: Vec<WorkerOutcome>) -> Self {
        Self { outcomes }
    }

    fn stats(&self) -> impl Iterator<Item = &WorkerStats> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Transactions submitted by workers that finished.
    pub fn submitted(&self) -> u64 {
        self.stats().map(|s| s.submitted).sum()
    }

    pub fn contract_creations(&self) -> u64 {
        self.stats().map(|s| s.contract_creations).sum()
    }

    pub fn with_access_list(&self) -> u64 {
        self.stats().map(|s| s.with_access_list).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// The first worker error in account order, or the number of submitted txs.
    pub fn into_result(self) -> Result<u64> {
        let submitted = self.submitted();
        for outcome in self.outcomes {
            outcome.result?;
        }
        Ok(submitted)
    }
}
