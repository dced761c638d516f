use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashSet;

use fgate_runtime::{BatchCheckItem, BatchCheckResult, OracleClient, TupleKey};

/// In-process oracle answering from an explicit tuple set.
/// A check is granted only by an exact tuple match.
#[derive(Default)]
pub struct MemoryOracle {
    tuples: DashSet<TupleKey>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuples(tuples: impl IntoIterator<Item = TupleKey>) -> Self {
        let oracle = Self::new();
        for tuple in tuples {
            oracle.write(tuple);
        }
        oracle
    }

    pub fn write(&self, tuple: TupleKey) {
        self.tuples.insert(tuple);
    }

    /// Returns whether the tuple was present
    pub fn delete(&self, tuple: &TupleKey) -> bool {
        self.tuples.remove(tuple).is_some()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

#[async_trait]
impl OracleClient for MemoryOracle {
    fn name(&self) -> &str {
        "memory"
    }

    async fn check(&self, tuple: &TupleKey) -> Result<bool> {
        Ok(self.tuples.contains(tuple))
    }

    async fn check_many(&self, checks: &[BatchCheckItem]) -> Result<Vec<BatchCheckResult>> {
        Ok(checks
            .iter()
            .map(|check| BatchCheckResult {
                correlation_id: check.correlation_id.clone(),
                allowed: self.tuples.contains(&check.tuple_key),
            })
            .collect())
    }
}
