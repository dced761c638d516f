use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A (user, relation, object) triple understood by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
}

impl TupleKey {
    pub fn new(
        user: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

/// One entry of a batched check; the correlation id ties it to its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCheckItem {
    pub correlation_id: String,
    pub tuple_key: TupleKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCheckResult {
    pub correlation_id: String,
    pub allowed: bool,
}

/// Relationship-based permission oracle.
/// A denied check is `Ok(false)`; errors mean the oracle could not answer.
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Oracle name for logging
    fn name(&self) -> &str;

    async fn check(&self, tuple: &TupleKey) -> Result<bool>;

    /// Answers may come back in any order, matched by correlation id
    async fn check_many(&self, checks: &[BatchCheckItem]) -> Result<Vec<BatchCheckResult>>;
}
