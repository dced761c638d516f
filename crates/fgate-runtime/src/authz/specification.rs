use super::decision::DecisionService;
use super::requirement::PermissionRequirement;

/// Outcome of evaluating a requirement for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// One entry per required permission, in declaration order
    pub decisions: Vec<bool>,
    pub satisfied: bool,
}

/// "Does `user` meet `requirement`?" as a reusable question
pub struct AccessSpecification<'a> {
    decisions: &'a DecisionService,
    user: &'a str,
    requirement: &'a PermissionRequirement,
}

impl<'a> AccessSpecification<'a> {
    pub fn new(
        decisions: &'a DecisionService,
        user: &'a str,
        requirement: &'a PermissionRequirement,
    ) -> Self {
        Self {
            decisions,
            user,
            requirement,
        }
    }

    pub async fn evaluate(&self) -> AccessDecision {
        let decisions = self
            .decisions
            .check_many(
                self.user,
                &self.requirement.resource,
                &self.requirement.permissions,
            )
            .await;
        let satisfied = self.requirement.combinator.is_satisfied(&decisions);
        AccessDecision {
            decisions,
            satisfied,
        }
    }

    pub async fn is_satisfied(&self) -> bool {
        self.evaluate().await.satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{BatchCheckItem, BatchCheckResult, OracleClient, TupleKey};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Answers batches with a scripted decision list
    struct Scripted(Vec<bool>);

    #[async_trait]
    impl OracleClient for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn check(&self, _tuple: &TupleKey) -> Result<bool> {
            Ok(self.0[0])
        }
        async fn check_many(&self, checks: &[BatchCheckItem]) -> Result<Vec<BatchCheckResult>> {
            Ok(checks
                .iter()
                .zip(&self.0)
                .map(|(c, allowed)| BatchCheckResult {
                    correlation_id: c.correlation_id.clone(),
                    allowed: *allowed,
                })
                .collect())
        }
    }

    async fn evaluate(script: Vec<bool>, requirement: PermissionRequirement) -> AccessDecision {
        let service = DecisionService::new(Arc::new(Scripted(script)));
        AccessSpecification::new(&service, "alice", &requirement)
            .evaluate()
            .await
    }

    #[tokio::test]
    async fn test_or_needs_one_grant() {
        let requirement = PermissionRequirement::any_of("doc1", ["reader", "writer", "owner"]);
        assert!(evaluate(vec![false, false, true], requirement.clone()).await.satisfied);
        assert!(!evaluate(vec![false, false, false], requirement).await.satisfied);
    }

    #[tokio::test]
    async fn test_and_needs_every_grant() {
        let requirement = PermissionRequirement::all_of("doc1", ["reader", "writer", "owner"]);
        assert!(evaluate(vec![true, true, true], requirement.clone()).await.satisfied);

        let decision = evaluate(vec![true, true, false], requirement).await;
        assert!(!decision.satisfied);
        assert_eq!(decision.decisions, vec![true, true, false]);
    }

    #[tokio::test]
    async fn test_is_satisfied() {
        let service = DecisionService::new(Arc::new(Scripted(vec![true, false])));
        let requirement = PermissionRequirement::any_of("doc1", ["reader", "owner"]);
        assert!(
            AccessSpecification::new(&service, "alice", &requirement)
                .is_satisfied()
                .await
        );
    }
}
