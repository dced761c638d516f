use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AuthorizationConfig;
use crate::oracle::{BatchCheckItem, OracleClient, TupleKey};

/// Turns (user, resource, permission) questions into oracle checks.
/// Fails closed: whenever the oracle cannot answer, the answer is "denied".
pub struct DecisionService {
    oracle: Arc<dyn OracleClient>,
    user_type: String,
    object_type: String,
}

impl DecisionService {
    pub fn new(oracle: Arc<dyn OracleClient>) -> Self {
        Self::from_config(oracle, &AuthorizationConfig::default())
    }

    pub fn from_config(oracle: Arc<dyn OracleClient>, config: &AuthorizationConfig) -> Self {
        Self {
            oracle,
            user_type: config.user_type.clone(),
            object_type: config.object_type.clone(),
        }
    }

    pub fn with_object_type(mut self, object_type: &str) -> Self {
        self.object_type = object_type.to_string();
        self
    }

    /// Oracle tuple for one question. The user is always prefixed with the
    /// user type; a resource already of the form `type:id` is used verbatim.
    pub fn tuple(&self, user: &str, resource: &str, permission: &str) -> TupleKey {
        TupleKey::new(
            format!("{}:{}", self.user_type, user),
            permission,
            qualify(&self.object_type, resource),
        )
    }

    pub async fn check(&self, user: &str, resource: &str, permission: &str) -> bool {
        let tuple = self.tuple(user, resource, permission);
        match self.oracle.check(&tuple).await {
            Ok(allowed) => {
                debug!(user = %tuple.user, relation = %tuple.relation, object = %tuple.object, allowed, "Permission checked");
                allowed
            }
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    user = %tuple.user,
                    relation = %tuple.relation,
                    object = %tuple.object,
                    error = %e,
                    "Permission check failed, denying"
                );
                false
            }
        }
    }

    /// One decision per permission, in request order
    pub async fn check_many(&self, user: &str, resource: &str, permissions: &[String]) -> Vec<bool> {
        if permissions.is_empty() {
            return Vec::new();
        }

        let checks: Vec<BatchCheckItem> = permissions
            .iter()
            .enumerate()
            .map(|(i, permission)| BatchCheckItem {
                correlation_id: i.to_string(),
                tuple_key: self.tuple(user, resource, permission),
            })
            .collect();

        let results = match self.oracle.check_many(&checks).await {
            Ok(results) => results,
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    user,
                    resource,
                    permissions = ?permissions,
                    error = %e,
                    "Batch permission check failed, denying all"
                );
                return vec![false; permissions.len()];
            }
        };

        // Unanswered entries stay denied; a repeated id is granted only if every answer grants
        let mut answers: Vec<Option<bool>> = vec![None; permissions.len()];
        for result in results {
            match result.correlation_id.parse::<usize>() {
                Ok(i) if i < answers.len() => {
                    answers[i] = Some(answers[i].unwrap_or(true) && result.allowed);
                }
                _ => warn!(
                    oracle = self.oracle.name(),
                    correlation_id = %result.correlation_id,
                    "Ignoring batch answer with unknown correlation id"
                ),
            }
        }
        let decisions: Vec<bool> = answers.into_iter().map(|a| a.unwrap_or(false)).collect();

        debug!(user, resource, permissions = ?permissions, decisions = ?decisions, "Permissions checked");
        decisions
    }
}

fn qualify(kind: &str, id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{kind}:{id}")
    }
}
