use anyhow::{bail, Result};
use fgate_adapters::build_oracle;
use fgate_runtime::{AccessSpecification, Combinator, DecisionService, PermissionRequirement};

use crate::config::Config;

/// Run one ad hoc access check and print each permission's decision
pub async fn execute(
    user: &str,
    resource: String,
    permissions: Vec<String>,
    combinator: Combinator,
    config: &Config,
) -> Result<()> {
    let oracle = build_oracle(&config.oracle, config.tuples.clone())?;
    let decisions = DecisionService::from_config(oracle, &config.authorization);
    let requirement = PermissionRequirement::new(resource, permissions, combinator);

    let decision = AccessSpecification::new(&decisions, user, &requirement)
        .evaluate()
        .await;

    for (permission, granted) in requirement.permissions.iter().zip(&decision.decisions) {
        println!(
            "{}#{}@{}: {}",
            requirement.resource,
            permission,
            user,
            if *granted { "granted" } else { "denied" }
        );
    }

    if !decision.satisfied {
        bail!(
            "Access denied: {} lacks {:?} {:?} on {}",
            user,
            requirement.combinator,
            requirement.permissions,
            requirement.resource
        );
    }
    println!("Access granted");
    Ok(())
}
