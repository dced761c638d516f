use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::decision::DecisionService;
use super::requirement::{PermissionRequirement, PermissionTable};
use super::specification::{AccessDecision, AccessSpecification};
use crate::blocking;
use crate::chain::{AsyncInvocation, Interceptor, Invocation, MethodRef};
use crate::error::InvocationError;
use crate::proxy::{InterceptorFactory, ServiceDescriptor};
use crate::session::SessionIdentitySource;

/// Gate that lets a call through only when the session's user meets the
/// method's permission requirement. Methods without one pass untouched.
pub struct AuthorizationInterceptor {
    service: &'static str,
    permissions: Arc<PermissionTable>,
    decisions: Arc<DecisionService>,
    sessions: Arc<dyn SessionIdentitySource>,
}

impl AuthorizationInterceptor {
    pub fn new(
        service: &'static str,
        permissions: Arc<PermissionTable>,
        decisions: Arc<DecisionService>,
        sessions: Arc<dyn SessionIdentitySource>,
    ) -> Self {
        Self {
            service,
            permissions,
            decisions,
            sessions,
        }
    }

    /// Requirement and caller for a guarded method, `None` for an open one.
    /// A method outside the registered surfaces is rejected, never let through.
    fn guard(
        &self,
        method: &MethodRef,
    ) -> Result<Option<(String, &PermissionRequirement)>, InvocationError> {
        if !self.permissions.declares(method) {
            warn!(service = self.service, method = %method, "Call to undeclared method rejected");
            return Err(InvocationError::UndeclaredMethod {
                method: method.to_string(),
            });
        }

        let Some(requirement) = self.permissions.lookup(method) else {
            return Ok(None);
        };

        match self.sessions.current_user().filter(|user| !user.is_empty()) {
            Some(user) => Ok(Some((user, requirement))),
            None => {
                warn!(service = self.service, method = %method, "Unauthenticated call rejected");
                Err(InvocationError::Unauthenticated {
                    method: method.to_string(),
                })
            }
        }
    }

    fn enforce(
        &self,
        method: &MethodRef,
        user: String,
        requirement: &PermissionRequirement,
        decision: AccessDecision,
    ) -> Result<(), InvocationError> {
        if decision.satisfied {
            debug!(service = self.service, method = %method, user = %user, "Call authorized");
            return Ok(());
        }

        warn!(
            service = self.service,
            method = %method,
            user = %user,
            resource = %requirement.resource,
            permissions = ?requirement.permissions,
            combinator = ?requirement.combinator,
            decisions = ?decision.decisions,
            "Unauthorized call rejected"
        );
        Err(InvocationError::Unauthorized {
            method: method.to_string(),
            user,
            resource: requirement.resource.clone(),
            permissions: requirement.permissions.clone(),
        })
    }
}

#[async_trait]
impl Interceptor for AuthorizationInterceptor {
    fn name(&self) -> &str {
        "authorization"
    }

    fn intercept(&self, invocation: &mut Invocation<'_>) -> Result<(), InvocationError> {
        let method = *invocation.method();
        if let Some((user, requirement)) = self.guard(&method)? {
            let decision = blocking::block_on(
                AccessSpecification::new(&self.decisions, &user, requirement).evaluate(),
            );
            self.enforce(&method, user, requirement, decision)?;
        }
        invocation.proceed()
    }

    async fn intercept_async(
        &self,
        invocation: &mut AsyncInvocation<'_>,
    ) -> Result<(), InvocationError> {
        let method = *invocation.method();
        if let Some((user, requirement)) = self.guard(&method)? {
            let decision = AccessSpecification::new(&self.decisions, &user, requirement)
                .evaluate()
                .await;
            self.enforce(&method, user, requirement, decision)?;
        }
        invocation.proceed().await
    }
}

/// Builds an [`AuthorizationInterceptor`] per registered service pair
pub struct AuthorizationInterceptorFactory {
    decisions: Arc<DecisionService>,
    sessions: Arc<dyn SessionIdentitySource>,
}

impl AuthorizationInterceptorFactory {
    pub fn new(decisions: Arc<DecisionService>, sessions: Arc<dyn SessionIdentitySource>) -> Self {
        Self {
            decisions,
            sessions,
        }
    }
}

impl InterceptorFactory for AuthorizationInterceptorFactory {
    fn name(&self) -> &str {
        "authorization"
    }

    fn create(&self, service: &ServiceDescriptor) -> Arc<dyn Interceptor> {
        Arc::new(AuthorizationInterceptor::new(
            service.interface,
            service.permissions.clone(),
            self.decisions.clone(),
            self.sessions.clone(),
        ))
    }
}
