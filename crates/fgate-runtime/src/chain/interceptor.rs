use async_trait::async_trait;

use super::invocation::{AsyncInvocation, Invocation};
use crate::error::InvocationError;

/// A link in an interception chain.
///
/// An interceptor observes the call, may touch the return slot, and either
/// proceeds to the next link or returns without proceeding, which stops the
/// chain before the implementation runs. Both entry points default to a
/// transparent pass-through.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Interceptor name for logging
    fn name(&self) -> &str;

    /// Handle a synchronous call
    fn intercept(&self, invocation: &mut Invocation<'_>) -> Result<(), InvocationError> {
        invocation.proceed()
    }

    /// Handle an asynchronous call
    async fn intercept_async(
        &self,
        invocation: &mut AsyncInvocation<'_>,
    ) -> Result<(), InvocationError> {
        invocation.proceed().await
    }
}
