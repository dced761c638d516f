//! Interceptor chain: ordered links in front of a terminal implementation call.

pub mod interceptor;
pub mod invocation;
pub mod method;

pub use interceptor::Interceptor;
pub use invocation::{AsyncInvocation, CallFrame, Invocation};
pub use method::{MethodId, MethodRef};

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::InvocationError;
use invocation::{AsyncTerminal, BoxedValue, SyncTerminal};

/// Ordered, immutable list of interceptors executed in front of every call.
/// Cloning shares the list.
#[derive(Clone)]
pub struct Chain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::empty()
    }
}

impl Chain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Interceptor names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run a synchronous call through the chain.
    /// Without interceptors the call runs directly, no invocation is built.
    pub fn invoke<'a, R, F>(
        &'a self,
        method: MethodRef,
        args: Vec<Value>,
        call: F,
    ) -> Result<R, InvocationError>
    where
        R: Send + 'static,
        F: FnOnce() -> Result<R, InvocationError> + 'a,
    {
        if self.interceptors.is_empty() {
            return call();
        }

        let terminal: SyncTerminal<'a> =
            Box::new(move || call().map(|value| Box::new(value) as BoxedValue));
        let mut invocation = Invocation::new(method, args, &self.interceptors, terminal);
        invocation.proceed()?;
        invocation.into_frame().into_return()
    }

    /// Run an asynchronous call through the chain
    pub async fn invoke_async<'a, R, F, Fut>(
        &'a self,
        method: MethodRef,
        args: Vec<Value>,
        call: F,
    ) -> Result<R, InvocationError>
    where
        R: Send + 'static,
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<R, InvocationError>> + Send + 'a,
    {
        if self.interceptors.is_empty() {
            return call().await;
        }

        let terminal: AsyncTerminal<'a> = Box::new(move || {
            Box::pin(async move { call().await.map(|value| Box::new(value) as BoxedValue) })
        });
        let mut invocation = AsyncInvocation::new(method, args, &self.interceptors, terminal);
        invocation.proceed().await?;
        invocation.into_frame().into_return()
    }
}
