use std::any::Any;
use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use super::interceptor::Interceptor;
use super::method::MethodRef;
use crate::error::InvocationError;

pub(crate) type BoxedValue = Box<dyn Any + Send>;
pub(crate) type SyncTerminal<'a> = Box<dyn FnOnce() -> Result<BoxedValue, InvocationError> + 'a>;
pub(crate) type AsyncTerminal<'a> =
    Box<dyn FnOnce() -> BoxFuture<'a, Result<BoxedValue, InvocationError>> + Send + 'a>;

/// State of a single proxied call, shared by the sync and async invocations
pub struct CallFrame {
    method: MethodRef,
    args: Vec<Value>,
    return_value: Option<BoxedValue>,
    /// Number of chain links entered so far; only ever grows
    cursor: usize,
}

impl CallFrame {
    fn new(method: MethodRef, args: Vec<Value>) -> Self {
        Self {
            method,
            args,
            return_value: None,
            cursor: 0,
        }
    }

    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Arguments as passed by the caller
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Index of the next link to run
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn has_return_value(&self) -> bool {
        self.return_value.is_some()
    }

    pub fn return_value<R: Any>(&self) -> Option<&R> {
        self.return_value.as_ref()?.downcast_ref::<R>()
    }

    /// Replace the return slot, e.g. to answer a call without running the terminal
    pub fn set_return_value<R: Any + Send>(&mut self, value: R) {
        self.return_value = Some(Box::new(value));
    }

    fn advance(&mut self) -> usize {
        let position = self.cursor;
        self.cursor = self.cursor.saturating_add(1);
        position
    }

    pub(crate) fn into_return<R: Any>(mut self) -> Result<R, InvocationError> {
        match self.return_value.take() {
            Some(value) => value
                .downcast::<R>()
                .map(|value| *value)
                .map_err(|_| InvocationError::ReturnTypeMismatch {
                    method: self.method.to_string(),
                }),
            None => Err(InvocationError::Vetoed {
                method: self.method.to_string(),
            }),
        }
    }
}

/// Synchronous call travelling through a chain
pub struct Invocation<'a> {
    frame: CallFrame,
    interceptors: &'a [Arc<dyn Interceptor>],
    terminal: Option<SyncTerminal<'a>>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        method: MethodRef,
        args: Vec<Value>,
        interceptors: &'a [Arc<dyn Interceptor>],
        terminal: SyncTerminal<'a>,
    ) -> Self {
        Self {
            frame: CallFrame::new(method, args),
            interceptors,
            terminal: Some(terminal),
        }
    }

    /// Run the next link: the next interceptor, or the terminal call once all
    /// interceptors have been entered. Calls past the terminal do nothing.
    pub fn proceed(&mut self) -> Result<(), InvocationError> {
        let position = self.frame.advance();
        let interceptors = self.interceptors;

        match position.cmp(&interceptors.len()) {
            Ordering::Greater => {
                debug!(method = %self.frame.method, position, "Proceed past terminal ignored");
                Ok(())
            }
            Ordering::Equal => {
                if let Some(terminal) = self.terminal.take() {
                    debug!(method = %self.frame.method, "Invoking terminal");
                    self.frame.return_value = Some(terminal()?);
                }
                Ok(())
            }
            Ordering::Less => {
                let interceptor = &interceptors[position];
                debug!(
                    method = %self.frame.method,
                    interceptor = interceptor.name(),
                    position,
                    "Entering interceptor"
                );
                interceptor.intercept(self)
            }
        }
    }

    pub(crate) fn into_frame(self) -> CallFrame {
        self.frame
    }
}

impl Deref for Invocation<'_> {
    type Target = CallFrame;

    fn deref(&self) -> &CallFrame {
        &self.frame
    }
}

impl DerefMut for Invocation<'_> {
    fn deref_mut(&mut self) -> &mut CallFrame {
        &mut self.frame
    }
}

/// Asynchronous call travelling through a chain
pub struct AsyncInvocation<'a> {
    frame: CallFrame,
    interceptors: &'a [Arc<dyn Interceptor>],
    terminal: Option<AsyncTerminal<'a>>,
}

impl<'a> AsyncInvocation<'a> {
    pub(crate) fn new(
        method: MethodRef,
        args: Vec<Value>,
        interceptors: &'a [Arc<dyn Interceptor>],
        terminal: AsyncTerminal<'a>,
    ) -> Self {
        Self {
            frame: CallFrame::new(method, args),
            interceptors,
            terminal: Some(terminal),
        }
    }

    /// Async counterpart of [`Invocation::proceed`]. The terminal future is
    /// awaited before its value lands in the return slot.
    pub fn proceed(&mut self) -> BoxFuture<'_, Result<(), InvocationError>> {
        Box::pin(async move {
            let position = self.frame.advance();
            let interceptors = self.interceptors;

            match position.cmp(&interceptors.len()) {
                Ordering::Greater => {
                    debug!(method = %self.frame.method, position, "Proceed past terminal ignored");
                    Ok(())
                }
                Ordering::Equal => {
                    if let Some(terminal) = self.terminal.take() {
                        debug!(method = %self.frame.method, "Invoking terminal");
                        let value = terminal().await?;
                        self.frame.return_value = Some(value);
                    }
                    Ok(())
                }
                Ordering::Less => {
                    let interceptor = &interceptors[position];
                    debug!(
                        method = %self.frame.method,
                        interceptor = interceptor.name(),
                        position,
                        "Entering interceptor"
                    );
                    interceptor.intercept_async(self).await
                }
            }
        })
    }

    pub(crate) fn into_frame(self) -> CallFrame {
        self.frame
    }
}

impl Deref for AsyncInvocation<'_> {
    type Target = CallFrame;

    fn deref(&self) -> &CallFrame {
        &self.frame
    }
}

impl DerefMut for AsyncInvocation<'_> {
    fn deref_mut(&mut self) -> &mut CallFrame {
        &mut self.frame
    }
}
