use thiserror::Error;

/// Failure surfaced at the chain boundary of a proxied call
#[derive(Debug, Error)]
pub enum InvocationError {
    /// No session identity was attached to a call that requires one
    #[error("user is not authenticated (method '{method}')")]
    Unauthenticated { method: String },

    /// The permission requirement of the method was not satisfied
    #[error("user '{user}' is not authorized for {permissions:?} on '{resource}' (method '{method}')")]
    Unauthorized {
        method: String,
        user: String,
        resource: String,
        permissions: Vec<String>,
    },

    /// The proxy named a method its registered surfaces do not declare
    #[error("method '{method}' is not declared by the proxied service")]
    UndeclaredMethod { method: String },

    /// An interceptor stopped the chain without leaving a return value
    #[error("call to '{method}' was stopped before producing a value")]
    Vetoed { method: String },

    /// The return slot holds a value of a different type than the method returns
    #[error("return value of '{method}' has an unexpected type")]
    ReturnTypeMismatch { method: String },

    /// Error raised by the service implementation or an interceptor
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

impl InvocationError {
    /// Status code a request boundary should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::Unauthorized { .. } => 403,
            _ => 500,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated { .. } | Self::Unauthorized { .. }
        )
    }
}

/// Wiring mistakes detected while building or installing the proxy registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{implementation}' is already registered for '{interface}'")]
    DuplicateRegistration {
        interface: &'static str,
        implementation: &'static str,
    },

    #[error("no registration for '{implementation}' as '{interface}'")]
    NotRegistered {
        interface: &'static str,
        implementation: &'static str,
    },

    #[error("method '{method}' carries different permission requirements on '{interface}' and '{implementation}'")]
    AmbiguousRequirement {
        interface: &'static str,
        implementation: &'static str,
        method: &'static str,
    },

    #[error("permission requirement declared for unknown method '{owner}::{method}'")]
    UnknownMethod {
        owner: &'static str,
        method: &'static str,
    },

    #[error("permission requirement on '{owner}::{method}' lists no permissions")]
    EmptyPermissions {
        owner: &'static str,
        method: &'static str,
    },

    #[error("proxy registry is already installed")]
    AlreadyInstalled,
}
