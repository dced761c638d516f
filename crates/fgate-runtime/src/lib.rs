pub mod authz;
mod blocking;
pub mod chain;
pub mod config;
pub mod error;
pub mod oracle;
pub mod proxy;
pub mod session;

pub use authz::{
    AccessDecision, AccessSpecification, AuthorizationInterceptor,
    AuthorizationInterceptorFactory, Combinator, DecisionService, PermissionRequirement,
    PermissionTable,
};
pub use chain::{AsyncInvocation, CallFrame, Chain, Interceptor, Invocation, MethodId, MethodRef};
pub use config::{AuthorizationConfig, OracleConfig, OracleKind};
pub use error::{ConfigError, InvocationError};
pub use oracle::{BatchCheckItem, BatchCheckResult, OracleClient, TupleKey};
pub use proxy::{
    InterceptorFactory, PermissionDeclarations, ProxyRegistry, ProxyTarget, RegistryBuilder,
    ServiceDescriptor, ServiceSurface, Shared,
};
pub use session::{SessionIdentitySource, SessionInfo, TaskSession};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
