//! Proxy registry: service pairs, their interceptor chains and proxies.

pub mod registry;
pub mod surface;

pub use registry::{
    InterceptorFactory, ProxyRegistry, ProxyTarget, RegistryBuilder, ServiceDescriptor, Shared,
};
pub use surface::{PermissionDeclarations, ServiceSurface};
