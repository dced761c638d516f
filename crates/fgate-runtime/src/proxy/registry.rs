use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::info;

use super::surface::{resolve_permissions, ServiceSurface};
use crate::authz::PermissionTable;
use crate::chain::{Chain, Interceptor};
use crate::error::ConfigError;

static GLOBAL_REGISTRY: OnceLock<ProxyRegistry> = OnceLock::new();

/// Builds the interceptor instance a registration uses.
/// One factory serves any number of service pairs.
pub trait InterceptorFactory: Send + Sync {
    fn name(&self) -> &str;

    fn create(&self, service: &ServiceDescriptor) -> Arc<dyn Interceptor>;
}

/// Factory handing the same interceptor to every registration
pub struct Shared(pub Arc<dyn Interceptor>);

impl InterceptorFactory for Shared {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn create(&self, _service: &ServiceDescriptor) -> Arc<dyn Interceptor> {
        self.0.clone()
    }
}

/// Implementation type that has a proxy for interface `I`.
///
/// The proxy implements `I` and forwards every method through the chain it
/// is given, naming the call with [`crate::MethodRef::of`].
pub trait ProxyTarget<I: ServiceSurface + ?Sized>: ServiceSurface + Send + Sync + Sized {
    fn into_proxy(target: Arc<Self>, chain: Chain) -> Arc<I>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ServiceKey {
    interface: TypeId,
    implementation: TypeId,
}

impl ServiceKey {
    fn of<I: ServiceSurface + ?Sized, T: ServiceSurface>() -> Self {
        Self {
            interface: TypeId::of::<I>(),
            implementation: TypeId::of::<T>(),
        }
    }
}

/// What a registered service pair looks like to interceptor factories
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub interface: &'static str,
    pub implementation: &'static str,
    pub permissions: Arc<PermissionTable>,
}

struct Registration {
    descriptor: ServiceDescriptor,
    chain: Chain,
}

/// Collects registrations during startup wiring
#[derive(Default)]
pub struct RegistryBuilder {
    registrations: HashMap<ServiceKey, Registration>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register implementation `T` behind interface `I` with interceptors in
    /// execution order. Each pair may be registered once.
    pub fn register<I, T>(
        mut self,
        interceptors: Vec<Arc<dyn InterceptorFactory>>,
    ) -> Result<Self, ConfigError>
    where
        I: ServiceSurface + ?Sized,
        T: ServiceSurface,
    {
        let key = ServiceKey::of::<I, T>();
        if self.registrations.contains_key(&key) {
            return Err(ConfigError::DuplicateRegistration {
                interface: I::NAME,
                implementation: T::NAME,
            });
        }

        let descriptor = ServiceDescriptor {
            interface: I::NAME,
            implementation: T::NAME,
            permissions: Arc::new(resolve_permissions::<I, T>()?),
        };
        let chain = Chain::new(
            interceptors
                .iter()
                .map(|factory| factory.create(&descriptor))
                .collect(),
        );

        info!(
            interface = I::NAME,
            implementation = T::NAME,
            interceptors = ?chain.names(),
            guarded_methods = descriptor.permissions.len(),
            "Registered proxied service"
        );

        self.registrations
            .insert(key, Registration { descriptor, chain });
        Ok(self)
    }

    pub fn build(self) -> ProxyRegistry {
        ProxyRegistry {
            registrations: self.registrations,
        }
    }
}

/// Read-only table of registered service pairs, producing proxies on demand
pub struct ProxyRegistry {
    registrations: HashMap<ServiceKey, Registration>,
}

impl ProxyRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Make this registry the process-wide one. Allowed once.
    pub fn install(self) -> Result<&'static ProxyRegistry, ConfigError> {
        GLOBAL_REGISTRY
            .set(self)
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        let registry = GLOBAL_REGISTRY.get().ok_or(ConfigError::AlreadyInstalled)?;
        info!(services = registry.len(), "Proxy registry installed");
        Ok(registry)
    }

    /// The installed process-wide registry, if any
    pub fn global() -> Option<&'static ProxyRegistry> {
        GLOBAL_REGISTRY.get()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn descriptor<I, T>(&self) -> Option<&ServiceDescriptor>
    where
        I: ServiceSurface + ?Sized,
        T: ServiceSurface,
    {
        self.registrations
            .get(&ServiceKey::of::<I, T>())
            .map(|r| &r.descriptor)
    }

    /// Chain registered for the pair
    pub fn chain<I, T>(&self) -> Result<Chain, ConfigError>
    where
        I: ServiceSurface + ?Sized,
        T: ServiceSurface,
    {
        self.registrations
            .get(&ServiceKey::of::<I, T>())
            .map(|r| r.chain.clone())
            .ok_or(ConfigError::NotRegistered {
                interface: I::NAME,
                implementation: T::NAME,
            })
    }

    /// Wrap `target` in its proxy for interface `I`
    pub fn create<I, T>(&self, target: Arc<T>) -> Result<Arc<I>, ConfigError>
    where
        I: ServiceSurface + ?Sized,
        T: ProxyTarget<I>,
    {
        let chain = self.chain::<I, T>()?;
        Ok(T::into_proxy(target, chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::PermissionRequirement;
    use crate::chain::{Invocation, MethodRef};
    use crate::error::InvocationError;
    use crate::proxy::PermissionDeclarations;
    use async_trait::async_trait;
    use std::sync::Mutex;

    trait Counter: Send + Sync {
        fn add(&self, amount: u32) -> Result<u32, InvocationError>;
    }

    impl ServiceSurface for dyn Counter {
        const NAME: &'static str = "Counter";
        const METHODS: &'static [&'static str] = &["add"];
    }

    struct BaseCounter;

    impl ServiceSurface for BaseCounter {
        const NAME: &'static str = "BaseCounter";
        const METHODS: &'static [&'static str] = &["add"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require("add", PermissionRequirement::any_of("counter", ["writer"]));
        }
    }

    impl Counter for BaseCounter {
        fn add(&self, amount: u32) -> Result<u32, InvocationError> {
            Ok(amount + 1)
        }
    }

    struct CounterProxy {
        target: Arc<BaseCounter>,
        chain: Chain,
    }

    impl Counter for CounterProxy {
        fn add(&self, amount: u32) -> Result<u32, InvocationError> {
            self.chain.invoke(
                MethodRef::of::<dyn Counter, BaseCounter>("add"),
                vec![amount.into()],
                || self.target.add(amount),
            )
        }
    }

    impl ProxyTarget<dyn Counter> for BaseCounter {
        fn into_proxy(target: Arc<Self>, chain: Chain) -> Arc<dyn Counter> {
            Arc::new(CounterProxy { target, chain })
        }
    }

    /// Remembers which service pairs it was built for
    struct Tagging {
        seen: Arc<Mutex<Vec<String>>>,
    }

    struct Tag(String);

    #[async_trait]
    impl Interceptor for Tag {
        fn name(&self) -> &str {
            &self.0
        }
        fn intercept(&self, invocation: &mut Invocation<'_>) -> Result<(), InvocationError> {
            invocation.proceed()
        }
    }

    impl InterceptorFactory for Tagging {
        fn name(&self) -> &str {
            "tagging"
        }
        fn create(&self, service: &ServiceDescriptor) -> Arc<dyn Interceptor> {
            let tag = format!("{}->{}", service.interface, service.implementation);
            self.seen.lock().unwrap().push(tag.clone());
            Arc::new(Tag(tag))
        }
    }

    #[test]
    fn test_register_and_create_proxy() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = ProxyRegistry::builder()
            .register::<dyn Counter, BaseCounter>(vec![Arc::new(Tagging { seen: seen.clone() })])
            .unwrap()
            .build();

        let counter = registry
            .create::<dyn Counter, _>(Arc::new(BaseCounter))
            .unwrap();
        assert_eq!(counter.add(1).unwrap(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["Counter->BaseCounter"]);

        let descriptor = registry.descriptor::<dyn Counter, BaseCounter>().unwrap();
        assert_eq!(descriptor.permissions.len(), 1);
        assert_eq!(
            registry.chain::<dyn Counter, BaseCounter>().unwrap().names(),
            vec!["Counter->BaseCounter"]
        );
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let result = ProxyRegistry::builder()
            .register::<dyn Counter, BaseCounter>(vec![])
            .unwrap()
            .register::<dyn Counter, BaseCounter>(vec![]);
        assert_eq!(
            result.err(),
            Some(ConfigError::DuplicateRegistration {
                interface: "Counter",
                implementation: "BaseCounter",
            })
        );
    }

    #[test]
    fn test_unregistered_pair_fails() {
        let registry = ProxyRegistry::builder().build();
        let err = registry
            .create::<dyn Counter, _>(Arc::new(BaseCounter))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::NotRegistered { .. }));
    }

    #[test]
    fn test_install_once() {
        let first = ProxyRegistry::builder().build().install();
        let second = ProxyRegistry::builder().build().install();

        assert!(first.is_ok());
        assert_eq!(second.err(), Some(ConfigError::AlreadyInstalled));
        assert!(ProxyRegistry::global().is_some());
    }
}
