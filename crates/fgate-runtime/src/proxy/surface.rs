use std::collections::HashMap;

use crate::authz::{PermissionRequirement, PermissionTable};
use crate::chain::{MethodId, MethodRef};
use crate::error::ConfigError;

/// Method surface of a proxied interface (implemented for `dyn Trait`) or of
/// a concrete implementation type.
pub trait ServiceSurface: 'static {
    /// Type name used in method identities and logs
    const NAME: &'static str;

    /// Methods callable through a proxy
    const METHODS: &'static [&'static str];

    /// Attach permission requirements to methods of this surface
    fn declare_permissions(_permissions: &mut PermissionDeclarations) {}
}

/// Permission requirements declared by one surface
#[derive(Debug, Default)]
pub struct PermissionDeclarations {
    entries: Vec<(&'static str, PermissionRequirement)>,
}

impl PermissionDeclarations {
    pub fn require(
        &mut self,
        method: &'static str,
        requirement: PermissionRequirement,
    ) -> &mut Self {
        self.entries.push((method, requirement));
        self
    }
}

impl MethodRef {
    /// Identity of `method` on interface `I` as implemented by `T`
    pub fn of<I, T>(method: &'static str) -> Self
    where
        I: ServiceSurface + ?Sized,
        T: ServiceSurface,
    {
        Self::new(MethodId::new(I::NAME, method), MethodId::new(T::NAME, method))
    }
}

fn collect<S: ServiceSurface + ?Sized>(
) -> Result<HashMap<&'static str, PermissionRequirement>, ConfigError> {
    let mut declarations = PermissionDeclarations::default();
    S::declare_permissions(&mut declarations);

    let mut collected = HashMap::new();
    for (method, requirement) in declarations.entries {
        if !S::METHODS.contains(&method) {
            return Err(ConfigError::UnknownMethod {
                owner: S::NAME,
                method,
            });
        }
        if requirement.permissions.is_empty() {
            return Err(ConfigError::EmptyPermissions {
                owner: S::NAME,
                method,
            });
        }
        if collected.insert(method, requirement).is_some() {
            return Err(ConfigError::AmbiguousRequirement {
                interface: S::NAME,
                implementation: S::NAME,
                method,
            });
        }
    }
    Ok(collected)
}

/// Merge the declarations of interface `I` and implementation `T` into one table.
/// A method may carry a requirement on either side; conflicting ones are rejected.
pub(crate) fn resolve_permissions<I, T>() -> Result<PermissionTable, ConfigError>
where
    I: ServiceSurface + ?Sized,
    T: ServiceSurface,
{
    let interface = collect::<I>()?;
    let implementation = collect::<T>()?;

    let mut table = PermissionTable::default();
    for method in I::METHODS {
        table.declare_method(MethodId::new(I::NAME, *method));
    }
    for method in T::METHODS {
        table.declare_method(MethodId::new(T::NAME, *method));
    }
    for (method, requirement) in implementation {
        if let Some(declared) = interface.get(method) {
            if *declared != requirement {
                return Err(ConfigError::AmbiguousRequirement {
                    interface: I::NAME,
                    implementation: T::NAME,
                    method,
                });
            }
        }
        table.insert(MethodId::new(T::NAME, method), requirement);
    }
    for (method, requirement) in interface {
        table.insert(MethodId::new(I::NAME, method), requirement);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Ledger {}

    impl ServiceSurface for dyn Ledger {
        const NAME: &'static str = "Ledger";
        const METHODS: &'static [&'static str] = &["balance", "transfer"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require(
                "transfer",
                PermissionRequirement::all_of("ledger", ["writer", "approver"]),
            );
        }
    }

    struct PlainLedger;

    impl ServiceSurface for PlainLedger {
        const NAME: &'static str = "PlainLedger";
        const METHODS: &'static [&'static str] = &["balance", "transfer"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require("balance", PermissionRequirement::any_of("ledger", ["reader"]));
        }
    }

    struct ConflictingLedger;

    impl ServiceSurface for ConflictingLedger {
        const NAME: &'static str = "ConflictingLedger";
        const METHODS: &'static [&'static str] = &["balance", "transfer"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require("transfer", PermissionRequirement::any_of("ledger", ["owner"]));
        }
    }

    struct TypoLedger;

    impl ServiceSurface for TypoLedger {
        const NAME: &'static str = "TypoLedger";
        const METHODS: &'static [&'static str] = &["balance"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require("balanse", PermissionRequirement::any_of("ledger", ["reader"]));
        }
    }

    struct EmptyLedger;

    impl ServiceSurface for EmptyLedger {
        const NAME: &'static str = "EmptyLedger";
        const METHODS: &'static [&'static str] = &["balance"];

        fn declare_permissions(permissions: &mut PermissionDeclarations) {
            permissions.require(
                "balance",
                PermissionRequirement::any_of("ledger", Vec::<String>::new()),
            );
        }
    }

    #[test]
    fn test_requirements_from_both_sides() {
        let table = resolve_permissions::<dyn Ledger, PlainLedger>().unwrap();
        assert_eq!(table.len(), 2);

        let balance = MethodRef::of::<dyn Ledger, PlainLedger>("balance");
        let transfer = MethodRef::of::<dyn Ledger, PlainLedger>("transfer");
        assert_eq!(table.lookup(&balance).unwrap().permissions, vec!["reader"]);
        assert_eq!(
            table.lookup(&transfer).unwrap().permissions,
            vec!["writer", "approver"]
        );
        assert!(table.declares(&balance));
        assert!(!table.declares(&MethodRef::of::<dyn Ledger, PlainLedger>("Balance")));
    }

    #[test]
    fn test_conflicting_requirements_rejected() {
        let err = resolve_permissions::<dyn Ledger, ConflictingLedger>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousRequirement {
                interface: "Ledger",
                implementation: "ConflictingLedger",
                method: "transfer",
            }
        );
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = resolve_permissions::<dyn Ledger, TypoLedger>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMethod { method: "balanse", .. }));
    }

    #[test]
    fn test_empty_permission_set_rejected() {
        let err = resolve_permissions::<dyn Ledger, EmptyLedger>().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPermissions { .. }));
    }
}
