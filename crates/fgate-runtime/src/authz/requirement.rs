use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::chain::{MethodId, MethodRef};

/// How multiple permission decisions fold into one pass/fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// At least one permission must be granted
    #[default]
    Or,
    /// Every permission must be granted
    And,
}

impl Combinator {
    /// Fold decisions. An empty decision list never satisfies.
    pub fn is_satisfied(self, decisions: &[bool]) -> bool {
        match self {
            Combinator::Or => decisions.iter().any(|granted| *granted),
            Combinator::And => !decisions.is_empty() && decisions.iter().all(|granted| *granted),
        }
    }
}

/// Permissions a caller needs on a resource before a method may run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequirement {
    pub resource: String,
    pub permissions: Vec<String>,
    #[serde(default)]
    pub combinator: Combinator,
}

impl PermissionRequirement {
    pub fn new<I, P>(resource: impl Into<String>, permissions: I, combinator: Combinator) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            resource: resource.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            combinator,
        }
    }

    /// Satisfied when any of the permissions is granted
    pub fn any_of<I, P>(resource: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(resource, permissions, Combinator::Or)
    }

    /// Satisfied when all of the permissions are granted
    pub fn all_of<I, P>(resource: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(resource, permissions, Combinator::And)
    }
}

/// Requirements of one service pair, keyed by method identity.
/// Built when the pair is registered, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    entries: HashMap<MethodId, PermissionRequirement>,
    methods: HashSet<MethodId>,
}

impl PermissionTable {
    pub(crate) fn insert(&mut self, method: MethodId, requirement: PermissionRequirement) {
        self.entries.insert(method, requirement);
    }

    pub(crate) fn declare_method(&mut self, method: MethodId) {
        self.methods.insert(method);
    }

    /// Whether both sides of `method` are part of the registered surfaces
    pub fn declares(&self, method: &MethodRef) -> bool {
        self.methods.contains(&method.interface) && self.methods.contains(&method.implementation)
    }

    /// Requirement attached to the interface method, else to the implementation method
    pub fn lookup(&self, method: &MethodRef) -> Option<&PermissionRequirement> {
        self.entries
            .get(&method.interface)
            .or_else(|| self.entries.get(&method.implementation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_combinator() {
        assert!(Combinator::Or.is_satisfied(&[false, false, true]));
        assert!(!Combinator::Or.is_satisfied(&[false, false, false]));
        assert!(!Combinator::Or.is_satisfied(&[]));
    }

    #[test]
    fn test_and_combinator() {
        assert!(Combinator::And.is_satisfied(&[true, true, true]));
        assert!(!Combinator::And.is_satisfied(&[true, true, false]));
        assert!(!Combinator::And.is_satisfied(&[]));
    }

    #[test]
    fn test_requirement_deserializes_with_default_combinator() {
        let requirement: PermissionRequirement =
            serde_json::from_str(r#"{"resource": "doc1", "permissions": ["reader"]}"#).unwrap();
        assert_eq!(requirement, PermissionRequirement::any_of("doc1", ["reader"]));

        let requirement: PermissionRequirement = serde_json::from_str(
            r#"{"resource": "doc1", "permissions": ["reader", "owner"], "combinator": "and"}"#,
        )
        .unwrap();
        assert_eq!(requirement.combinator, Combinator::And);
    }

    #[test]
    fn test_lookup_prefers_interface_method() {
        let method = MethodRef::new(
            MethodId::new("Documents", "read"),
            MethodId::new("DocumentStore", "read"),
        );
        let mut table = PermissionTable::default();
        table.insert(
            method.implementation,
            PermissionRequirement::any_of("doc1", ["owner"]),
        );
        assert_eq!(table.lookup(&method).unwrap().permissions, vec!["owner"]);

        table.insert(
            method.interface,
            PermissionRequirement::any_of("doc1", ["reader"]),
        );
        assert_eq!(table.lookup(&method).unwrap().permissions, vec!["reader"]);
    }

    #[test]
    fn test_declares_needs_both_sides() {
        let method = MethodRef::new(
            MethodId::new("Documents", "read"),
            MethodId::new("DocumentStore", "read"),
        );
        let mut table = PermissionTable::default();
        assert!(!table.declares(&method));

        table.declare_method(method.interface);
        assert!(!table.declares(&method));

        table.declare_method(method.implementation);
        assert!(table.declares(&method));
    }
}
