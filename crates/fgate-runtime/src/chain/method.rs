use std::fmt;

/// Identity of one method on one type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    pub owner: &'static str,
    pub name: &'static str,
}

impl MethodId {
    pub const fn new(owner: &'static str, name: &'static str) -> Self {
        Self { owner, name }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// The invoked method as seen from the interface and from the implementation.
/// Permission metadata may be attached to either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub interface: MethodId,
    pub implementation: MethodId,
}

impl MethodRef {
    pub const fn new(interface: MethodId, implementation: MethodId) -> Self {
        Self {
            interface,
            implementation,
        }
    }

    /// Method name as declared on the interface
    pub fn name(&self) -> &'static str {
        self.interface.name
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.interface, f)
    }
}
