//! # anon-core
//!
//! Types shared by every anon crate:
//!
//! - [`ObjectKind`] / [`ObjectRef`]: the catalog object a security label is attached to
//! - [`PolicyName`] / [`PolicyList`]: masking policies, in resolution order
//! - [`RoleId`] / [`Principal`]: who is asking
//! - [`AnonConfig`]: an immutable snapshot of the extension settings

pub mod config;
pub mod object;
pub mod policy;

pub use config::{AnonConfig, ConfigError, ConfigKey};
pub use object::{ObjectKind, ObjectRef};
pub use policy::{ParsedPolicyList, PolicyList, PolicyName, PolicyNameError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a database role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u32);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RoleId> for ObjectRef {
    fn from(role: RoleId) -> Self {
        ObjectRef::role(role.0)
    }
}

/// The role issuing a command, with its privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub role: RoleId,
    #[serde(default)]
    pub superuser: bool,
}

impl Principal {
    /// A regular, unprivileged role.
    pub fn new(role: RoleId) -> Self {
        Self {
            role,
            superuser: false,
        }
    }

    /// A superuser-equivalent role.
    pub fn superuser(role: RoleId) -> Self {
        Self {
            role,
            superuser: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_converts_into_role_object() {
        let object: ObjectRef = RoleId(16384).into();
        assert_eq!(object.kind, ObjectKind::Role);
        assert_eq!(object.object_id, 16384);
        assert!(!object.has_sub_object());
    }

    #[test]
    fn principal_constructors() {
        assert!(!Principal::new(RoleId(10)).superuser);
        assert!(Principal::superuser(RoleId(10)).superuser);
    }
}
