//! SQL-callable functions.
//!
//! | SQL                                          | Rust                        |
//! |----------------------------------------------|-----------------------------|
//! | `anon.get_function_schema(text)`             | [`get_function_schema`]     |
//! | `anon.get_masking_policy(oid)`               | [`get_masking_policy`]      |
//! | `anon.register_label_provider(text)`         | [`register_label_provider`] |
//! | `anon.list_masking_policies()`               | [`list_masking_policies`]   |
//!
//! `anon.init_masking_policies()` writes labels, so it lives on
//! [`MaskingExtension::init_masking_policies`](crate::MaskingExtension::init_masking_policies).
//!
//! SQL `NULL` arguments map to `None`.

use anon_core::{AnonConfig, PolicyName, Principal, RoleId};
use anon_policy::{LabelStore, PolicyRegistry, PolicyResolver};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// The calling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
}

impl Session {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    /// The session role.
    pub fn role(&self) -> RoleId {
        self.principal.role
    }
}

/// Schema of a function call, `""` when unqualified.
pub fn get_function_schema(call: Option<&str>) -> Result<Option<String>, RuntimeError> {
    Ok(anon_sql::extract_schema(call)?)
}

/// The policy masking `role`, or the session role when `role` is `None`.
pub fn get_masking_policy<S: LabelStore + ?Sized>(
    role: Option<RoleId>,
    session: &Session,
    config: &AnonConfig,
    store: &S,
) -> Option<String> {
    let role = role.unwrap_or_else(|| session.role());
    PolicyResolver::new(store)
        .resolve(role, &config.policy_list())
        .map(String::from)
}

/// Register a label provider for `name`. Returns `true` once it is registered.
pub fn register_label_provider(
    registry: &mut PolicyRegistry,
    name: Option<&str>,
) -> Result<Option<bool>, RuntimeError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let policy =
        PolicyName::new(name).map_err(|_| RuntimeError::InvalidPolicyName(name.to_string()))?;
    registry.register(policy);
    Ok(Some(true))
}

/// The configured masking policies, in resolution order.
pub fn list_masking_policies(config: &AnonConfig) -> Vec<String> {
    anon_policy::list_masking_policies(config)
}
