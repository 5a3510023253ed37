//! Masking policy resolution.
//!
//! A role is exempt from a policy only when it carries exactly the label
//! `MASKED` under that policy. Any other state, including no label at all,
//! means the policy applies. The first applicable policy in configuration
//! order wins.

use anon_core::{AnonConfig, ObjectRef, PolicyList, PolicyName, RoleId};

use crate::store::LabelStore;

/// Role label that exempts the role from a policy. Compared case-sensitively.
pub const MASKED_MARKER: &str = "MASKED";

/// Resolves which policy masks a role. Read-only over the label store.
pub struct PolicyResolver<'a, S: LabelStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LabelStore + ?Sized> PolicyResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// True when `policy` applies to `role`.
    ///
    /// Note the inversion: a role labelled exactly `MASKED` under `policy`
    /// returns `false` here, every other role (labelled otherwise or not
    /// labelled) returns `true`.
    pub fn is_masked_under_policy(&self, role: RoleId, policy: &PolicyName) -> bool {
        let label = self.store.get_label(&ObjectRef::from(role), policy);
        label.as_deref() != Some(MASKED_MARKER)
    }

    /// The first policy of `policies` that applies to `role`.
    pub fn resolve(&self, role: RoleId, policies: &PolicyList) -> Option<PolicyName> {
        let policy = self.resolve_for_role(role, policies);
        match &policy {
            Some(p) => tracing::debug!(role = %role, policy = %p, "Masking policy resolved"),
            None => tracing::debug!(role = %role, "No masking policy applies"),
        }
        policy
    }

    // TODO: also walk the roles `role` is a member of once the host exposes
    // role membership; only the role itself is considered today.
    fn resolve_for_role(&self, role: RoleId, policies: &PolicyList) -> Option<PolicyName> {
        policies
            .iter()
            .find(|policy| self.is_masked_under_policy(role, policy))
            .cloned()
    }
}

/// The configured masking policies, in resolution order.
pub fn list_masking_policies(config: &AnonConfig) -> Vec<String> {
    config
        .policy_list()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect()
}
