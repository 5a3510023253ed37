//! `SECURITY LABEL FOR <policy> ON <object> IS <label>`.

use anon_core::{ObjectRef, PolicyName, Principal};
use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::registry::PolicyRegistry;
use crate::store::LabelStore;

/// A label command, as parsed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityLabelCommand {
    pub policy: PolicyName,
    pub object: ObjectRef,
    /// `None` for `IS NULL`.
    pub label: Option<String>,
}

impl SecurityLabelCommand {
    pub fn new(policy: PolicyName, object: ObjectRef, label: Option<impl Into<String>>) -> Self {
        Self {
            policy,
            object,
            label: label.map(Into::into),
        }
    }

    /// Validate the label with the policy's provider, then store it.
    ///
    /// The store is left untouched when validation fails.
    pub fn execute<S: LabelStore + ?Sized>(
        &self,
        registry: &PolicyRegistry,
        store: &S,
        principal: &Principal,
    ) -> Result<(), LabelError> {
        self.validate(registry, principal)?;
        self.apply(store);
        Ok(())
    }

    /// Check the label against the provider registered for the policy.
    pub fn validate(&self, registry: &PolicyRegistry, principal: &Principal) -> Result<(), LabelError> {
        let validator = registry
            .validator(&self.policy)
            .ok_or_else(|| LabelError::ProviderNotLoaded(self.policy.to_string()))?;

        validator.validate(&self.object, self.label.as_deref(), principal)
    }

    /// Store the label without validating it.
    pub fn apply<S: LabelStore + ?Sized>(&self, store: &S) {
        store.put_label(&self.object, &self.policy, self.label.as_deref());
        tracing::info!(
            policy = %self.policy,
            object = %self.object,
            removed = self.label.is_none(),
            "Security label stored"
        );
    }
}
