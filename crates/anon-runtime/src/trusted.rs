//! Trusted schema guard.
//!
//! With `anon.restrict_to_trusted_schemas` on, a column may only be masked
//! with a function from a schema labelled `TRUSTED` under the same policy.
//! Schema-qualified calls nested in its arguments must come from trusted
//! schemas too. Unqualified nested calls resolve through the host search path.

use anon_core::{ObjectRef, PolicyName};
use anon_policy::{ColumnRule, LabelStore};
use anon_sql::FunctionCallAnalyzer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RuntimeError;

const MASKED_WITH_FUNCTION: &str = "MASKED WITH FUNCTION";

/// Resolves schema names to object ids.
pub trait SchemaCatalog: Send + Sync {
    fn schema_id(&self, name: &str) -> Option<u32>;
}

/// Schema catalog kept in memory, keyed by exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemorySchemaCatalog {
    schemas: BTreeMap<String, u32>,
}

impl InMemorySchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: u32) {
        self.schemas.insert(name.into(), id);
    }
}

impl FromIterator<(String, u32)> for InMemorySchemaCatalog {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            schemas: iter.into_iter().collect(),
        }
    }
}

impl SchemaCatalog for InMemorySchemaCatalog {
    fn schema_id(&self, name: &str) -> Option<u32> {
        self.schemas.get(name).copied()
    }
}

/// Checks `MASKED WITH FUNCTION` column labels against schema labels.
pub struct TrustedSchemaGuard<'a> {
    catalog: &'a dyn SchemaCatalog,
    store: &'a dyn LabelStore,
}

impl<'a> TrustedSchemaGuard<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog, store: &'a dyn LabelStore) -> Self {
        Self { catalog, store }
    }

    /// Accept `label` unless it masks with a function outside a trusted schema.
    pub fn check(&self, policy: &PolicyName, label: &str) -> Result<(), RuntimeError> {
        let Some(call) = masking_function(label) else {
            return Ok(());
        };

        let called = FunctionCallAnalyzer::new().called_functions(&call)?;
        let Some((outer, nested)) = called.split_first() else {
            return Ok(());
        };

        if outer.schema.is_empty() {
            return Err(RuntimeError::UnqualifiedFunction { function: call });
        }
        if !self.is_trusted(policy, &outer.schema) {
            return Err(RuntimeError::UntrustedFunction { function: call });
        }

        for function in nested.iter().filter(|f| !f.schema.is_empty()) {
            if !self.is_trusted(policy, &function.schema) {
                return Err(RuntimeError::UntrustedFunction {
                    function: function.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn is_trusted(&self, policy: &PolicyName, schema: &str) -> bool {
        let trusted = self
            .catalog
            .schema_id(schema)
            .and_then(|id| self.store.get_label(&ObjectRef::schema(id), policy))
            .is_some_and(|label| anon_policy::rule::is_trusted(&label));
        if !trusted {
            tracing::debug!(policy = %policy, schema, "masking function schema is not trusted");
        }
        trusted
    }
}

/// The function call of a `MASKED WITH FUNCTION` label.
fn masking_function(label: &str) -> Option<String> {
    match ColumnRule::parse(label) {
        Some(rule) => rule.function_call().map(str::to_string),
        // passed the keyword check without being well formed
        None => {
            let prefix = label.get(..MASKED_WITH_FUNCTION.len())?;
            prefix
                .eq_ignore_ascii_case(MASKED_WITH_FUNCTION)
                .then(|| label[MASKED_WITH_FUNCTION.len()..].trim().to_string())
        }
    }
}
