//! Post-analysis query hooks.
//!
//! The host runs every registered [`QueryObserver`] once a statement has been
//! analyzed, in registration order. Each observer receives the output of the
//! previous one; the first error aborts the statement.

use anon_core::{AnonConfig, Principal};
use anon_policy::{LabelStore, PolicyResolver};
use anon_sql::{CommandKind, StatementClassifier, UtilityKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::rewrite;

/// A statement after parse analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedQuery {
    pub sql: String,
    pub command: CommandKind,
}

impl AnalyzedQuery {
    pub fn new(sql: impl Into<String>, command: CommandKind) -> Self {
        Self {
            sql: sql.into(),
            command,
        }
    }

    /// Analyze a query string, one entry per statement.
    pub fn from_sql(sql: &str) -> Result<Vec<Self>, RuntimeError> {
        let classifier = StatementClassifier::new();
        let statements = classifier.parse(sql)?;
        Ok(statements
            .iter()
            .map(|stmt| Self::new(stmt.to_string(), classifier.command_kind(stmt)))
            .collect())
    }
}

/// What an observer knows about the statement's session.
#[derive(Debug, Clone)]
pub struct AnalyzeContext {
    pub principal: Principal,
    /// Settings in effect when the statement was analyzed.
    pub config: Arc<AnonConfig>,
}

impl AnalyzeContext {
    pub fn new(principal: Principal, config: Arc<AnonConfig>) -> Self {
        Self { principal, config }
    }
}

/// A post-analysis hook.
pub trait QueryObserver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn on_post_analyze(
        &self,
        ctx: &AnalyzeContext,
        query: AnalyzedQuery,
    ) -> Result<AnalyzedQuery, RuntimeError>;
}

/// Ordered list of observers.
#[derive(Default, Clone)]
pub struct HookChain {
    observers: Vec<Arc<dyn QueryObserver>>,
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. It runs after every observer registered before it.
    pub fn register(&mut self, observer: Arc<dyn QueryObserver>) {
        tracing::debug!(observer = observer.name(), "Registering query observer");
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Run every observer over `query`.
    pub fn dispatch(
        &self,
        ctx: &AnalyzeContext,
        query: AnalyzedQuery,
    ) -> Result<AnalyzedQuery, RuntimeError> {
        self.observers.iter().try_fold(query, |query, observer| {
            observer.on_post_analyze(ctx, query).inspect_err(|e| {
                tracing::debug!(observer = observer.name(), error = %e, "Query rejected");
            })
        })
    }
}

/// Applies the masking policy of the session role.
///
/// A no-op unless `transparent_dynamic_masking` is on. For a role masked
/// under some policy, `EXPLAIN` and `TRUNCATE` are refused and every other
/// statement goes through [`rewrite::rewrite`].
pub struct MaskingHook {
    store: Arc<dyn LabelStore>,
}

impl MaskingHook {
    pub fn new(store: Arc<dyn LabelStore>) -> Self {
        Self { store }
    }
}

impl QueryObserver for MaskingHook {
    fn name(&self) -> &str {
        "masking"
    }

    fn on_post_analyze(
        &self,
        ctx: &AnalyzeContext,
        query: AnalyzedQuery,
    ) -> Result<AnalyzedQuery, RuntimeError> {
        if !ctx.config.transparent_dynamic_masking {
            return Ok(query);
        }

        let resolver = PolicyResolver::new(self.store.as_ref());
        let Some(policy) = resolver.resolve(ctx.principal.role, &ctx.config.policy_list()) else {
            return Ok(query);
        };

        match query.command {
            CommandKind::Utility(UtilityKind::Explain | UtilityKind::Truncate) => {
                tracing::info!(
                    role = %ctx.principal.role,
                    policy = %policy,
                    command = %query.command,
                    "Refusing utility command for masked role"
                );
                Err(RuntimeError::RoleIsMasked {
                    command: query.command,
                })
            }
            _ => rewrite::rewrite(query, &policy),
        }
    }
}
