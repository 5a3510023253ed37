//! The loaded extension.

use anon_core::{AnonConfig, ConfigKey, ObjectRef, Principal, RoleId};
use anon_policy::{GrammarMode, LabelStore, LabelTarget, PolicyRegistry, SecurityLabelCommand};
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::functions::{self, Session};
use crate::hook::{AnalyzeContext, AnalyzedQuery, HookChain, MaskingHook};
use crate::trusted::{SchemaCatalog, TrustedSchemaGuard};

/// Schema holding the extension's own masking functions.
pub const ANON_SCHEMA: &str = "anon";

/// Extension state shared by every session.
///
/// Settings are held as an immutable snapshot. A setting change builds a new
/// snapshot and swaps it in, so statements analyzed earlier keep the snapshot
/// they started with.
pub struct MaskingExtension {
    config: Arc<AnonConfig>,
    registry: PolicyRegistry,
    store: Arc<dyn LabelStore>,
    catalog: Arc<dyn SchemaCatalog>,
}

impl MaskingExtension {
    /// Load the extension: registers a label provider per configured policy.
    pub fn new(
        config: AnonConfig,
        store: Arc<dyn LabelStore>,
        catalog: Arc<dyn SchemaCatalog>,
    ) -> Self {
        let mut registry = PolicyRegistry::for_config(&config);
        let policies = registry.apply_config(&config.masking_policies);
        tracing::info!(
            policies = policies.len(),
            transparent_dynamic_masking = config.transparent_dynamic_masking,
            "anon extension loaded"
        );
        Self {
            config: Arc::new(config),
            registry,
            store,
            catalog,
        }
    }

    /// Current settings snapshot.
    pub fn config(&self) -> Arc<AnonConfig> {
        Arc::clone(&self.config)
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn LabelStore {
        self.store.as_ref()
    }

    /// Swap in a new settings snapshot.
    ///
    /// Newly listed policies get a provider; providers of policies no longer
    /// listed stay registered.
    pub fn reconfigure(&mut self, config: AnonConfig) {
        let mode = if config.strict_column_labels {
            GrammarMode::Strict
        } else {
            GrammarMode::Compatible
        };
        self.registry.set_grammar_mode(mode);
        let policies = self.registry.apply_config(&config.masking_policies);
        tracing::info!(policies = policies.len(), "anon settings changed");
        self.config = Arc::new(config);
    }

    /// `SET anon.<key> = <value>`.
    pub fn set(
        &mut self,
        key: ConfigKey,
        value: &str,
        principal: &Principal,
    ) -> Result<(), RuntimeError> {
        let next = self.config.with_setting(key, value, principal)?;
        self.reconfigure(next);
        Ok(())
    }

    /// `SHOW anon.<key>`.
    pub fn show(&self, key: ConfigKey, principal: &Principal) -> Result<String, RuntimeError> {
        Ok(self.config.show(key, principal)?)
    }

    /// Validate and store a security label.
    ///
    /// Column labels also go through the trusted schema guard when
    /// `restrict_to_trusted_schemas` is on. Nothing is stored on error.
    pub fn security_label(
        &self,
        command: &SecurityLabelCommand,
        principal: &Principal,
    ) -> Result<(), RuntimeError> {
        command.validate(&self.registry, principal)?;

        let is_column = LabelTarget::of(&command.object) == Some(LabelTarget::Column);
        if self.config.restrict_to_trusted_schemas && is_column {
            if let Some(label) = command.label.as_deref() {
                TrustedSchemaGuard::new(self.catalog.as_ref(), self.store.as_ref())
                    .check(&command.policy, label)?;
            }
        }

        command.apply(self.store.as_ref());
        Ok(())
    }

    /// Label the `anon` schema `TRUSTED` under every configured policy.
    ///
    /// Runs after the extension is created, as a superuser. Labels go through
    /// [`MaskingExtension::security_label`] so nothing bypasses the grammar.
    pub fn init_masking_policies(&self, principal: &Principal) -> Result<bool, RuntimeError> {
        let schema_id = self
            .catalog
            .schema_id(ANON_SCHEMA)
            .ok_or_else(|| RuntimeError::UnknownSchema(ANON_SCHEMA.to_string()))?;

        let policies = self.config.policy_list();
        for policy in &policies {
            let command = SecurityLabelCommand::new(
                policy.clone(),
                ObjectRef::schema(schema_id),
                Some("TRUSTED"),
            );
            self.security_label(&command, principal)?;
        }
        tracing::info!(
            schema = ANON_SCHEMA,
            policies = policies.len(),
            "masking policies initialized"
        );
        Ok(true)
    }

    /// Observers to install in the host's post-analysis hook.
    pub fn hook_chain(&self) -> HookChain {
        let mut chain = HookChain::new();
        chain.register(Arc::new(MaskingHook::new(Arc::clone(&self.store))));
        chain
    }

    /// Run the hook chain over every statement of `sql`.
    pub fn analyze(&self, session: &Session, sql: &str) -> Result<Vec<AnalyzedQuery>, RuntimeError> {
        let ctx = AnalyzeContext::new(session.principal, self.config());
        let chain = self.hook_chain();
        AnalyzedQuery::from_sql(sql)?
            .into_iter()
            .map(|query| chain.dispatch(&ctx, query))
            .collect()
    }

    pub fn get_function_schema(&self, call: Option<&str>) -> Result<Option<String>, RuntimeError> {
        functions::get_function_schema(call)
    }

    pub fn get_masking_policy(&self, role: Option<RoleId>, session: &Session) -> Option<String> {
        functions::get_masking_policy(role, session, &self.config, self.store.as_ref())
    }

    pub fn register_label_provider(
        &mut self,
        name: Option<&str>,
    ) -> Result<Option<bool>, RuntimeError> {
        functions::register_label_provider(&mut self.registry, name)
    }

    pub fn list_masking_policies(&self) -> Vec<String> {
        functions::list_masking_policies(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trusted::InMemorySchemaCatalog;
    use anon_core::{ObjectRef, PolicyName};
    use anon_policy::InMemoryLabelStore;

    fn extension(config: AnonConfig) -> MaskingExtension {
        MaskingExtension::new(
            config,
            Arc::new(InMemoryLabelStore::new()),
            Arc::new(InMemorySchemaCatalog::new()),
        )
    }

    fn admin() -> Principal {
        Principal::superuser(RoleId(10))
    }

    #[test]
    fn loading_registers_configured_policies() {
        let ext = extension(AnonConfig {
            masking_policies: "anon,gdpr".to_string(),
            ..AnonConfig::default()
        });
        assert!(ext.registry().is_registered(&PolicyName::new("gdpr").unwrap()));
        assert_eq!(ext.list_masking_policies(), vec!["anon", "gdpr"]);
    }

    #[test]
    fn setting_policies_registers_providers() {
        let mut ext = extension(AnonConfig::default());
        let before = ext.config();
        ext.set(ConfigKey::MaskingPolicies, "gdpr", &admin()).unwrap();

        assert!(ext.registry().is_registered(&PolicyName::new("anon").unwrap()));
        assert!(ext.registry().is_registered(&PolicyName::new("gdpr").unwrap()));
        // earlier snapshots are left alone
        assert_eq!(before.masking_policies, "anon");
        assert_eq!(ext.config().masking_policies, "gdpr");
    }

    #[test]
    fn privileged_setting_needs_superuser() {
        let mut ext = extension(AnonConfig::default());
        let err = ext
            .set(ConfigKey::Salt, "pepper", &Principal::new(RoleId(20)))
            .unwrap_err();
        assert_eq!(err.sqlstate(), "42501");
        assert_eq!(ext.show(ConfigKey::Salt, &admin()).unwrap(), "");
    }

    #[test]
    fn strict_setting_changes_the_grammar() {
        let mut ext = extension(AnonConfig::default());
        ext.set(ConfigKey::StrictColumnLabels, "on", &admin()).unwrap();
        let cmd = SecurityLabelCommand::new(
            PolicyName::new("anon").unwrap(),
            ObjectRef::column(1, 1),
            Some("MASKED WITH VALUE 'a;b'"),
        );
        assert!(matches!(
            ext.security_label(&cmd, &admin()),
            Err(RuntimeError::Label(_))
        ));
    }

    #[test]
    fn security_label_stores_valid_labels() {
        let ext = extension(AnonConfig::default());
        let cmd = SecurityLabelCommand::new(
            PolicyName::new("anon").unwrap(),
            ObjectRef::role(20),
            Some("MASKED"),
        );
        ext.security_label(&cmd, &admin()).unwrap();
        assert_eq!(ext.get_masking_policy(Some(RoleId(20)), &Session::new(admin())), None);
    }

    #[test]
    fn analyze_is_noop_without_dynamic_masking() {
        let ext = extension(AnonConfig::default());
        let session = Session::new(Principal::new(RoleId(20)));
        let queries = ext.analyze(&session, "SELECT * FROM people").unwrap();
        assert_eq!(queries.len(), 1);
    }
}
