//! Label provider registry.
//!
//! Every configured masking policy is a label provider. Registering a policy
//! installs the [`LabelGrammar`] as the validator the host calls before it
//! stores a label under that policy name.

use anon_core::{AnonConfig, PolicyList, PolicyName};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::grammar::{GrammarMode, LabelGrammar, LabelValidator};

/// Policies currently known to the host, with their validators.
pub struct PolicyRegistry {
    grammar: LabelGrammar,
    providers: BTreeMap<PolicyName, Arc<dyn LabelValidator>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new(GrammarMode::default())
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("grammar", &self.grammar)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PolicyRegistry {
    /// An empty registry whose providers validate with `mode`.
    pub fn new(mode: GrammarMode) -> Self {
        Self {
            grammar: LabelGrammar::new(mode),
            providers: BTreeMap::new(),
        }
    }

    /// An empty registry set up from a configuration snapshot.
    pub fn for_config(config: &AnonConfig) -> Self {
        let mode = if config.strict_column_labels {
            GrammarMode::Strict
        } else {
            GrammarMode::Compatible
        };
        Self::new(mode)
    }

    /// Register every policy of a comma-separated setting.
    ///
    /// Called whenever `anon.masking_policies` changes. Returns the parsed
    /// list. Policies registered earlier stay registered.
    pub fn apply_config(&mut self, raw: &str) -> PolicyList {
        let parsed = PolicyList::parse(raw);
        if parsed.skipped > 0 {
            tracing::warn!(
                skipped = parsed.skipped,
                "Ignoring empty masking policy names in '{}'",
                raw
            );
        }
        for policy in &parsed.policies {
            self.register(policy.clone());
        }
        parsed.policies
    }

    /// Install the label grammar for `policy`.
    ///
    /// Returns `false` when the policy was already registered, in which case
    /// nothing changes.
    pub fn register(&mut self, policy: PolicyName) -> bool {
        if self.providers.contains_key(&policy) {
            tracing::debug!(policy = %policy, "Label provider already registered");
            return false;
        }
        tracing::info!(policy = %policy, "Registering label provider");
        self.providers.insert(policy, Arc::new(self.grammar));
        true
    }

    /// The validator installed for `policy`.
    pub fn validator(&self, policy: &PolicyName) -> Option<&dyn LabelValidator> {
        self.providers.get(policy).map(|v| v.as_ref())
    }

    pub fn is_registered(&self, policy: &PolicyName) -> bool {
        self.providers.contains_key(policy)
    }

    /// Registered policy names, sorted.
    pub fn policies(&self) -> Vec<&PolicyName> {
        self.providers.keys().collect()
    }

    pub fn grammar_mode(&self) -> GrammarMode {
        self.grammar.mode()
    }

    /// Switch every installed provider to `mode`.
    pub fn set_grammar_mode(&mut self, mode: GrammarMode) {
        if self.grammar.mode() == mode {
            return;
        }
        tracing::info!(?mode, "Switching label grammar mode");
        self.grammar = LabelGrammar::new(mode);
        for validator in self.providers.values_mut() {
            *validator = Arc::new(self.grammar);
        }
    }
}
