//! # anon-policy
//!
//! Security labels and masking policies.
//!
//! A masking policy is a label provider: every `SECURITY LABEL FOR <policy>`
//! command is checked by the [`LabelGrammar`] before the label is stored.
//! At query time the [`PolicyResolver`] reads role labels back to decide
//! which policy, if any, masks the current role.
//!
//! | Object | Accepted labels |
//! |--------|-----------------|
//! | database | `TABLESAMPLE ...` (no `;`) |
//! | table | `TABLESAMPLE ...` (no `;`) |
//! | column | `MASKED WITH FUNCTION ...`, `MASKED WITH VALUE ...`, `QUASI IDENTIFIER`, `INDIRECT IDENTIFIER` |
//! | role | `MASKED` |
//! | schema | `TRUSTED` (superuser only) |
//!
//! ## Example
//!
//! ```rust
//! use anon_core::{ObjectRef, PolicyList, RoleId};
//! use anon_policy::{InMemoryLabelStore, LabelStore, PolicyResolver};
//!
//! let store = InMemoryLabelStore::new();
//! let policies = PolicyList::parse("anon,gdpr").policies;
//! let anon = policies.iter().next().unwrap();
//!
//! // Exempt role 10 from the first policy.
//! store.put_label(&ObjectRef::role(10), anon, Some("MASKED"));
//!
//! let resolver = PolicyResolver::new(&store);
//! assert_eq!(resolver.resolve(RoleId(10), &policies).unwrap().as_str(), "gdpr");
//! assert_eq!(resolver.resolve(RoleId(11), &policies).unwrap().as_str(), "anon");
//! ```

pub mod command;
pub mod error;
pub mod grammar;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod store;

pub use command::SecurityLabelCommand;
pub use error::LabelError;
pub use grammar::{GrammarMode, LabelGrammar, LabelTarget, LabelValidator};
pub use registry::PolicyRegistry;
pub use resolver::{MASKED_MARKER, PolicyResolver, list_masking_policies};
pub use rule::ColumnRule;
pub use store::{InMemoryLabelStore, LabelEntry, LabelStore};
