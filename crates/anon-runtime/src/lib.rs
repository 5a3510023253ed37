//! # anon-runtime
//!
//! Everything the host calls into, once the extension is loaded:
//!
//! - [`MaskingExtension`]: owns the settings snapshot, the label providers and
//!   the label store; entry point for `SECURITY LABEL` and setting changes
//! - [`HookChain`] / [`QueryObserver`]: post-analysis observers run in
//!   registration order, [`MaskingHook`] being the one this crate installs
//! - [`TrustedSchemaGuard`]: keeps masking functions inside `TRUSTED` schemas
//! - [`functions`]: the SQL-callable functions
//!
//! Query rewriting is not implemented: a query issued by a masked role is
//! rejected rather than run unmasked.

pub mod error;
pub mod extension;
pub mod functions;
pub mod hook;
pub mod rewrite;
pub mod trusted;

pub use error::RuntimeError;
pub use extension::{ANON_SCHEMA, MaskingExtension};
pub use functions::Session;
pub use hook::{AnalyzeContext, AnalyzedQuery, HookChain, MaskingHook, QueryObserver};
pub use trusted::{InMemorySchemaCatalog, SchemaCatalog, TrustedSchemaGuard};
