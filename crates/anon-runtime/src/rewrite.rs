//! Query rewriting for masked roles.
//!
//! Not implemented. Every call fails so that a masked role never sees
//! unmasked data.

use anon_core::PolicyName;

use crate::error::RuntimeError;
use crate::hook::AnalyzedQuery;

/// Rewrite `query` so it reads through the masking views of `policy`.
pub fn rewrite(query: AnalyzedQuery, policy: &PolicyName) -> Result<AnalyzedQuery, RuntimeError> {
    tracing::warn!(
        policy = %policy,
        command = %query.command,
        "Rejecting query from masked role: rewriting is not implemented"
    );
    Err(RuntimeError::MaskingRewriteUnimplemented {
        policy: policy.clone(),
    })
}
