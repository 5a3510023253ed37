//! Error types for the runtime crate.

use anon_core::{ConfigError, PolicyName};
use anon_policy::LabelError;
use anon_sql::{CommandKind, SqlError};
use thiserror::Error;

/// Errors reported to the host. All of them abort the current command.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A masked role issued a query and rewriting is not available.
    #[error("NOT IMPLEMENTED YET: cannot mask queries for policy \"{policy}\"")]
    MaskingRewriteUnimplemented { policy: PolicyName },

    /// A masked role issued a utility command that would leak data.
    #[error("role is masked: {command} is not allowed")]
    RoleIsMasked { command: CommandKind },

    /// The masking function lives in a schema that is not labelled `TRUSTED`.
    #[error("'{function}' does not belong to a TRUSTED schema")]
    UntrustedFunction { function: String },

    /// The masking function is not schema-qualified.
    #[error("'{function}' must be qualified with a TRUSTED schema")]
    UnqualifiedFunction { function: String },

    #[error("invalid masking policy name: \"{0}\"")]
    InvalidPolicyName(String),

    #[error("schema \"{0}\" does not exist")]
    UnknownSchema(String),
}

impl RuntimeError {
    /// SQLSTATE reported to the client.
    pub fn sqlstate(&self) -> &'static str {
        match self {
            RuntimeError::Label(e) => e.sqlstate(),
            RuntimeError::Sql(e) => e.sqlstate(),
            // insufficient_privilege
            RuntimeError::Config(ConfigError::PermissionDenied(_)) => "42501",
            // invalid_parameter_value
            RuntimeError::Config(_) => "22023",
            // insufficient_privilege
            RuntimeError::MaskingRewriteUnimplemented { .. } | RuntimeError::RoleIsMasked { .. } => {
                "42501"
            }
            // invalid_name
            RuntimeError::UntrustedFunction { .. } | RuntimeError::UnqualifiedFunction { .. } => {
                "42602"
            }
            RuntimeError::InvalidPolicyName(_) => "22023",
            // invalid_schema_name
            RuntimeError::UnknownSchema(_) => "3F000",
        }
    }
}
