//! Error types for label validation.

use anon_core::ObjectKind;
use thiserror::Error;

use crate::grammar::LabelTarget;

/// Errors raised while validating or applying a security label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// The label text does not follow the grammar for its object.
    #[error("'{label}' is not a valid label for a {target}")]
    InvalidLabelSyntax { target: LabelTarget, label: String },

    /// A schema label was written by a non-superuser.
    #[error("only superuser can set an anon label for a schema")]
    InsufficientPrivilege,

    /// The object kind cannot carry an anon label.
    #[error("the anon extension does not support labels on {kind} objects")]
    UnsupportedObjectKind { kind: ObjectKind },

    /// A column was addressed without its column number.
    #[error("column label on relation {object_id} has no column number")]
    MissingColumnNumber { object_id: u32 },

    /// No provider is registered under this policy name.
    #[error("security label provider \"{0}\" is not loaded")]
    ProviderNotLoaded(String),
}

impl LabelError {
    /// SQLSTATE reported to the client.
    pub fn sqlstate(&self) -> &'static str {
        match self {
            // invalid_name
            LabelError::InvalidLabelSyntax { .. } => "42602",
            // insufficient_privilege
            LabelError::InsufficientPrivilege => "42501",
            // feature_not_supported
            LabelError::UnsupportedObjectKind { .. } => "0A000",
            // invalid_parameter_value
            LabelError::MissingColumnNumber { .. } | LabelError::ProviderNotLoaded(_) => "22023",
        }
    }
}
