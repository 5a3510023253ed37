//! Extension settings.
//!
//! [`AnonConfig`] is an immutable snapshot of the `anon.*` settings. It can be
//! loaded from a YAML file and is updated by producing a new snapshot with
//! [`AnonConfig::with_setting`], never by mutating a shared value.
//!
//! ```yaml
//! masking_policies: "anon,gdpr"
//! transparent_dynamic_masking: true
//! restrict_to_trusted_schemas: true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::Principal;
use crate::policy::{ParsedPolicyList, PolicyList};

/// Snapshot of every extension setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonConfig {
    /// Hash method used by the pseudonymizing functions.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Comma-separated masking policies, in resolution order.
    #[serde(default = "default_masking_policies")]
    pub masking_policies: String,

    /// Schema where the dynamic masking views are stored.
    #[serde(default = "default_mask_schema")]
    pub mask_schema: String,

    /// Mask every column with NULL (or its default) unless labelled otherwise.
    #[serde(default)]
    pub privacy_by_default: bool,

    /// Masking functions must live in a schema labelled `TRUSTED`.
    #[serde(default)]
    pub restrict_to_trusted_schemas: bool,

    /// Salt used by the pseudonymizing functions.
    #[serde(default)]
    pub salt: String,

    /// Schema holding the tables masked by the dynamic masking engine.
    #[serde(default = "default_source_schema")]
    pub source_schema: String,

    /// Mask queries issued by masked roles. When off the masking hook is a no-op.
    #[serde(default)]
    pub transparent_dynamic_masking: bool,

    /// Also reject `;` in column labels.
    #[serde(default)]
    pub strict_column_labels: bool,
}

impl Default for AnonConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            masking_policies: default_masking_policies(),
            mask_schema: default_mask_schema(),
            privacy_by_default: false,
            restrict_to_trusted_schemas: false,
            salt: String::new(),
            source_schema: default_source_schema(),
            transparent_dynamic_masking: false,
            strict_column_labels: false,
        }
    }
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

fn default_masking_policies() -> String {
    "anon".to_string()
}

fn default_mask_schema() -> String {
    "mask".to_string()
}

fn default_source_schema() -> String {
    "public".to_string()
}

/// Error type for configuration loading and updates.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unrecognized configuration parameter \"{0}\"")]
    UnknownKey(String),

    #[error("invalid value for parameter \"{key}\": \"{value}\"")]
    InvalidValue { key: ConfigKey, value: String },

    #[error("permission denied for parameter \"{0}\"")]
    PermissionDenied(ConfigKey),
}

/// Names of the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Algorithm,
    MaskingPolicies,
    MaskSchema,
    PrivacyByDefault,
    RestrictToTrustedSchemas,
    Salt,
    SourceSchema,
    TransparentDynamicMasking,
    StrictColumnLabels,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::Algorithm,
        ConfigKey::MaskingPolicies,
        ConfigKey::MaskSchema,
        ConfigKey::PrivacyByDefault,
        ConfigKey::RestrictToTrustedSchemas,
        ConfigKey::Salt,
        ConfigKey::SourceSchema,
        ConfigKey::TransparentDynamicMasking,
        ConfigKey::StrictColumnLabels,
    ];

    /// The qualified setting name, e.g. `anon.masking_policies`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Algorithm => "anon.algorithm",
            ConfigKey::MaskingPolicies => "anon.masking_policies",
            ConfigKey::MaskSchema => "anon.maskschema",
            ConfigKey::PrivacyByDefault => "anon.privacy_by_default",
            ConfigKey::RestrictToTrustedSchemas => "anon.restrict_to_trusted_schemas",
            ConfigKey::Salt => "anon.salt",
            ConfigKey::SourceSchema => "anon.sourceschema",
            ConfigKey::TransparentDynamicMasking => "anon.transparent_dynamic_masking",
            ConfigKey::StrictColumnLabels => "anon.strict_column_labels",
        }
    }

    /// Only a superuser may write these, and only a superuser may read them back.
    pub fn is_privileged(&self) -> bool {
        matches!(self, ConfigKey::Algorithm | ConfigKey::Salt)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    /// Accepts both `anon.maskschema` and the YAML field name `mask_schema`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase();
        let short = key.strip_prefix("anon.").unwrap_or(&key);
        let found = match short {
            "algorithm" => ConfigKey::Algorithm,
            "masking_policies" => ConfigKey::MaskingPolicies,
            "maskschema" | "mask_schema" => ConfigKey::MaskSchema,
            "privacy_by_default" => ConfigKey::PrivacyByDefault,
            "restrict_to_trusted_schemas" => ConfigKey::RestrictToTrustedSchemas,
            "salt" => ConfigKey::Salt,
            "sourceschema" | "source_schema" => ConfigKey::SourceSchema,
            "transparent_dynamic_masking" => ConfigKey::TransparentDynamicMasking,
            "strict_column_labels" => ConfigKey::StrictColumnLabels,
            _ => return Err(ConfigError::UnknownKey(s.to_string())),
        };
        Ok(found)
    }
}

fn parse_bool(key: ConfigKey, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn format_bool(value: bool) -> String {
    if value { "on" } else { "off" }.to_string()
}

impl AnonConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// The configured policies, freshly parsed from `masking_policies`.
    pub fn policy_list(&self) -> PolicyList {
        self.parsed_policies().policies
    }

    /// Like [`AnonConfig::policy_list`], also reporting dropped empty segments.
    pub fn parsed_policies(&self) -> ParsedPolicyList {
        PolicyList::parse(&self.masking_policies)
    }

    /// Current value of a setting, as text.
    ///
    /// Privileged settings are hidden from non-superusers.
    pub fn show(&self, key: ConfigKey, principal: &Principal) -> Result<String, ConfigError> {
        if key.is_privileged() && !principal.superuser {
            return Err(ConfigError::PermissionDenied(key));
        }
        Ok(match key {
            ConfigKey::Algorithm => self.algorithm.clone(),
            ConfigKey::MaskingPolicies => self.masking_policies.clone(),
            ConfigKey::MaskSchema => self.mask_schema.clone(),
            ConfigKey::PrivacyByDefault => format_bool(self.privacy_by_default),
            ConfigKey::RestrictToTrustedSchemas => format_bool(self.restrict_to_trusted_schemas),
            ConfigKey::Salt => self.salt.clone(),
            ConfigKey::SourceSchema => self.source_schema.clone(),
            ConfigKey::TransparentDynamicMasking => format_bool(self.transparent_dynamic_masking),
            ConfigKey::StrictColumnLabels => format_bool(self.strict_column_labels),
        })
    }

    /// Return a new snapshot with one setting changed.
    pub fn with_setting(
        &self,
        key: ConfigKey,
        value: &str,
        principal: &Principal,
    ) -> Result<Self, ConfigError> {
        if key.is_privileged() && !principal.superuser {
            return Err(ConfigError::PermissionDenied(key));
        }

        let mut next = self.clone();
        match key {
            ConfigKey::Algorithm => next.algorithm = value.to_string(),
            ConfigKey::MaskingPolicies => next.masking_policies = value.to_string(),
            ConfigKey::MaskSchema => next.mask_schema = value.to_string(),
            ConfigKey::PrivacyByDefault => next.privacy_by_default = parse_bool(key, value)?,
            ConfigKey::RestrictToTrustedSchemas => {
                next.restrict_to_trusted_schemas = parse_bool(key, value)?
            }
            ConfigKey::Salt => next.salt = value.to_string(),
            ConfigKey::SourceSchema => next.source_schema = value.to_string(),
            ConfigKey::TransparentDynamicMasking => {
                next.transparent_dynamic_masking = parse_bool(key, value)?
            }
            ConfigKey::StrictColumnLabels => next.strict_column_labels = parse_bool(key, value)?,
        }
        Ok(next)
    }
}
