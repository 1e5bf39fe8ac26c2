//! Parser policy configuration
//!
//! The defaults reproduce the permissive grammar: unknown block members are
//! skipped one token at a time and malformed database values are stored as
//! absent. Both can be tightened per compile.

use crate::error::{BlockKind, ConfigError};
use serde::{Deserialize, Serialize};

/// What the parser does with a token it does not recognize inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMemberPolicy {
    /// Skip exactly one token and continue.
    #[default]
    Skip,
    /// Fail the compile with [`ParseError::UnknownMember`](crate::ParseError::UnknownMember).
    Reject,
}

/// What the parser stores for a database setting whose value is neither a
/// string nor a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseValuePolicy {
    /// Store the setting with an absent value and step over the token.
    #[default]
    Lenient,
    /// Fail the compile with [`ParseError::InvalidSettingValue`](crate::ParseError::InvalidSettingValue).
    Strict,
}

/// Per-block overrides for the unknown-member policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlockPolicies {
    pub program: Option<UnknownMemberPolicy>,
    pub service: Option<UnknownMemberPolicy>,
    pub endpoint: Option<UnknownMemberPolicy>,
    pub event: Option<UnknownMemberPolicy>,
    pub database: Option<UnknownMemberPolicy>,
}

/// Parser configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    pub unknown_members: UnknownMemberPolicy,
    pub database_values: DatabaseValuePolicy,
    pub blocks: BlockPolicies,
}

impl ParserConfig {
    /// Reject unknown members everywhere and malformed database values.
    ///
    /// Top-level tokens outside any service are still skipped: the program
    /// body is free-form between service declarations.
    pub fn strict() -> Self {
        Self {
            unknown_members: UnknownMemberPolicy::Reject,
            database_values: DatabaseValuePolicy::Strict,
            blocks: BlockPolicies {
                program: Some(UnknownMemberPolicy::Skip),
                ..BlockPolicies::default()
            },
        }
    }

    /// Load a configuration from a TOML document.
    ///
    /// ```toml
    /// unknown_members = "reject"
    /// database_values = "lenient"
    ///
    /// [blocks]
    /// program = "skip"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })
    }

    /// The unknown-member policy in effect for one block kind.
    pub fn unknown_member_policy(&self, block: BlockKind) -> UnknownMemberPolicy {
        let block_override = match block {
            BlockKind::Program => self.blocks.program,
            BlockKind::Service => self.blocks.service,
            BlockKind::Endpoint => self.blocks.endpoint,
            BlockKind::Event => self.blocks.event,
            BlockKind::Database => self.blocks.database,
        };
        block_override.unwrap_or(self.unknown_members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_permissive() {
        let config = ParserConfig::default();

        for block in [
            BlockKind::Program,
            BlockKind::Service,
            BlockKind::Endpoint,
            BlockKind::Event,
            BlockKind::Database,
        ] {
            assert_eq!(config.unknown_member_policy(block), UnknownMemberPolicy::Skip);
        }
        assert_eq!(config.database_values, DatabaseValuePolicy::Lenient);
    }

    #[test]
    fn test_strict_keeps_program_level_skipping() {
        let config = ParserConfig::strict();

        assert_eq!(
            config.unknown_member_policy(BlockKind::Program),
            UnknownMemberPolicy::Skip
        );
        assert_eq!(
            config.unknown_member_policy(BlockKind::Endpoint),
            UnknownMemberPolicy::Reject
        );
        assert_eq!(config.database_values, DatabaseValuePolicy::Strict);
    }

    #[test]
    fn test_from_toml() -> Result<(), ConfigError> {
        let config = ParserConfig::from_toml_str(
            r#"
            unknown_members = "reject"

            [blocks]
            endpoint = "skip"
            "#,
        )?;

        assert_eq!(
            config.unknown_member_policy(BlockKind::Service),
            UnknownMemberPolicy::Reject
        );
        assert_eq!(
            config.unknown_member_policy(BlockKind::Endpoint),
            UnknownMemberPolicy::Skip
        );
        assert_eq!(config.database_values, DatabaseValuePolicy::Lenient);
        Ok(())
    }

    #[test]
    fn test_empty_toml_is_default() -> Result<(), ConfigError> {
        assert_eq!(ParserConfig::from_toml_str("")?, ParserConfig::default());
        Ok(())
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        let result = ParserConfig::from_toml_str("recover = true");

        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_from_toml_rejects_bad_policy() {
        let result = ParserConfig::from_toml_str(r#"database_values = "sometimes""#);

        assert!(result.is_err());
    }
}
