//! Engine configuration: well-known sentinel types and matchlock.toml.
//!
//! The sentinel handles are resolved once per compilation and passed into
//! the engine explicitly, with no ambient or global lookups, so the engine is
//! trivially testable with fakes.

use crate::semantic::TypeId;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Handles to the designated "match failed" signal types.
///
/// A switch opts into exhaustiveness checking by making its discard branch
/// unconditionally raise one of these.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownTypes {
    /// The dedicated exhaustive-match-failed exception type.
    pub match_failed: Option<TypeId>,
    /// The host's built-in invalid-enum-argument signal.
    pub invalid_enum_argument: Option<TypeId>,
}

impl WellKnownTypes {
    /// Whether raising `ty` signals intended exhaustiveness.
    pub fn is_sentinel(&self, ty: TypeId) -> bool {
        self.match_failed == Some(ty) || self.invalid_enum_argument == Some(ty)
    }
}

/// Main configuration structure for matchlock.toml.
#[derive(Debug, Deserialize, Default)]
pub struct MatchlockConfig {
    /// Sentinel type names, overriding the ones named by the program
    /// description.
    pub sentinels: Option<SentinelConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Sentinel type name overrides.
#[derive(Debug, Deserialize, Default)]
pub struct SentinelConfig {
    pub match_failed: Option<String>,
    pub invalid_enum_argument: Option<String>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Loads configuration from matchlock.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<MatchlockConfig>> {
    let path = root.join("matchlock.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid matchlock.toml")?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_membership() {
        let wk = WellKnownTypes {
            match_failed: Some(TypeId(9)),
            invalid_enum_argument: None,
        };
        assert!(wk.is_sentinel(TypeId(9)));
        assert!(!wk.is_sentinel(TypeId(8)));
        assert!(!WellKnownTypes::default().is_sentinel(TypeId(9)));
    }

    #[test]
    fn test_parse_config() {
        let cfg: MatchlockConfig = toml::from_str(
            r#"
[sentinels]
match_failed = "ExhaustiveMatchFailedException"

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(
            cfg.sentinels.unwrap().match_failed.as_deref(),
            Some("ExhaustiveMatchFailedException")
        );
        assert_eq!(cfg.output.unwrap().format.as_deref(), Some("json"));
    }
}
