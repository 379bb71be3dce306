use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Server software a record runs.
///
/// `Custom` carries whatever the user typed; the URL is never fetched and is
/// not validated beyond trimming.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum BuildVariant {
    #[default]
    Vanilla,
    Paper,
    Spigot,
    Forge,
    Fabric,
    Custom(String),
}

impl BuildVariant {
    /// Parse a build name as entered by the user, e.g. `paper` or
    /// `custom:https://example.org/server.jar`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(url) = s.strip_prefix("custom:") {
            return Ok(Self::Custom(url.trim().to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "" | "vanilla" => Ok(Self::Vanilla),
            "paper" => Ok(Self::Paper),
            "spigot" => Ok(Self::Spigot),
            "forge" => Ok(Self::Forge),
            "fabric" => Ok(Self::Fabric),
            _ => Err(AppError::invalid_build(s)),
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Vanilla => "Vanilla",
            Self::Paper => "Paper",
            Self::Spigot => "Spigot",
            Self::Forge => "Forge",
            Self::Fabric => "Fabric",
            Self::Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(url) if !url.is_empty() => write!(f, "Custom ({})", url),
            other => f.write_str(other.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_variants_case_insensitively() {
        assert_eq!(BuildVariant::parse("Paper").expect("paper"), BuildVariant::Paper);
        assert_eq!(BuildVariant::parse("  ").expect("blank"), BuildVariant::Vanilla);
        assert_eq!(BuildVariant::parse("FABRIC").expect("fabric"), BuildVariant::Fabric);
    }

    #[test]
    fn custom_url_is_kept_verbatim() {
        let build = BuildVariant::parse("custom: not even a url ").expect("custom");
        assert_eq!(build, BuildVariant::Custom("not even a url".to_string()));
        assert_eq!(build.to_string(), "Custom (not even a url)");
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = BuildVariant::parse("bukkit2").expect_err("unknown");
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidBuild);
    }
}
