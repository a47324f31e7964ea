//! Namespace token parsing.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::distribution::error::DistributionError;

/// Representation a client asked a namespace to be served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Properties,
    Yml,
    Yaml,
    Json,
    Xml,
}

impl ConfigFormat {
    pub const ALL: [ConfigFormat; 5] = [
        ConfigFormat::Properties,
        ConfigFormat::Yml,
        ConfigFormat::Yaml,
        ConfigFormat::Json,
        ConfigFormat::Xml,
    ];

    /// Extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Properties => "properties",
            ConfigFormat::Yml => "yml",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
            ConfigFormat::Xml => "xml",
        }
    }

    /// Accepts the extension with or without a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL.into_iter().find(|format| format.extension() == ext)
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

impl FromStr for ConfigFormat {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| DistributionError::FormatNotSupported(s.to_string()))
    }
}

/// Split a requested namespace token into its canonical id and format.
///
/// Only a recognized trailing extension is stripped. Any other token,
/// including one containing dots, is kept whole and served as properties.
pub fn parse_namespace(token: &str) -> (&str, ConfigFormat) {
    token
        .rsplit_once('.')
        .and_then(|(name, ext)| ConfigFormat::from_extension(ext).map(|format| (name, format)))
        .unwrap_or((token, ConfigFormat::Properties))
}
