use std::fmt;
use std::str::FromStr;

/// HTTP protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    Http10,
    #[default]
    Http11,
}

impl Version {
    /// Get major version number
    pub fn major(&self) -> u8 {
        1
    }

    /// Get minor version number
    pub fn minor(&self) -> u8 {
        match self {
            Version::Http10 => 0,
            Version::Http11 => 1,
        }
    }

    /// Whether connections persist when the request carries no Connection header
    pub fn keeps_alive_by_default(&self) -> bool {
        matches!(self, Version::Http11)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(VersionParseError::InvalidVersion(s.to_string())),
        }
    }
}

/// Error type for version parsing
#[derive(Debug, Clone, thiserror::Error)]
pub enum VersionParseError {
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),
}
