use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Color tag of a red-black tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Token used in serialized tree records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Black => "BLACK",
        }
    }

    /// Graphviz fill color for diagram nodes.
    pub fn fill(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    /// Tokens are case-sensitive: exactly `RED` or `BLACK`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RED" => Ok(Color::Red),
            "BLACK" => Ok(Color::Black),
            other => Err(ValidationError::InvalidColor(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("RED".parse::<Color>(), Ok(Color::Red));
        assert_eq!("BLACK".parse::<Color>(), Ok(Color::Black));
        assert_eq!(
            "red".parse::<Color>(),
            Err(ValidationError::InvalidColor("red".into()))
        );
    }

    #[test]
    fn test_serde_uses_uppercase_tokens() {
        let json = serde_json::to_string(&Color::Black).unwrap();
        assert_eq!(json, "\"BLACK\"");
        let back: Color = serde_json::from_str("\"RED\"").unwrap();
        assert_eq!(back, Color::Red);
    }
}
