//! The closed set of request categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Weather queries
    Weather,
    /// News search
    News,
    /// Data analysis
    Data,
    /// Task scheduling
    Task,
    /// Anything else
    General,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Weather,
        Intent::News,
        Intent::Data,
        Intent::Task,
        Intent::General,
    ];

    /// Specific intents in label detection priority order. `General` is
    /// never detected, only fallen back to.
    pub const SPECIFIC: [Intent; 4] = [Intent::Weather, Intent::News, Intent::Data, Intent::Task];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::News => "news",
            Intent::Data => "data",
            Intent::Task => "task",
            Intent::General => "general",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::Weather => "weather queries",
            Intent::News => "news search",
            Intent::Data => "data analysis",
            Intent::Task => "task scheduling",
            Intent::General => "general conversation",
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, Intent::General)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weather" => Ok(Intent::Weather),
            "news" => Ok(Intent::News),
            "data" => Ok(Intent::Data),
            "task" => Ok(Intent::Task),
            "general" => Ok(Intent::General),
            _ => Err("unknown intent label"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_through_from_str() {
        for intent in Intent::ALL {
            assert_eq!(intent.label().parse::<Intent>(), Ok(intent));
        }
        assert_eq!(" NEWS ".parse::<Intent>(), Ok(Intent::News));
        assert!("unknown".parse::<Intent>().is_err());
    }

    #[test]
    fn test_specific_excludes_general() {
        assert!(!Intent::SPECIFIC.contains(&Intent::General));
        assert_eq!(Intent::SPECIFIC[0], Intent::Weather);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Intent::Task).unwrap();
        assert_eq!(json, "\"task\"");
        let parsed: Intent = serde_json::from_str("\"weather\"").unwrap();
        assert_eq!(parsed, Intent::Weather);
    }
}
