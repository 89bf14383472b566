//! Rule tiers (complexity packages)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named partition of rules selected per request
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Low,
    Medium,
    High,
    /// Rules whose source declares no tier; only reachable through `ALL`
    #[default]
    General,
}

impl Tier {
    /// Tiers a caller can select by name
    pub const SELECTABLE: [Tier; 3] = [Tier::Low, Tier::Medium, Tier::High];

    /// Parse a tier name, case-insensitively.
    ///
    /// Dotted package names map through their last segment, so
    /// `com.rulesengine.rules.low` is `LOW`.
    pub fn parse(name: &str) -> Option<Self> {
        let last = name.trim().rsplit('.').next()?;
        match last.to_ascii_uppercase().as_str() {
            "LOW" => Some(Tier::Low),
            "MEDIUM" => Some(Tier::Medium),
            "HIGH" => Some(Tier::High),
            "GENERAL" => Some(Tier::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "LOW",
            Tier::Medium => "MEDIUM",
            Tier::High => "HIGH",
            Tier::General => "GENERAL",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
