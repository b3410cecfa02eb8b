use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Base attributes of a vocabulary word, as sent by the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WordDetails {
    #[serde(rename = "CEFR")]
    pub cefr: String,
    #[serde(rename = "type")]
    pub word_type: String,
    #[serde(rename = "English")]
    pub english: String,
    #[serde(rename = "Turkish")]
    pub turkish: String,
}


#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WordEnrichment {
    #[serde(rename = "English")]
    pub english: String,
    #[serde(rename = "Turkish")]
    pub turkish: String,
    #[serde(rename = "CEFR")]
    pub cefr: String,
    #[serde(rename = "type")]
    pub word_type: String,
    pub definition: String,
    pub example: Example,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Example {
    pub en: String,
    pub tr: String,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// Probe order used when no level is given.
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    /// Name of the level's directory inside the word store.
    pub fn dir_name(self) -> &'static str {
        match self {
            CefrLevel::A1 => "a1",
            CefrLevel::A2 => "a2",
            CefrLevel::B1 => "b1",
            CefrLevel::B2 => "b2",
            CefrLevel::C1 => "c1",
            CefrLevel::C2 => "c2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown CEFR level '{0}'")]
pub struct UnknownCefrLevel(pub String);

impl FromStr for CefrLevel {
    type Err = UnknownCefrLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CefrLevel::ALL
            .into_iter()
            .find(|level| level.dir_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCefrLevel(s.to_owned()))
    }
}
