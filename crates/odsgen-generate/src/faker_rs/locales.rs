use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocaleKey {
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "en_US")]
    EnUs,
}

impl LocaleKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fr_FR" => Some(Self::FrFr),
            "en_US" => Some(Self::EnUs),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrFr => "fr_FR",
            Self::EnUs => "en_US",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
