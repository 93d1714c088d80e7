//! Business profile accumulated over one dialog, plus answer normalization.

use serde::{Deserialize, Serialize};

/// Whether the business runs pay-per-click campaigns.
///
/// Only the literal answer `yes` (after trimming and lower-casing) counts as
/// PPC usage. Anything else keeps the normalized text in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PpcUsage {
    Yes,
    No,
    Other(String),
}

impl PpcUsage {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Other(normalized),
        }
    }

    /// True only for `Yes`; every other answer takes the non-PPC branch.
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for PpcUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers collected so far. Each field is `None` until its step has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppc_used: Option<PpcUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Profile {
    /// Whether the PPC answer selected the PPC branch.
    pub fn uses_ppc(&self) -> bool {
        self.ppc_used.as_ref().is_some_and(PpcUsage::is_yes)
    }
}

/// Uppercase the first character, leaving the rest as typed.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalization for industry, audience and location.
pub fn normalize_title(raw: &str) -> String {
    capitalize(raw.trim())
}

/// Normalization for website and social media: blank answers become absent.
pub fn normalize_optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
