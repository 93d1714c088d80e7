//! Dialog steps — which answer the bot is waiting for.

use serde::{Deserialize, Serialize};

/// The steps of the profile dialog.
///
/// Progresses linearly: Industry → Objective → Website → SocialMedia → Ppc →
/// Audience → Location → End. Cancellation jumps to End from any other step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStep {
    #[default]
    Industry,
    Objective,
    Website,
    SocialMedia,
    Ppc,
    Audience,
    Location,
    End,
}

impl DialogStep {
    /// Every step that waits for an answer, in dialog order.
    pub const ACTIVE: [DialogStep; 7] = [
        DialogStep::Industry,
        DialogStep::Objective,
        DialogStep::Website,
        DialogStep::SocialMedia,
        DialogStep::Ppc,
        DialogStep::Audience,
        DialogStep::Location,
    ];

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialogStep) -> bool {
        if target == Self::End {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }

    /// Whether this step is terminal (dialog is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<DialogStep> {
        use DialogStep::*;
        match self {
            Industry => Some(Objective),
            Objective => Some(Website),
            Website => Some(SocialMedia),
            SocialMedia => Some(Ppc),
            Ppc => Some(Audience),
            Audience => Some(Location),
            Location => Some(End),
            End => None,
        }
    }
}

impl std::fmt::Display for DialogStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Industry => "industry",
            Self::Objective => "objective",
            Self::Website => "website",
            Self::SocialMedia => "social_media",
            Self::Ppc => "ppc",
            Self::Audience => "audience",
            Self::Location => "location",
            Self::End => "end",
        };
        write!(f, "{s}")
    }
}
