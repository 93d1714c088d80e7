//! Dialog state machine — stores each answer and picks the next prompt.

use super::keywords::{derive_keywords, render_keywords};
use super::profile::{Profile, PpcUsage, normalize_optional, normalize_title};
use super::prompts::{GOODBYE, INDUSTRY_PROMPT, prompt_for};
use super::state::DialogStep;

/// Result of feeding one answer into a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The dialog moved on to `step`; `prompt` asks for its answer.
    Prompt {
        step: DialogStep,
        prompt: &'static str,
    },
    /// The location was answered and the dialog is over.
    Completed {
        profile: Profile,
        keywords: Vec<String>,
        message: String,
    },
}

impl Transition {
    /// Text to send back to the user.
    pub fn reply(&self) -> &str {
        match self {
            Self::Prompt { prompt, .. } => prompt,
            Self::Completed { message, .. } => message,
        }
    }

    /// Step the dialog is in after this transition.
    pub fn step(&self) -> DialogStep {
        match self {
            Self::Prompt { step, .. } => *step,
            Self::Completed { .. } => DialogStep::End,
        }
    }
}

/// One user's dialog: the current step plus the answers collected so far.
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    step: DialogStep,
    profile: Profile,
}

impl Dialog {
    /// Begin a fresh dialog. Returns it with the opening prompt.
    pub fn start() -> (Self, &'static str) {
        (Self::default(), INDUSTRY_PROMPT)
    }

    pub fn step(&self) -> DialogStep {
        self.step
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_finished(&self) -> bool {
        self.step.is_terminal()
    }

    /// Store `text` as the answer to the current step and advance.
    ///
    /// Every input is accepted. Returns `None` once the dialog has ended.
    pub fn answer(&mut self, text: &str) -> Option<Transition> {
        let current = self.step;
        let next = current.next()?;

        match current {
            DialogStep::Industry => self.profile.industry = Some(normalize_title(text)),
            DialogStep::Objective => self.profile.objective = Some(text.to_string()),
            DialogStep::Website => self.profile.website = normalize_optional(text),
            DialogStep::SocialMedia => self.profile.social_media = normalize_optional(text),
            DialogStep::Ppc => self.profile.ppc_used = Some(PpcUsage::parse(text)),
            DialogStep::Audience => self.profile.audience = Some(normalize_title(text)),
            DialogStep::Location => self.profile.location = Some(normalize_title(text)),
            DialogStep::End => return None,
        }
        tracing::info!(step = %current, value = ?self.stored_value(current), "Dialog answer stored");

        debug_assert!(current.can_transition_to(next));
        self.step = next;

        match prompt_for(next, self.profile.uses_ppc()) {
            Some(prompt) => Some(Transition::Prompt { step: next, prompt }),
            None => {
                let profile = std::mem::take(&mut self.profile);
                let keywords = derive_keywords(&profile);
                let message = render_keywords(&keywords);
                tracing::info!(count = keywords.len(), "Dialog complete, keywords derived");
                Some(Transition::Completed {
                    profile,
                    keywords,
                    message,
                })
            }
        }
    }

    /// Abort the dialog, discarding the profile. Returns the goodbye text, or
    /// `None` if the dialog had already ended.
    pub fn cancel(&mut self) -> Option<&'static str> {
        if self.step.is_terminal() {
            return None;
        }
        tracing::info!(step = %self.step, "Dialog cancelled");
        self.step = DialogStep::End;
        self.profile = Profile::default();
        Some(GOODBYE)
    }

    fn stored_value(&self, step: DialogStep) -> Option<String> {
        let p = &self.profile;
        match step {
            DialogStep::Industry => p.industry.clone(),
            DialogStep::Objective => p.objective.clone(),
            DialogStep::Website => p.website.clone(),
            DialogStep::SocialMedia => p.social_media.clone(),
            DialogStep::Ppc => p.ppc_used.as_ref().map(ToString::to_string),
            DialogStep::Audience => p.audience.clone(),
            DialogStep::Location => p.location.clone(),
            DialogStep::End => None,
        }
    }
}
