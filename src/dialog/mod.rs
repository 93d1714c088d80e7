//! Profile dialog — the guided conversation that collects a business profile.
//!
//! The bot asks seven questions in a fixed order, normalizes each answer into
//! a `Profile`, and after the last answer derives keyword suggestions from it.
//! Nothing here touches the network; the orchestrator in `bot` drives it.

pub mod keywords;
pub mod machine;
pub mod profile;
pub mod prompts;
pub mod state;

pub use keywords::{derive_keywords, render_keywords};
pub use machine::{Dialog, Transition};
pub use profile::{PpcUsage, Profile};
pub use state::DialogStep;
