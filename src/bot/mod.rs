//! Bot — routes channel messages to the profile dialog and the collaborators.

pub mod command;
pub mod orchestrator;
pub mod runner;
pub mod sessions;

pub use command::{Command, CommandParser};
pub use orchestrator::Orchestrator;
pub use runner::Bot;
pub use sessions::{ConversationKey, SessionRegistry};
