//! Classifies incoming text into bot commands or dialog answers.

/// What an incoming message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` — begin the profile dialog.
    Start,
    /// `/cancel` — abort the profile dialog.
    Cancel,
    /// `/trends` — fetch industry trend text.
    Trends,
    /// `/faq <question>` — ask the marketing advisor.
    Faq { question: String },
    /// Any other `/command`, by its lower-cased command word. Never an answer.
    Unknown(String),
    /// Plain text: an answer to the current dialog step, kept verbatim.
    Answer(String),
}

impl Command {
    /// Whether handling this command waits on an external service.
    pub fn calls_collaborator(&self) -> bool {
        matches!(self, Self::Trends | Self::Faq { .. })
    }
}

/// Parses message text into a `Command`.
pub struct CommandParser;

impl CommandParser {
    /// Parse message content into a Command.
    ///
    /// Command words are case-insensitive and may carry a `@botname` suffix,
    /// as Telegram sends them in group chats.
    pub fn parse(content: &str) -> Command {
        let trimmed = content.trim_start();
        if !trimmed.starts_with('/') {
            return Command::Answer(content.to_string());
        }

        let (head, rest) = match trimmed.find(char::is_whitespace) {
            Some(pos) => (&trimmed[..pos], trimmed[pos..].trim()),
            None => (trimmed, ""),
        };
        let word = head.split('@').next().unwrap_or(head).to_lowercase();

        match word.as_str() {
            "/start" => Command::Start,
            "/cancel" => Command::Cancel,
            "/trends" => Command::Trends,
            "/faq" => Command::Faq {
                question: rest.to_string(),
            },
            _ => Command::Unknown(word),
        }
    }
}
