//! Fixed reply texts for the profile dialog.

use super::state::DialogStep;

pub const INDUSTRY_PROMPT: &str = "Welcome! What industry is your business in?";
pub const OBJECTIVE_PROMPT: &str =
    "What is your business objective? (e.g., lead generation, sales, etc.)";
pub const WEBSITE_PROMPT: &str = "Do you have a website? If yes, please enter the URL.";
pub const SOCIAL_MEDIA_PROMPT: &str =
    "Do you have any social media platforms? If yes, please provide the URL.";
pub const PPC_PROMPT: &str = "Do you use PPC campaigns? (yes/no)";
pub const PPC_PLATFORM_PROMPT: &str =
    "Great! What PPC platform are you using? (e.g., Google Ads, Facebook Ads, etc.)";
pub const AUDIENCE_PROMPT: &str = "No worries! We can focus on other strategies. \
Who are you trying to reach? (e.g., young adults, professionals, etc.)";
pub const LOCATION_PROMPT: &str = "Where is your target location? (e.g., India, USA, etc.)";
pub const GOODBYE: &str = "Goodbye! Have a nice day!";

pub const KEYWORDS_HEADER: &str = "Here are some suggested keywords for your business:";
pub const NOT_ENOUGH_DATA: &str =
    "It seems we don't have enough data to generate keywords. Please try providing more details.";

/// Prompt asking for the answer of `step`.
///
/// `ppc_branch` only matters for `Audience`: the PPC branch asks for the ad
/// platform, the other branch asks for the audience directly. Returns `None`
/// for `End`, which has no prompt.
pub fn prompt_for(step: DialogStep, ppc_branch: bool) -> Option<&'static str> {
    let prompt = match step {
        DialogStep::Industry => INDUSTRY_PROMPT,
        DialogStep::Objective => OBJECTIVE_PROMPT,
        DialogStep::Website => WEBSITE_PROMPT,
        DialogStep::SocialMedia => SOCIAL_MEDIA_PROMPT,
        DialogStep::Ppc => PPC_PROMPT,
        DialogStep::Audience if ppc_branch => PPC_PLATFORM_PROMPT,
        DialogStep::Audience => AUDIENCE_PROMPT,
        DialogStep::Location => LOCATION_PROMPT,
        DialogStep::End => return None,
    };
    Some(prompt)
}
