//! Keyword suggestions derived from a completed profile.

use super::profile::Profile;
use super::prompts::{KEYWORDS_HEADER, NOT_ENOUGH_DATA};

const UNKNOWN: &str = "Unknown";

/// Derive keyword suggestions from a profile, in presentation order.
///
/// The website line is always produced (with or without the URL suffix); the
/// other lines depend on which answers are present.
pub fn derive_keywords(profile: &Profile) -> Vec<String> {
    let industry = present(&profile.industry);
    let objective = present(&profile.objective);
    let audience = present(&profile.audience);
    let location = present(&profile.location);
    // Fallbacks apply only to unanswered fields; an empty answer renders empty
    let industry_lower = profile
        .industry
        .as_deref()
        .unwrap_or(UNKNOWN)
        .to_lowercase();

    let mut keywords = Vec::new();

    if let (Some(industry), Some(objective)) = (industry, objective) {
        keywords.push(format!(
            "{industry} strategies for {}",
            objective.to_lowercase()
        ));
    }
    if let (Some(audience), Some(location)) = (audience, location) {
        keywords.push(format!("How to target {audience} in {location}"));
    }
    if profile.uses_ppc() {
        keywords.push(format!("Best PPC campaigns for {industry_lower}"));
    }

    match provided_link(&profile.website) {
        Some(website) => keywords.push(format!(
            "Improving website traffic for {industry_lower}: {website}"
        )),
        None => keywords.push(format!("Improving website traffic for {industry_lower}")),
    }

    if let Some(social) = provided_link(&profile.social_media) {
        keywords.push(format!(
            "Social media tips for {}: {social}",
            profile.audience.as_deref().unwrap_or(UNKNOWN)
        ));
    }

    keywords
}

/// Render suggestions as the final dialog reply.
pub fn render_keywords(keywords: &[String]) -> String {
    let lines: Vec<String> = keywords
        .iter()
        .filter(|kw| !kw.is_empty())
        .map(|kw| format!("- {kw}"))
        .collect();

    if lines.is_empty() {
        return NOT_ENOUGH_DATA.to_string();
    }
    format!("{KEYWORDS_HEADER}\n{}", lines.join("\n"))
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// A website/social answer counts unless it is blank or a literal "no".
fn provided_link(field: &Option<String>) -> Option<&str> {
    present(field).filter(|s| !s.eq_ignore_ascii_case("no"))
}
