//! Instruction text sent to the provider for one platform.
//!
//! Pure logic: no I/O. The topic is embedded verbatim.

use postcraft_db::models::{Platform, Tone};

use crate::platform::PlatformProfile;

/// Fixed instruction used by the diagnostic probe.
pub const PROBE_INSTRUCTION: &str = "Say \"API key is working\"";

/// Build the instruction text for generating one post.
pub fn compile(topic: &str, platform: Platform, tone: Tone, profile: &PlatformProfile) -> String {
    let mut prompt = String::with_capacity(512 + topic.len());

    prompt.push_str(&format!(
        "You are an expert social media content creator. \
         Generate a {tone} social media post for {platform}.\n\n"
    ));

    prompt.push_str("Requirements:\n");
    prompt.push_str(&format!("- Platform: {platform}\n"));
    prompt.push_str(&format!("- Tone: {tone}\n"));
    prompt.push_str(&format!(
        "- Character limit: {} characters (STRICTLY enforce this limit)\n",
        profile.character_limit
    ));
    prompt.push_str(&format!(
        "- Platform guidelines: {}\n\n",
        profile.style_guideline
    ));

    prompt.push_str("User's prompt/topic: ");
    prompt.push_str(topic);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Generate ONLY the post content. Do not include any explanations, labels, \
         or meta information. Just the post text itself. Make sure it's engaging, \
         authentic, and fits the platform's style.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::profile;

    #[test]
    fn embeds_every_input() {
        let p = compile("coffee", Platform::Twitter, Tone::Funny, profile(Platform::Twitter));
        assert!(p.contains("Generate a funny social media post for twitter."));
        assert!(p.contains("- Platform: twitter"));
        assert!(p.contains("- Tone: funny"));
        assert!(p.contains("- Character limit: 280 characters"));
        assert!(p.contains("Use hashtags sparingly."));
        assert!(p.contains("User's prompt/topic: coffee\n"));
        assert!(p.contains("Generate ONLY the post content."));
    }

    #[test]
    fn topic_is_not_altered() {
        let topic = "  a very long topic \n with odd spacing, émojis 🚀 and \"quotes\"  ".repeat(50);
        let p = compile(&topic, Platform::Linkedin, Tone::Inspiring, profile(Platform::Linkedin));
        assert!(p.contains(&topic));
    }

    #[test]
    fn is_deterministic() {
        let prof = profile(Platform::Facebook);
        let a = compile("launch day", Platform::Facebook, Tone::Engaging, prof);
        let b = compile("launch day", Platform::Facebook, Tone::Engaging, prof);
        assert_eq!(a, b);
    }
}
