//! Static per-platform profiles: character limit and style guideline.
//!
//! Platform ids arriving as text must be parsed into [`Platform`] first
//! (see [`parse_platform`]); once parsed, lookup is total.

use postcraft_db::models::{Platform, PlatformParseError};

/// Character limit and writing guideline for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub character_limit: usize,
    pub style_guideline: &'static str,
}

const TWITTER: PlatformProfile = PlatformProfile {
    platform: Platform::Twitter,
    character_limit: 280,
    style_guideline: "Keep it concise and engaging. Use hashtags sparingly. Make it punchy and shareable.",
};

const LINKEDIN: PlatformProfile = PlatformProfile {
    platform: Platform::Linkedin,
    character_limit: 3000,
    style_guideline: "Professional and thoughtful. Can be longer and more detailed. Focus on value and insights.",
};

const INSTAGRAM: PlatformProfile = PlatformProfile {
    platform: Platform::Instagram,
    character_limit: 2200,
    style_guideline: "Engaging and visual. Use emojis appropriately. Make it relatable and authentic.",
};

const FACEBOOK: PlatformProfile = PlatformProfile {
    platform: Platform::Facebook,
    character_limit: 2000,
    style_guideline: "Conversational and friendly. Can include questions to encourage engagement. Make it community-focused.",
};

/// Look up the profile for a platform.
pub fn profile(platform: Platform) -> &'static PlatformProfile {
    match platform {
        Platform::Twitter => &TWITTER,
        Platform::Linkedin => &LINKEDIN,
        Platform::Instagram => &INSTAGRAM,
        Platform::Facebook => &FACEBOOK,
    }
}

pub fn limit_of(platform: Platform) -> usize {
    profile(platform).character_limit
}

pub fn guideline_of(platform: Platform) -> &'static str {
    profile(platform).style_guideline
}

/// Validate a caller-supplied platform id against the supported set.
pub fn parse_platform(id: &str) -> Result<Platform, PlatformParseError> {
    id.parse()
}
