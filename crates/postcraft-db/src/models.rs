use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Social platform a post is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
}

impl Platform {
    /// Every supported platform, in display order.
    pub const ALL: [Platform; 4] = [
        Self::Twitter,
        Self::Linkedin,
        Self::Instagram,
        Self::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::Linkedin),
            "instagram" => Ok(Self::Instagram),
            "facebook" => Ok(Self::Facebook),
            other => Err(PlatformParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Platform`] string.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid platform: {:?} (expected twitter, linkedin, instagram, or facebook)",
            self.0
        )
    }
}

impl std::error::Error for PlatformParseError {}

// ---------------------------------------------------------------------------

/// Voice the generated post is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Casual,
    Funny,
    Engaging,
    Inspiring,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Self::Professional,
        Self::Casual,
        Self::Funny,
        Self::Engaging,
        Self::Inspiring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Funny => "funny",
            Self::Engaging => "engaging",
            Self::Inspiring => "inspiring",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ToneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            "funny" => Ok(Self::Funny),
            "engaging" => Ok(Self::Engaging),
            "inspiring" => Ok(Self::Inspiring),
            other => Err(ToneParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Tone`] string.
#[derive(Debug, Clone)]
pub struct ToneParseError(pub String);

impl fmt::Display for ToneParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid tone: {:?} (expected professional, casual, funny, engaging, or inspiring)",
            self.0
        )
    }
}

impl std::error::Error for ToneParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A generated post as stored in the `posts` table.
///
/// `prompt` holds the caller's topic verbatim. `character_count` is the
/// number of Unicode scalar values in `content`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedPost {
    pub id: Uuid,
    pub prompt: String,
    pub platform: Platform,
    pub tone: Tone,
    pub content: String,
    pub character_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
