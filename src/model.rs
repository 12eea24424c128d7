use crate::media::MediaHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoStatus {
    Idle,
    Analyzing,
    Generating,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Output resolution requested from the video model.
    pub fn resolution(self) -> &'static str {
        match self {
            Self::Landscape => "1080p",
            Self::Portrait => "720p",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(format!("unsupported aspect ratio '{other}' (use 16:9 or 9:16)")),
        }
    }
}

macro_rules! named_options {
    ($(#[$meta:meta])* $name:ident, $default:ident, [$($variant:ident),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name).to_lowercase(), wanted))
            }
        }
    };
}

named_options!(
    /// Prebuilt narration voices.
    Voice,
    Kore,
    [Puck, Charon, Kore, Fenrir, Zephyr]
);

named_options!(
    /// Languages the narration script can be written in.
    Language,
    English,
    [English, Spanish, French, German, Japanese, Hindi, Portuguese]
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationOptions {
    pub aspect_ratio: AspectRatio,
    pub voiceover: bool,
    pub voice: Voice,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    pub id: String,
    pub url: String,
    pub video_url: Option<MediaHandle>,
    #[serde(default)]
    pub audio_url: Option<MediaHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub status: VideoStatus,
    pub aspect_ratio: AspectRatio,
    pub prompt_used: String,
}

impl GeneratedVideo {
    /// Placeholder created when analysis starts; id and timestamp share the
    /// same millisecond clock reading.
    pub fn pending(url: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: now.to_string(),
            url: url.into(),
            video_url: None,
            audio_url: None,
            script: None,
            timestamp: now,
            duration: None,
            status: VideoStatus::Analyzing,
            aspect_ratio,
            prompt_used: String::new(),
        }
    }

    /// Copy safe to persist: media handles do not survive a reload.
    pub fn stripped(&self) -> Self {
        Self {
            video_url: None,
            audio_url: None,
            ..self.clone()
        }
    }

    pub fn download_name(&self) -> String {
        format!("webvidgen-{}.mp4", self.id)
    }
}
