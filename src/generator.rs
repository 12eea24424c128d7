use crate::api::GenerationBackend;
use crate::error::GenerationError;
use crate::media::MediaHandle;
use crate::model::{AspectRatio, GeneratedVideo, GenerationOptions, Language, VideoStatus, Voice};
use crate::{logi, logok, logw};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

pub const DEFAULT_SCRIPT: &str =
    "Welcome to our website. Discover amazing features and explore what we have to offer.";

/// Reported durations; not measured from the media.
pub const VOICEOVER_DURATION_SECS: u32 = 20;
pub const SILENT_DURATION_SECS: u32 = 6;

const DEFAULT_THEME: &str =
    "Modern SaaS Technology, Blue and White Color Scheme, Professional, Clean UI";

const THEME_RULES: &[(&[&str], &str)] = &[
    (
        &["food", "restaurant"],
        "Delicious Food, Warm Colors, Restaurant Vibe, Cinematic Food Shots",
    ),
    (
        &["fashion", "shop"],
        "Trendy Fashion, High Contrast, E-commerce Layout, Dynamic Transitions",
    ),
    (
        &["portfolio", "design"],
        "Creative Design Portfolio, Minimalist, Black and White, Smooth Scrolling",
    ),
    (
        &["news", "blog"],
        "News Portal, Text Heavy, Clean Typography, Information Dense",
    ),
];

fn url_regex() -> Result<&'static Regex, GenerationError> {
    static URL_RE: OnceCell<Regex> = OnceCell::new();
    URL_RE
        .get_or_try_init(|| Regex::new(r"(?i)^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)/?$"))
        .map_err(|e| GenerationError::Unknown(format!("failed to compile url regex: {e}")))
}

/// Trims the input, defaults the scheme to https and validates the shape.
pub fn normalize_url(input: &str) -> Result<String, GenerationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyUrl);
    }

    let url = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    if !url_regex()?.is_match(&url) {
        return Err(GenerationError::InvalidUrl);
    }
    Ok(url)
}

/// Keyword-derived visual style. Later rules override earlier ones.
pub fn suggest_theme(url: &str) -> &'static str {
    THEME_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| url.contains(k)))
        .map(|(_, theme)| *theme)
        .next_back()
        .unwrap_or(DEFAULT_THEME)
}

fn video_prompt(url: &str, style: &str) -> String {
    format!(
        "A professional, high-quality video advertisement for a website.\n\
         The website is: {url}.\n\
         Visual style: {style}.\n\
         The video should feature smooth scrolling animations of a modern web interface,\n\
         glassmorphism UI elements, and dynamic transitions.\n\
         Cinematic lighting, 4k render quality.\n\
         Show a cursor interacting with buttons.\n\
         The overall vibe should be tech-forward and clean."
    )
}

fn script_prompt(url: &str, theme: &str, language: Language) -> String {
    format!(
        "Write a short, engaging voiceover script (approx 15-20 seconds spoken) for a video preview of this website: {url}.\n\
         The visual theme is: {theme}.\n\n\
         CRITICAL: The script must be written purely in {language}.\n\
         If the website concept is in English, translate the marketing message to {language}.\n\n\
         Do not include any scene directions, camera instructions, or labels like \"Narrator:\".\n\
         Just output the raw spoken text.\n\
         Keep it professional, energetic, and focused on the value proposition."
    )
}

/// Turns a confirmed draft into video, narration script and voiceover.
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn GenerationBackend>,
}

impl Generator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub async fn request_video(
        &self,
        url: &str,
        aspect_ratio: AspectRatio,
        style: &str,
    ) -> Result<MediaHandle, GenerationError> {
        let prompt = video_prompt(url, style);
        tracing::debug!("video prompt: {prompt}");
        self.backend.generate_video(&prompt, aspect_ratio).await
    }

    pub async fn request_script(
        &self,
        url: &str,
        style: &str,
        language: Language,
    ) -> Result<String, GenerationError> {
        let text = self
            .backend
            .generate_script(&script_prompt(url, style, language))
            .await?;
        if text.trim().is_empty() {
            logw("Script model returned no text; using the default narration.");
            return Ok(DEFAULT_SCRIPT.to_string());
        }
        Ok(text)
    }

    /// Voiceover is best-effort: failures yield `None` instead of an error.
    pub async fn request_speech(&self, text: &str, voice: Voice) -> Option<MediaHandle> {
        match self.backend.synthesize_speech(text, voice).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                logw(format!("TTS failed, continuing without voiceover: {}", err));
                None
            }
        }
    }

    async fn voiceover(
        &self,
        url: &str,
        style: &str,
        options: &GenerationOptions,
    ) -> Result<(String, Option<MediaHandle>), GenerationError> {
        let script = self.request_script(url, style, options.language).await?;
        logok(format!("Narration script ready ({} chars)", script.len()));
        let audio = self.request_speech(&script, options.voice).await;
        Ok((script, audio))
    }

    /// Runs the video request and the script/speech chain side by side and
    /// assembles the completed record once both settle.
    pub async fn generate(
        &self,
        draft: &GeneratedVideo,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedVideo, GenerationError> {
        logi(format!(
            "Generating for {} (voiceover: {})",
            draft.url,
            if options.voiceover { "on" } else { "off" }
        ));

        let video = self.request_video(&draft.url, options.aspect_ratio, prompt);
        let narration = async {
            if options.voiceover {
                self.voiceover(&draft.url, prompt, options).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let (video, narration) = tokio::try_join!(video, narration)?;

        let (script, audio) = match narration {
            Some((script, audio)) => (Some(script), audio),
            None => (None, None),
        };
        let duration = if options.voiceover {
            VOICEOVER_DURATION_SECS
        } else {
            SILENT_DURATION_SECS
        };

        Ok(GeneratedVideo {
            video_url: Some(video),
            audio_url: audio,
            script,
            status: VideoStatus::Completed,
            aspect_ratio: options.aspect_ratio,
            prompt_used: prompt.to_string(),
            duration: Some(duration),
            ..draft.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_https_scheme() {
        assert_eq!(normalize_url("  example.com ").unwrap(), "https://example.com");
        assert_eq!(
            normalize_url("http://shop.example.co.uk/deals").unwrap(),
            "http://shop.example.co.uk/deals"
        );
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert_eq!(normalize_url("   "), Err(GenerationError::EmptyUrl));
        assert_eq!(normalize_url("not a url"), Err(GenerationError::InvalidUrl));
        assert_eq!(normalize_url("https://localhost"), Err(GenerationError::InvalidUrl));
    }

    #[test]
    fn theme_follows_url_keywords() {
        assert_eq!(suggest_theme("https://example.com"), DEFAULT_THEME);
        assert!(suggest_theme("https://bestfood.io").starts_with("Delicious Food"));
        assert!(suggest_theme("https://my-portfolio.dev").starts_with("Creative Design"));
        // Both fashion and blog match; the later rule wins.
        assert!(suggest_theme("https://fashionblog.com").starts_with("News Portal"));
    }

    #[test]
    fn script_prompt_pins_the_language() {
        let prompt = script_prompt("https://a.io", "Clean", Language::Spanish);
        assert!(prompt.contains("written purely in Spanish"));
        assert!(prompt.contains("https://a.io"));
    }
}
