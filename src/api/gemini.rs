use crate::api::GenerationBackend;
use crate::config::Config;
use crate::credential::{ApiKey, SharedCredential};
use crate::error::GenerationError;
use crate::media::{MediaHandle, MediaKind, MediaStore};
use crate::model::{AspectRatio, Voice};
use crate::wav;
use crate::{logi, logok, logw};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const RAW_SNIPPET_CHARS: usize = 800;

pub struct GeminiClient {
    client: Client,
    cfg: Config,
    credential: SharedCredential,
    media: Arc<MediaStore>,
}

impl GeminiClient {
    pub fn new(
        cfg: &Config,
        credential: SharedCredential,
        media: Arc<MediaStore>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, cfg, credential, media))
    }

    pub fn with_client(
        client: Client,
        cfg: &Config,
        credential: SharedCredential,
        media: Arc<MediaStore>,
    ) -> Self {
        Self {
            client,
            cfg: cfg.clone(),
            credential,
            media,
        }
    }

    fn api_key(&self) -> Result<ApiKey, GenerationError> {
        self.credential.key().ok_or(GenerationError::MissingCredential)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.cfg.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    async fn post_json(
        &self,
        key: &ApiKey,
        url: String,
        body: &Value,
        timeout: Duration,
        what: &str,
    ) -> Result<Value, GenerationError> {
        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, key.expose())
            .json(body)
            .timeout(timeout)
            .send()
            .await?;
        read_json(resp, what).await
    }

    async fn poll_operation(&self, key: &ApiKey, name: &str) -> Result<Value, GenerationError> {
        let url = format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), name);
        let max = self.cfg.max_poll_attempts;

        for attempt in 1..=max {
            tokio::time::sleep(self.cfg.poll_interval()).await;

            let resp = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, key.expose())
                .timeout(Duration::from_secs(60))
                .send()
                .await?;
            let op = read_json(resp, "Veo operation").await?;

            if op.get("done").and_then(Value::as_bool) == Some(true) {
                logi(format!("Video operation finished after {} checks", attempt));
                return Ok(op);
            }
            tracing::debug!("video operation {name} still running ({attempt}/{max})");
        }

        Err(GenerationError::PollTimeout { attempts: max })
    }

    async fn download(&self, key: &ApiKey, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let resp = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, key.expose())
            .timeout(Duration::from_secs(300))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GenerationError::classify(&format!(
                "Failed to download video: {}",
                status
            )));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn store(&self, kind: MediaKind, bytes: &[u8]) -> Result<MediaHandle, GenerationError> {
        self.media
            .materialize(kind, bytes)
            .await
            .map_err(|e| GenerationError::Unknown(format!("{e:#}")))
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<MediaHandle, GenerationError> {
        let key = self.api_key()?;
        let body = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {
                "aspectRatio": aspect_ratio.as_str(),
                "resolution": aspect_ratio.resolution(),
                "sampleCount": 1,
            },
        });

        logi(format!(
            "Starting video generation ({}, {})",
            aspect_ratio,
            aspect_ratio.resolution()
        ));
        let url = self.model_url(&self.cfg.video_model, "predictLongRunning");
        let started = self
            .post_json(&key, url, &body, Duration::from_secs(120), "Veo request")
            .await?;
        let name = started
            .get("name")
            .and_then(Value::as_str)
            .ok_or(GenerationError::EmptyResult("operation"))?;

        let op = self.poll_operation(&key, name).await?;
        if let Some(message) = operation_error(&op) {
            logw(format!("Video operation failed: {}", message));
            return Err(GenerationError::classify(&format!(
                "Generation failed: {}",
                message
            )));
        }
        let uri = extract_video_uri(&op).ok_or(GenerationError::EmptyResult("video"))?;

        let bytes = self.download(&key, &uri).await?;
        let handle = self.store(MediaKind::Video, &bytes).await?;
        logok(format!("Video ready: {} bytes", bytes.len()));
        Ok(handle)
    }

    async fn generate_script(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.api_key()?;
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let url = self.model_url(&self.cfg.text_model, "generateContent");
        let root = self
            .post_json(&key, url, &body, Duration::from_secs(120), "Script request")
            .await?;
        Ok(extract_text(&root).unwrap_or_default())
    }

    async fn synthesize_speech(
        &self,
        text: &str,
        voice: Voice,
    ) -> Result<MediaHandle, GenerationError> {
        let key = self.api_key()?;
        let body = json!({
            "contents": [{"parts": [{"text": text}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {"voiceName": voice.as_str()},
                    },
                },
            },
        });

        let url = self.model_url(&self.cfg.tts_model, "generateContent");
        let root = self
            .post_json(&key, url, &body, Duration::from_secs(300), "TTS request")
            .await?;
        let encoded = extract_inline_audio(&root).ok_or(GenerationError::EmptyResult("audio"))?;
        let pcm = base64::decode(encoded)
            .map_err(|e| GenerationError::Unknown(format!("TTS payload decode failed: {e}")))?;

        let wav = wav::pcm_to_wav(&pcm, wav::SAMPLE_RATE);
        self.store(MediaKind::Audio, &wav).await
    }
}

async fn read_json(resp: reqwest::Response, what: &str) -> Result<Value, GenerationError> {
    let status = resp.status();
    let raw = resp.text().await?;

    if !status.is_success() {
        logw(format!("{} HTTP {}", what, status.as_u16()));
        if !raw.is_empty() {
            let snippet = raw.chars().take(RAW_SNIPPET_CHARS).collect::<String>();
            logw(format!("{} raw body: {}", what, snippet));
        }
        return Err(GenerationError::classify(&format!(
            "HTTP {}: {}",
            status.as_u16(),
            raw
        )));
    }

    serde_json::from_str(&raw)
        .map_err(|e| GenerationError::Unknown(format!("{what} response parse failed: {e}")))
}

fn operation_error(op: &Value) -> Option<String> {
    let err = op.get("error")?;
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Some(message.to_string())
}

/// Accepts both the REST (`generateVideoResponse.generatedSamples`) and the
/// SDK-style (`generatedVideos`) response shapes.
fn extract_video_uri(op: &Value) -> Option<String> {
    let response = op.get("response")?;
    let samples = response
        .pointer("/generateVideoResponse/generatedSamples")
        .or_else(|| response.get("generatedVideos"))?
        .as_array()?;
    samples
        .first()?
        .pointer("/video/uri")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_text(root: &Value) -> Option<String> {
    let parts = root.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn extract_inline_audio(root: &Value) -> Option<&str> {
    root.pointer("/candidates/0/content/parts/0/inlineData/data")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
