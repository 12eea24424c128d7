pub mod gemini;

use crate::error::GenerationError;
use crate::media::MediaHandle;
use crate::model::{AspectRatio, Voice};
use async_trait::async_trait;

/// Remote generative service the orchestrator talks to.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Long-running: resolves once the rendered clip is materialized.
    async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<MediaHandle, GenerationError>;

    /// May return an empty string when the model produced no text.
    async fn generate_script(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn synthesize_speech(&self, text: &str, voice: Voice)
    -> Result<MediaHandle, GenerationError>;
}
