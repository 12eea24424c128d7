use crate::credential::SharedCredential;
use crate::error::GenerationError;
use crate::generator::{self, Generator};
use crate::history::{self, HistoryEntry, HistoryStore};
use crate::model::{AspectRatio, GeneratedVideo, GenerationOptions, VideoStatus};
use crate::{logi, logok, logw};
use std::time::Duration;

/// The user-facing generation flow: analyze a URL, review the suggested
/// prompt, generate, then replay or delete results from history.
pub struct GenerationSession<H: HistoryStore> {
    generator: Generator,
    credential: SharedCredential,
    store: H,
    analysis_delay: Duration,
    status: VideoStatus,
    current: Option<GeneratedVideo>,
    error: Option<String>,
    draft_prompt: Option<String>,
    history: Vec<GeneratedVideo>,
}

impl<H: HistoryStore> GenerationSession<H> {
    pub fn new(
        generator: Generator,
        credential: SharedCredential,
        store: H,
        analysis_delay: Duration,
    ) -> Self {
        Self {
            generator,
            credential,
            store,
            analysis_delay,
            status: VideoStatus::Idle,
            current: None,
            error: None,
            draft_prompt: None,
            history: Vec::new(),
        }
    }

    pub fn status(&self) -> VideoStatus {
        self.status
    }

    pub fn current(&self) -> Option<&GeneratedVideo> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft_prompt(&self) -> Option<&str> {
        self.draft_prompt.as_deref()
    }

    pub fn history(&self) -> &[GeneratedVideo] {
        &self.history
    }

    pub fn credential(&self) -> &SharedCredential {
        &self.credential
    }

    /// Replaces in-memory history with what the store holds. A store that
    /// cannot be read leaves the session with an empty history.
    pub async fn load_history(&mut self) {
        self.history = match self.store.load_all().await {
            Ok(records) => records,
            Err(err) => {
                logw(format!("Failed to load history: {:#}", err));
                Vec::new()
            }
        };
    }

    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        history::sorted_for_display(&self.history).await
    }

    fn fail(&mut self, err: GenerationError) -> GenerationError {
        self.status = VideoStatus::Failed;
        self.error = Some(err.to_string());
        err
    }

    /// Validates the input and proposes a style prompt for review.
    pub async fn analyze(
        &mut self,
        input: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<String, GenerationError> {
        self.error = None;
        self.status = VideoStatus::Idle;

        if input.trim().is_empty() {
            return Err(self.fail(GenerationError::EmptyUrl));
        }
        if !self.credential.is_ready() {
            return Err(GenerationError::MissingCredential);
        }
        let url = match generator::normalize_url(input) {
            Ok(url) => url,
            Err(err) => return Err(self.fail(err)),
        };

        self.status = VideoStatus::Analyzing;
        self.current = Some(GeneratedVideo::pending(url.clone(), aspect_ratio));
        logi(format!("Analyzing {}...", url));
        if !self.analysis_delay.is_zero() {
            tokio::time::sleep(self.analysis_delay).await;
        }

        let theme = generator::suggest_theme(&url).to_string();
        self.draft_prompt = Some(theme.clone());
        Ok(theme)
    }

    pub fn update_prompt(&mut self, prompt: impl Into<String>) {
        if self.draft_prompt.is_some() {
            self.draft_prompt = Some(prompt.into());
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.draft_prompt = None;
        self.status = VideoStatus::Idle;
    }

    /// Generates from the reviewed prompt. On success the result becomes
    /// current and is recorded in history.
    pub async fn confirm(
        &mut self,
        options: GenerationOptions,
    ) -> Result<GeneratedVideo, GenerationError> {
        let draft = match (&self.current, &self.draft_prompt) {
            (Some(draft), Some(_)) => draft.clone(),
            _ => {
                return Err(GenerationError::Unknown(
                    "no analyzed URL awaiting confirmation".to_string(),
                ));
            }
        };
        let prompt = self.draft_prompt.take().unwrap_or_default();

        self.status = VideoStatus::Generating;
        if let Some(current) = self.current.as_mut() {
            current.status = VideoStatus::Generating;
        }

        match self.generator.generate(&draft, &prompt, &options).await {
            Ok(video) => {
                self.status = VideoStatus::Completed;
                self.current = Some(video.clone());
                self.record(&video).await;
                logok(format!("Generation {} completed", video.id));
                Ok(video)
            }
            Err(err) => {
                logw(format!("Generation failed: {}", err));
                if let Some(current) = self.current.as_mut() {
                    current.status = VideoStatus::Failed;
                }
                Err(self.fail(err))
            }
        }
    }

    async fn record(&mut self, video: &GeneratedVideo) {
        self.history.insert(0, video.clone());
        if let Err(err) = self.store.append(video).await {
            logw(format!("Failed to persist history entry {}: {:#}", video.id, err));
        }
    }

    pub fn reset(&mut self) {
        self.status = VideoStatus::Idle;
        self.current = None;
        self.draft_prompt = None;
        self.error = None;
    }

    /// Makes a history entry current. Expired entries cannot be replayed.
    pub async fn play_from_history(&mut self, id: &str) -> bool {
        let Some(video) = self.history.iter().find(|v| v.id == id) else {
            return false;
        };
        let playable = match &video.video_url {
            Some(handle) => handle.is_available().await,
            None => false,
        };
        if !playable {
            return false;
        }
        self.current = Some(video.clone());
        self.status = VideoStatus::Completed;
        true
    }

    pub async fn delete(&mut self, id: &str) -> anyhow::Result<()> {
        self.history.retain(|v| v.id != id);
        self.store.remove(id).await?;

        if self.current.as_ref().is_some_and(|v| v.id == id) {
            self.current = None;
            self.status = VideoStatus::Idle;
        }
        Ok(())
    }
}
