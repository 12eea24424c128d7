use thiserror::Error;

/// Terminal failure of a generation flow, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Please enter a website URL.")]
    EmptyUrl,
    #[error("Invalid URL format.")]
    InvalidUrl,
    #[error("API Key not available. Please connect your API key first.")]
    MissingCredential,
    #[error("Authentication failed. Please reconnect your API Key.")]
    Authentication,
    #[error("Service is busy (Quota Exceeded). Please try again in a minute.")]
    QuotaExceeded,
    #[error("Session expired. Please reconnect your API Key to proceed.")]
    SessionExpired,
    #[error("Generation blocked by safety settings. Try a different website URL.")]
    SafetyBlocked,
    #[error("The video service is experiencing temporary issues. Please try again later.")]
    ServiceUnavailable,
    #[error("Network connection issue. Please check your internet.")]
    Network,
    #[error("The AI service completed but returned no {0}.")]
    EmptyResult(&'static str),
    #[error("Video generation did not finish after {attempts} status checks.")]
    PollTimeout { attempts: u32 },
    #[error("An unexpected error occurred: {0}")]
    Unknown(String),
}

impl GenerationError {
    /// Maps raw error text from the remote service onto the taxonomy.
    pub fn classify(raw: &str) -> Self {
        let has = |needle: &str| raw.contains(needle);

        if has("403") || has("API key") || has("PERMISSION_DENIED") {
            Self::Authentication
        } else if has("429") || has("Resource has been exhausted") {
            Self::QuotaExceeded
        } else if has("Requested entity was not found") {
            Self::SessionExpired
        } else if has("SAFETY") || has("blocked") {
            Self::SafetyBlocked
        } else if has("500") || has("Internal") {
            Self::ServiceUnavailable
        } else if has("Failed to fetch") || has("Network") {
            Self::Network
        } else {
            Self::Unknown(raw.chars().take(300).collect())
        }
    }

    /// The user has to connect the credential again before retrying.
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::Authentication | Self::SessionExpired
        )
    }

    /// Retrying later with the same input may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded | Self::ServiceUnavailable | Self::Network | Self::PollTimeout { .. }
        )
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            return Self::Network;
        }
        if let Some(status) = err.status() {
            return Self::classify(&status.as_u16().to_string());
        }
        Self::classify(&err.to_string())
    }
}

/// Non-fatal failures reported by the media layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback start rejected: {0}")]
    StartRejected(String),
    #[error("fullscreen request failed: {0}")]
    Fullscreen(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_remote_error_text() {
        assert_eq!(
            GenerationError::classify("HTTP 403: PERMISSION_DENIED"),
            GenerationError::Authentication
        );
        assert_eq!(
            GenerationError::classify("Resource has been exhausted (e.g. check quota)."),
            GenerationError::QuotaExceeded
        );
        assert_eq!(
            GenerationError::classify("Requested entity was not found."),
            GenerationError::SessionExpired
        );
        assert_eq!(
            GenerationError::classify("Generation failed: prompt blocked by SAFETY filter"),
            GenerationError::SafetyBlocked
        );
        assert_eq!(
            GenerationError::classify("HTTP 500: Internal error encountered."),
            GenerationError::ServiceUnavailable
        );
        assert_eq!(
            GenerationError::classify("TypeError: Failed to fetch"),
            GenerationError::Network
        );
        assert!(matches!(
            GenerationError::classify("something odd"),
            GenerationError::Unknown(_)
        ));
    }

    #[test]
    fn authentication_wins_over_later_patterns() {
        // "API key" and "Internal" both present; the first rule applies.
        assert_eq!(
            GenerationError::classify("Internal: API key not valid"),
            GenerationError::Authentication
        );
    }

    #[test]
    fn reconnect_and_transient_flags() {
        assert!(GenerationError::SessionExpired.requires_reconnect());
        assert!(!GenerationError::SafetyBlocked.requires_reconnect());
        assert!(GenerationError::QuotaExceeded.is_transient());
        assert!(!GenerationError::SafetyBlocked.is_transient());
    }
}
