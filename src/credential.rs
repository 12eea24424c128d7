use std::fmt;
use std::sync::{Arc, RwLock};

/// API key wrapper that never prints its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Unset,
    Set(ApiKey),
    Cleared,
}

/// Credential shared between the session and the remote client.
///
/// Starts `Unset`, becomes `Set` through an explicit user action and may be
/// `Cleared` again. Every generation request reads it before going out.
#[derive(Debug, Clone)]
pub struct SharedCredential {
    inner: Arc<RwLock<CredentialState>>,
}

impl SharedCredential {
    pub fn unset() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CredentialState::Unset)),
        }
    }

    pub fn with_key(key: ApiKey) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CredentialState::Set(key))),
        }
    }

    pub fn set(&self, key: ApiKey) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = CredentialState::Set(key);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = CredentialState::Cleared;
    }

    pub fn state(&self) -> CredentialState {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn key(&self) -> Option<ApiKey> {
        match self.state() {
            CredentialState::Set(key) => Some(key),
            CredentialState::Unset | CredentialState::Cleared => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.key().is_some()
    }
}

impl Default for SharedCredential {
    fn default() -> Self {
        Self::unset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_unset_set_cleared() {
        let cred = SharedCredential::unset();
        assert_eq!(cred.state(), CredentialState::Unset);
        assert!(!cred.is_ready());

        let observer = cred.clone();
        cred.set(ApiKey::new("abc").unwrap());
        assert_eq!(observer.key().unwrap().expose(), "abc");

        cred.clear();
        assert_eq!(observer.state(), CredentialState::Cleared);
        assert!(observer.key().is_none());
    }

    #[test]
    fn blank_keys_are_refused() {
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(format!("{:?}", ApiKey::new("secret").unwrap()), "ApiKey(***)");
    }
}
