use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

pub mod api;
pub mod config;
pub mod credential;
pub mod error;
pub mod generator;
pub mod history;
pub mod init;
pub mod media;
pub mod model;
pub mod player;
pub mod session;
pub mod wav;

/// Receives each tagged progress line (`[INFO] ...`, `[WARN] ...`).
pub type ProgressHook = Arc<dyn Fn(&str) + Send + Sync + 'static>;

static PROGRESS_HOOK: Lazy<RwLock<Option<ProgressHook>>> = Lazy::new(|| RwLock::new(None));

/// Mirrors generation progress into a front-end. `None` detaches it.
pub fn set_progress_hook(hook: Option<ProgressHook>) {
    if let Ok(mut slot) = PROGRESS_HOOK.write() {
        *slot = hook;
    }
}

fn progress(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!("{}", message),
        _ => tracing::info!("[{}] {}", tag, message),
    }

    let hook = PROGRESS_HOOK.read().ok().and_then(|slot| slot.clone());
    if let Some(hook) = hook {
        hook(&format!("[{}] {}", tag, message));
    }
}

pub(crate) fn logi(message: impl AsRef<str>) {
    progress("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    progress("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    progress("WARN", message.as_ref());
}
