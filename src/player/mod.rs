//! Dual-track playback: a looping visual track plus an optional voiceover,
//! presented as one timeline with a single set of transport controls.
//!
//! The crate ships no concrete media backend. Hosts embedding the player
//! supply their own [`MediaTrack`] and [`FullscreenHost`] adapters and drive
//! [`PlayerController`] from their UI events and refresh timer.

mod controller;
mod source;

pub use controller::{PlayerController, SeekPosition};
pub use source::{PlaybackSource, StartReport};

use crate::error::PlaybackError;
use async_trait::async_trait;

/// One independently buffered media element.
#[async_trait]
pub trait MediaTrack: Send {
    /// Starts playback. The media layer may refuse (not ready, autoplay
    /// policy, ...).
    async fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Seconds; `NaN` until metadata is loaded.
    fn duration(&self) -> f64;
    fn ended(&self) -> bool;
    fn set_looping(&mut self, looping: bool);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
}

/// The visual container the player can take fullscreen.
///
/// Fullscreen can also be left by means outside the player, so hosts must
/// report every change through [`PlayerController::on_fullscreen_change`].
#[async_trait]
pub trait FullscreenHost: Send {
    fn is_fullscreen(&self) -> bool;
    async fn request_fullscreen(&mut self) -> Result<(), PlaybackError>;
    async fn exit_fullscreen(&mut self) -> Result<(), PlaybackError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub playing: bool,
    pub current_time: f64,
    pub duration: f64,
    /// Ratio in [0, 1].
    pub progress: f64,
    /// Displayed volume in [0, 1]; 0 while muted.
    pub volume: f64,
    pub muted: bool,
    /// Restore point for unmute.
    pub last_volume: f64,
    pub fullscreen: bool,
    pub dragging: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            playing: false,
            current_time: 0.0,
            duration: 0.0,
            progress: 0.0,
            volume: 1.0,
            muted: false,
            last_volume: 1.0,
            fullscreen: false,
            dragging: false,
        }
    }
}

impl PlaybackSession {
    fn rewind(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.progress = 0.0;
    }
}

/// `m:ss`, or `0:00` for unknown times.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::Cell;

    /// Scriptable in-memory track.
    #[derive(Debug)]
    pub struct FakeTrack {
        pub time: f64,
        pub length: f64,
        pub is_ended: bool,
        pub looping: bool,
        pub volume: f64,
        pub muted: bool,
        pub playing: bool,
        pub reject_play: bool,
        pub time_reads: Cell<u32>,
        pub duration_reads: Cell<u32>,
    }

    impl FakeTrack {
        pub fn new(length: f64) -> Self {
            Self {
                time: 0.0,
                length,
                is_ended: false,
                looping: false,
                volume: 1.0,
                muted: false,
                playing: false,
                reject_play: false,
                time_reads: Cell::new(0),
                duration_reads: Cell::new(0),
            }
        }

        pub fn rejecting(length: f64) -> Self {
            Self {
                reject_play: true,
                ..Self::new(length)
            }
        }
    }

    #[async_trait]
    impl MediaTrack for FakeTrack {
        async fn play(&mut self) -> Result<(), PlaybackError> {
            if self.reject_play {
                return Err(PlaybackError::StartRejected("NotAllowedError".into()));
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn current_time(&self) -> f64 {
            self.time_reads.set(self.time_reads.get() + 1);
            self.time
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.time = seconds;
        }

        fn duration(&self) -> f64 {
            self.duration_reads.set(self.duration_reads.get() + 1);
            self.length
        }

        fn ended(&self) -> bool {
            self.is_ended
        }

        fn set_looping(&mut self, looping: bool) {
            self.looping = looping;
        }

        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub active: bool,
        pub fail: bool,
        pub requests: u32,
        pub exits: u32,
    }

    #[async_trait]
    impl FullscreenHost for FakeHost {
        fn is_fullscreen(&self) -> bool {
            self.active
        }

        async fn request_fullscreen(&mut self) -> Result<(), PlaybackError> {
            self.requests += 1;
            if self.fail {
                return Err(PlaybackError::Fullscreen("denied".into()));
            }
            self.active = true;
            Ok(())
        }

        async fn exit_fullscreen(&mut self) -> Result<(), PlaybackError> {
            self.exits += 1;
            self.active = false;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.7), "0:09");
        assert_eq!(format_time(75.2), "1:15");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
