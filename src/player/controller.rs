use super::source::{PlaybackSource, StartReport};
use super::{FullscreenHost, MediaTrack, PlaybackSession};
use tracing::{debug, error, warn};

/// Where the user clicked on the progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekPosition {
    Ratio(f64),
    /// Pointer x and the bar's left edge/width, in the same units.
    Pixel { x: f64, left: f64, width: f64 },
}

impl SeekPosition {
    fn ratio(self) -> f64 {
        let ratio = match self {
            Self::Ratio(r) => r,
            Self::Pixel { x, left, width } => {
                if width.is_nan() || width <= 0.0 {
                    return 0.0;
                }
                (x - left).clamp(0.0, width) / width
            }
        };
        if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
    }
}

/// Transport controls over one [`PlaybackSource`].
#[derive(Debug)]
pub struct PlayerController<T> {
    source: Option<PlaybackSource<T>>,
    session: PlaybackSession,
}

impl<T: MediaTrack> Default for PlayerController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MediaTrack> PlayerController<T> {
    pub fn new() -> Self {
        Self {
            source: None,
            session: PlaybackSession::default(),
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn source(&self) -> Option<&PlaybackSource<T>> {
        self.source.as_ref()
    }

    /// Swaps in a new resource pair. Without a video there is nothing to
    /// render and the call is ignored.
    pub fn attach(&mut self, video: Option<T>, audio: Option<T>) -> bool {
        let Some(video) = video else {
            debug!("attach ignored: no video resource");
            return false;
        };

        if let Some(old) = self.source.as_mut() {
            old.pause_all();
        }

        let mut source = PlaybackSource::new(video, audio);
        source.rewind_all();
        let track_volume = if self.session.muted {
            self.session.last_volume
        } else {
            self.session.volume
        };
        let muted = self.session.muted;
        source.for_each_track(|track| {
            track.set_volume(track_volume);
            track.set_muted(muted);
        });

        self.session.rewind();
        self.source = Some(source);
        true
    }

    /// Pauses when playing, otherwise starts master and slave together.
    /// Returns the start outcome when a start was issued.
    pub async fn toggle_play(&mut self) -> Option<StartReport> {
        let source = self.source.as_mut()?;

        let report = if self.session.playing {
            source.pause_all();
            None
        } else {
            let report = source.start().await;
            if let Err(err) = &report.master {
                error!("master track failed to start: {err}");
            }
            if let Some(Err(err)) = &report.slave {
                error!("background video failed to start: {err}");
            }
            if !report.is_consistent() {
                warn!("session marked playing while a track refused to start");
            }
            Some(report)
        };

        self.session.playing = !self.session.playing;
        report
    }

    /// Jumps to a point on the bar. Returns false while the master's
    /// duration is still unknown.
    pub fn seek(&mut self, position: SeekPosition) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };

        let duration = source.master().duration();
        if !duration.is_finite() {
            return false;
        }

        let ratio = position.ratio();
        let target = ratio * duration;
        source.seek_to(target);

        self.session.progress = ratio;
        self.session.current_time = target;
        true
    }

    /// Volume 0 mutes; anything above 0 while muted unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.session.volume = volume;

        let flip_mute = if volume > 0.0 && self.session.muted {
            Some(false)
        } else if volume == 0.0 && !self.session.muted {
            Some(true)
        } else {
            None
        };
        if let Some(muted) = flip_mute {
            self.session.muted = muted;
        }

        if let Some(source) = self.source.as_mut() {
            source.for_each_track(|track| {
                if let Some(muted) = flip_mute {
                    track.set_muted(muted);
                }
                track.set_volume(volume);
            });
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.session.muted {
            let restore = if self.session.last_volume > 0.0 {
                self.session.last_volume
            } else {
                1.0
            };
            self.session.volume = restore;
            self.session.muted = false;
            if let Some(source) = self.source.as_mut() {
                source.for_each_track(|track| {
                    track.set_volume(restore);
                    track.set_muted(false);
                });
            }
        } else {
            self.session.last_volume = if self.session.volume > 0.0 {
                self.session.volume
            } else {
                1.0
            };
            self.session.volume = 0.0;
            self.session.muted = true;
            if let Some(source) = self.source.as_mut() {
                source.for_each_track(|track| track.set_muted(true));
            }
        }
    }

    /// Enters or leaves fullscreen on `host`. The flag itself only changes
    /// through [`Self::on_fullscreen_change`].
    pub async fn toggle_fullscreen<H: FullscreenHost>(&mut self, host: &mut H) -> bool {
        if self.source.is_none() {
            return false;
        }

        let result = if host.is_fullscreen() {
            host.exit_fullscreen().await
        } else {
            host.request_fullscreen().await
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                error!("fullscreen toggle failed: {err}");
                false
            }
        }
    }

    pub fn on_fullscreen_change(&mut self, active: bool) {
        self.session.fullscreen = active;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.session.dragging = dragging;
    }

    /// Timing-update tick from the master track.
    pub fn periodic_update(&mut self) {
        if self.session.dragging {
            return;
        }
        let Some(source) = self.source.as_ref() else {
            return;
        };

        let (current, duration) = source.timing();
        let duration = if duration.is_finite() { duration } else { 0.0 };
        self.session.current_time = current;
        self.session.duration = duration;
        self.session.progress = if duration > 0.0 {
            (current / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if source.master_ended() {
            self.on_ended();
        }
    }

    /// The master track reached its end.
    pub fn on_ended(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.finish();
        }
        self.session.playing = false;
    }
}
