use super::MediaTrack;
use crate::error::PlaybackError;

/// Which track owns the timeline.
///
/// With a voiceover the audio is master and the video is a looping
/// background whose timing is never used for display. Without one the video
/// is master. Only this type decides which track is which.
#[derive(Debug)]
pub enum PlaybackSource<T> {
    VideoOnly { video: T },
    AudioLed { audio: T, video: T },
}

/// Outcome of a concurrent start request.
#[derive(Debug)]
pub struct StartReport {
    pub master: Result<(), PlaybackError>,
    pub slave: Option<Result<(), PlaybackError>>,
}

impl StartReport {
    /// False when a track refused to start while the session reports playing.
    pub fn is_consistent(&self) -> bool {
        self.master.is_ok() && self.slave.as_ref().is_none_or(|r| r.is_ok())
    }
}

impl<T: MediaTrack> PlaybackSource<T> {
    /// The service only returns short clips, so the video loops in both
    /// variants.
    pub fn new(mut video: T, audio: Option<T>) -> Self {
        video.set_looping(true);
        match audio {
            Some(audio) => Self::AudioLed { audio, video },
            None => Self::VideoOnly { video },
        }
    }

    pub fn has_voiceover(&self) -> bool {
        matches!(self, Self::AudioLed { .. })
    }

    pub fn video(&self) -> &T {
        match self {
            Self::VideoOnly { video } | Self::AudioLed { video, .. } => video,
        }
    }

    pub fn audio(&self) -> Option<&T> {
        match self {
            Self::VideoOnly { .. } => None,
            Self::AudioLed { audio, .. } => Some(audio),
        }
    }

    pub fn master(&self) -> &T {
        match self {
            Self::VideoOnly { video } => video,
            Self::AudioLed { audio, .. } => audio,
        }
    }

    /// `(current_time, duration)` of the master track.
    pub fn timing(&self) -> (f64, f64) {
        let master = self.master();
        (master.current_time(), master.duration())
    }

    pub fn master_ended(&self) -> bool {
        self.master().ended()
    }

    pub fn for_each_track(&mut self, mut f: impl FnMut(&mut T)) {
        match self {
            Self::VideoOnly { video } => f(video),
            Self::AudioLed { audio, video } => {
                f(audio);
                f(video);
            }
        }
    }

    /// Issues both start requests concurrently; neither is rolled back when
    /// the other fails.
    pub async fn start(&mut self) -> StartReport {
        match self {
            Self::VideoOnly { video } => StartReport {
                master: video.play().await,
                slave: None,
            },
            Self::AudioLed { audio, video } => {
                let (master, slave) = tokio::join!(audio.play(), video.play());
                StartReport {
                    master,
                    slave: Some(slave),
                }
            }
        }
    }

    pub fn pause_all(&mut self) {
        self.for_each_track(|track| track.pause());
    }

    pub fn rewind_all(&mut self) {
        self.for_each_track(|track| {
            track.pause();
            track.set_current_time(0.0);
        });
    }

    /// Moves the master to `target`. A looping background video is placed at
    /// `target mod video_duration` instead of an out-of-range timestamp.
    pub fn seek_to(&mut self, target: f64) {
        match self {
            Self::VideoOnly { video } => video.set_current_time(target),
            Self::AudioLed { audio, video } => {
                audio.set_current_time(target);
                let clip = video.duration();
                let clip = if clip.is_finite() && clip > 0.0 { clip } else { 1.0 };
                video.set_current_time(target % clip);
            }
        }
    }

    /// Playback reached the end of the master.
    pub fn finish(&mut self) {
        self.pause_all();
        if let Self::AudioLed { audio, .. } = self {
            audio.set_current_time(0.0);
        }
    }
}
