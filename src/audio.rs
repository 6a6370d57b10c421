//! Two-track audio director
//!
//! The scene carries a one-shot greeting and a looping music bed. Playback
//! can be rejected by the host's autoplay policy at any time, so tracks are
//! driven through a fire-and-request interface whose outcome is observed by
//! polling: the director reconciles each frame, raises a passive sound hint
//! while blocked, and transparently retries on the next user gesture of any
//! kind. Rejection is never surfaced as an error.

/// Observed playback state of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// Never asked to play (or stopped).
    Idle,
    /// Play requested, outcome not known yet.
    Requested,
    Playing,
    /// The host rejected playback (autoplay policy).
    Blocked,
    /// A one-shot track finished.
    Ended,
}

/// Narrow interface over a host audio element.
pub trait AudioTrack {
    /// (Re)start from the beginning. The outcome shows up in [`status`]
    /// asynchronously; a rejection must resolve to [`TrackStatus::Blocked`].
    ///
    /// [`status`]: AudioTrack::status
    fn request_play(&mut self);
    fn status(&self) -> TrackStatus;
    fn set_volume(&mut self, volume: f32);
    fn set_looping(&mut self, looping: bool);
}

/// Owns both tracks and the blocked/retry state machine.
pub struct AudioDirector {
    greeting: Option<Box<dyn AudioTrack>>,
    music: Option<Box<dyn AudioTrack>>,
    enabled: bool,
    begun: bool,
    blocked: bool,
    music_started: bool,
}

impl AudioDirector {
    pub fn new(enabled: bool) -> Self {
        Self {
            greeting: None,
            music: None,
            enabled,
            begun: false,
            blocked: false,
            music_started: false,
        }
    }

    /// Install the one-shot greeting track.
    pub fn set_greeting(&mut self, mut track: Box<dyn AudioTrack>, volume: f32) {
        track.set_volume(volume);
        track.set_looping(false);
        self.greeting = Some(track);
    }

    /// Install the looping music bed.
    pub fn set_music(&mut self, mut track: Box<dyn AudioTrack>, volume: f32) {
        track.set_volume(volume);
        track.set_looping(true);
        self.music = Some(track);
    }

    /// The crawl is starting: play the greeting if there is one. With no
    /// greeting installed, the next [`update`] starts the music directly.
    ///
    /// [`update`]: AudioDirector::update
    pub fn begin(&mut self) {
        if !self.enabled || self.begun {
            return;
        }
        self.begun = true;
        if let Some(greeting) = &mut self.greeting {
            greeting.request_play();
        }
    }

    /// Any user gesture: retry whichever track should currently be audible.
    /// Does nothing unless playback is actually blocked.
    pub fn on_user_gesture(&mut self) {
        if !self.enabled || !self.blocked {
            return;
        }
        match &mut self.greeting {
            Some(greeting) if greeting.status() != TrackStatus::Ended => greeting.request_play(),
            _ => {
                if let Some(music) = &mut self.music {
                    music.request_play();
                }
            }
        }
    }

    /// Per-frame reconciliation: hand off greeting→music on end, and keep the
    /// blocked flag in sync with whichever track should be audible now.
    pub fn update(&mut self) {
        if !self.enabled || !self.begun {
            return;
        }

        let greeting_done = match self.greeting.as_ref().map(|t| t.status()) {
            None | Some(TrackStatus::Ended) => true,
            _ => false,
        };

        if greeting_done {
            if let Some(music) = &mut self.music {
                match music.status() {
                    TrackStatus::Idle => music.request_play(),
                    TrackStatus::Playing => {
                        self.music_started = true;
                        self.blocked = false;
                    }
                    TrackStatus::Blocked => self.blocked = true,
                    _ => {}
                }
            }
        } else if let Some(greeting) = &self.greeting {
            match greeting.status() {
                TrackStatus::Playing => self.blocked = false,
                TrackStatus::Blocked => self.blocked = true,
                _ => {}
            }
        }
    }

    /// Whether the passive "sound is waiting for you" hint should show.
    pub fn hint_visible(&self) -> bool {
        self.blocked
    }

    pub fn music_started(&self) -> bool {
        self.music_started
    }
}
