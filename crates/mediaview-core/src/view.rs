//! View model - the visual state of the playback widgets
//!
//! Front ends render a [`ViewModel`] snapshot; only the controller mutates it.

use crate::types::{InfoKind, PlaybackState, Size};
use serde::Serialize;

/// Image shown on the play/pause control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayIcon {
    Play,
    Pause,
}

/// Control bar treatment for one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPolicy {
    pub play_enabled: bool,
    pub icon: PlayIcon,
    pub seek_enabled: bool,
}

impl ControlPolicy {
    /// Widget policy per state. `Seeking` keeps whatever was shown before.
    pub fn for_state(state: PlaybackState) -> Option<ControlPolicy> {
        let (play_enabled, icon, seek_enabled) = match state {
            PlaybackState::Startup => (false, PlayIcon::Play, false),
            PlaybackState::Loading => (true, PlayIcon::Play, true),
            PlaybackState::Seeking => return None,
            PlaybackState::Playing => (true, PlayIcon::Pause, true),
            PlaybackState::Paused => (true, PlayIcon::Play, true),
            PlaybackState::Stopped => (true, PlayIcon::Play, false),
        };

        Some(ControlPolicy {
            play_enabled,
            icon,
            seek_enabled,
        })
    }

    /// Whether the source input accepts edits in `state`
    pub fn input_enabled(state: PlaybackState) -> bool {
        !matches!(
            state,
            PlaybackState::Loading | PlaybackState::Seeking | PlaybackState::Playing
        )
    }
}

/// Status line messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Status {
    Preparing,
    Buffering(u8),
    Stopped,
    StopError,
    Completed,
    Error,
    InvalidUrl,
    InvalidContent,
    SurfaceUnavailable,
    Info(InfoKind),
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Preparing => write!(f, "Preparing video..."),
            Status::Buffering(percent) => write!(f, "Buffering {percent}%"),
            Status::Stopped => write!(f, "Stopped"),
            Status::StopError => write!(f, "Unable to stop: nothing is playing"),
            Status::Completed => write!(f, "Playback completed"),
            Status::Error => write!(f, "Playback error"),
            Status::InvalidUrl => write!(f, "Invalid URL: use an .mp4, .3gp or .3gpp source"),
            Status::InvalidContent => write!(f, "Unable to play this content"),
            Status::SurfaceUnavailable => write!(f, "Video surface is not ready"),
            Status::Info(kind) => write!(f, "{kind}"),
        }
    }
}

/// Play/pause control and seek indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlBar {
    pub play_enabled: bool,
    pub icon: PlayIcon,
    pub seek_enabled: bool,
    /// Seek indicator position (ms)
    pub progress: u32,
    /// Seek indicator range (ms)
    pub max: u32,
}

impl Default for ControlBar {
    fn default() -> Self {
        Self {
            play_enabled: false,
            icon: PlayIcon::Play,
            seek_enabled: false,
            progress: 0,
            max: 0,
        }
    }
}

impl ControlBar {
    pub fn apply_state(&mut self, state: PlaybackState) {
        if let Some(policy) = ControlPolicy::for_state(state) {
            self.play_enabled = policy.play_enabled;
            self.icon = policy.icon;
            self.seek_enabled = policy.seek_enabled;
        }
    }

    /// Zero the indicator and set its range
    pub fn reset_seek(&mut self, max: u32) {
        self.progress = 0;
        self.max = max;
    }

    pub fn set_progress(&mut self, progress: u32) {
        self.progress = progress.min(self.max);
    }
}

/// Status line and source input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBar {
    pub status: Option<Status>,
    pub input: String,
    pub input_enabled: bool,
}

impl StatusBar {
    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }
}

/// Volume indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VolumeBar {
    pub level: u32,
    pub max: u32,
}

/// Visual state of the whole playback view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub control_bar: ControlBar,
    pub status_bar: StatusBar,
    pub volume: VolumeBar,
    /// Status bar, control bar and volume control are shown
    pub overlay_visible: bool,
    /// Fixed size last requested from the render surface
    pub render_size: Option<Size>,
}

impl Default for ViewModel {
    fn default() -> Self {
        let mut view = Self {
            control_bar: ControlBar::default(),
            status_bar: StatusBar::default(),
            volume: VolumeBar::default(),
            overlay_visible: true,
            render_size: None,
        };
        view.apply_state(PlaybackState::Startup);
        view
    }
}

impl ViewModel {
    /// Apply the widget policy for `state`
    pub fn apply_state(&mut self, state: PlaybackState) {
        self.status_bar.input_enabled = ControlPolicy::input_enabled(state);
        self.control_bar.apply_state(state);
    }
}
