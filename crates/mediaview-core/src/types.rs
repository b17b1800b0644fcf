//! Core types for the playback controller

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one decoder session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel dimensions. A zero in either axis means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const UNKNOWN: Size = Size { width: 0, height: 0 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are positive
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
        let height = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
        Ok(Size::new(width, height))
    }
}

/// Playback state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No render surface yet
    Startup,
    /// Decoder is preparing the source
    Loading,
    /// User is dragging the seek control
    Seeking,
    /// Content is playing
    Playing,
    /// Playback paused
    Paused,
    /// No active session
    Stopped,
}

impl PlaybackState {
    /// Check if transition to target state is valid.
    ///
    /// Teardown forces `Stopped` from any state and does not consult this table.
    pub fn can_transition_to(&self, target: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, target),
            // From Startup
            (Startup, Stopped) |
            // From Stopped
            (Stopped, Loading) | (Stopped, Stopped) |
            // From Loading
            (Loading, Playing) | (Loading, Stopped) |
            // From Playing
            (Playing, Paused) | (Playing, Seeking) | (Playing, Stopped) |
            // From Paused
            (Paused, Playing) | (Paused, Seeking) | (Paused, Stopped) |
            // From Seeking
            (Seeking, Playing) | (Seeking, Stopped)
        )
    }

    /// A decoder session exists in this state
    pub fn has_session(&self) -> bool {
        matches!(
            self,
            PlaybackState::Loading
                | PlaybackState::Seeking
                | PlaybackState::Playing
                | PlaybackState::Paused
        )
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Startup => write!(f, "startup"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Seeking => write!(f, "seeking"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Classification of decoder info codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    Unknown,
    VideoTrackLagging,
    BufferingStart,
    BufferingEnd,
    BadInterleaving,
    NotSeekable,
    MetadataUpdate,
}

impl InfoKind {
    pub const UNKNOWN: i32 = 1;
    pub const VIDEO_TRACK_LAGGING: i32 = 700;
    pub const BUFFERING_START: i32 = 701;
    pub const BUFFERING_END: i32 = 702;
    pub const BAD_INTERLEAVING: i32 = 800;
    pub const NOT_SEEKABLE: i32 = 801;
    pub const METADATA_UPDATE: i32 = 802;

    /// Map a raw decoder info code
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::VIDEO_TRACK_LAGGING => InfoKind::VideoTrackLagging,
            Self::BUFFERING_START => InfoKind::BufferingStart,
            Self::BUFFERING_END => InfoKind::BufferingEnd,
            Self::BAD_INTERLEAVING => InfoKind::BadInterleaving,
            Self::NOT_SEEKABLE => InfoKind::NotSeekable,
            Self::METADATA_UPDATE => InfoKind::MetadataUpdate,
            _ => InfoKind::Unknown,
        }
    }
}

impl std::fmt::Display for InfoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfoKind::Unknown => write!(f, "Unknown info"),
            InfoKind::VideoTrackLagging => write!(f, "Video track lagging"),
            InfoKind::BufferingStart => write!(f, "Buffering started"),
            InfoKind::BufferingEnd => write!(f, "Buffering finished"),
            InfoKind::BadInterleaving => write!(f, "Bad interleaving"),
            InfoKind::NotSeekable => write!(f, "Content is not seekable"),
            InfoKind::MetadataUpdate => write!(f, "Metadata updated"),
        }
    }
}
