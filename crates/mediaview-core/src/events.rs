//! Events delivered to the UI event loop

use crate::types::{SessionId, Size};
use serde::{Deserialize, Serialize};

/// Asynchronous notifications from the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecoderEvent {
    /// Source is prepared and can start
    Prepared,
    /// Network buffering progress (percent)
    BufferingProgress { percent: u8 },
    /// Intrinsic video size became known or changed
    VideoSizeChanged { width: u32, height: u32 },
    /// Informational notice
    Info { what: i32, extra: i32 },
    /// Unrecoverable error
    Error { what: i32, extra: i32 },
    /// End of content reached
    Completion,
}

/// Everything the controller reacts to, delivered serially
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// User edited the source input field
    InputChanged(String),
    /// Play/pause control tapped
    PlayPressed,
    /// Tap on the render surface
    SurfaceTapped,
    /// Seek control drag began
    SeekStarted,
    /// Seek control dragged to a position (ms)
    SeekMoved(u32),
    /// Seek control released
    SeekReleased,
    /// Volume buttons: step by the configured fraction
    VolumeIncrease,
    VolumeDecrease,
    /// Volume slider set to an absolute level
    VolumeSet(u32),
    /// Hardware volume keys: step through the audio service
    VolumeKeyUp,
    VolumeKeyDown,
    /// Render surface lifecycle
    SurfaceCreated,
    SurfaceChanged(Size),
    SurfaceDestroyed,
    /// Explicit stop, or the screen was paused
    Stop,
    /// Screen destroyed; tear down and leave the loop
    Shutdown,
    /// Decoder callback for a session
    Decoder {
        session: SessionId,
        event: DecoderEvent,
    },
    /// Position sampled by the progress sampler (ms)
    Progress { session: SessionId, position: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_event_json() {
        let json = serde_json::to_string(&DecoderEvent::BufferingProgress { percent: 40 }).unwrap();
        assert_eq!(json, r#"{"event":"buffering_progress","percent":40}"#);

        let event: DecoderEvent = serde_json::from_str(r#"{"event":"completion"}"#).unwrap();
        assert_eq!(event, DecoderEvent::Completion);
    }
}
