//! Host platform collaborators
//!
//! The controller never reaches for global services. Everything it talks to
//! is injected through [`Platform`] so the state machine runs without a
//! device:
//! - [`Decoder`] / [`DecoderFactory`] - the opaque media decoder
//! - [`RenderSurface`] - where video frames land
//! - [`AudioService`] - system volume
//! - [`KeepaliveLock`] - keeps the network up while streaming

use crate::{
    events::{DecoderEvent, UiEvent},
    types::{SessionId, Size},
    Result,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A stateful media decoder.
///
/// Commands and queries are synchronous. Lifecycle notifications are
/// reported later through the [`DecoderEvents`] handed to the factory.
pub trait Decoder: Send + Sync {
    /// Set the source to decode
    fn set_data_source(&self, uri: &str) -> Result<()>;

    /// Begin preparing the source; completion arrives as [`DecoderEvent::Prepared`]
    fn prepare_async(&self) -> Result<()>;

    fn start(&self);

    fn pause(&self);

    fn stop(&self);

    /// Seek to a position in milliseconds
    fn seek_to(&self, position_ms: u32);

    /// Free decoder resources; no further events may be emitted
    fn release(&self);

    /// Current position in milliseconds
    fn current_position(&self) -> u32;

    /// Content duration in milliseconds
    fn duration(&self) -> u32;

    fn is_playing(&self) -> bool;
}

/// Creates one decoder per playback session
pub trait DecoderFactory: Send + Sync {
    fn create(
        &self,
        session: SessionId,
        surface: Arc<dyn RenderSurface>,
        events: DecoderEvents,
    ) -> Result<Arc<dyn Decoder>>;
}

/// Render target for decoded frames
pub trait RenderSurface: Send + Sync {
    /// Hint the buffer size frames are rendered at
    fn set_fixed_size(&self, size: Size);
}

/// System audio volume
pub trait AudioService: Send + Sync {
    fn level(&self) -> u32;

    fn max_level(&self) -> u32;

    fn set_level(&self, level: u32);

    /// Platform-defined single step up
    fn step_up(&self);

    /// Platform-defined single step down
    fn step_down(&self);
}

/// Exclusive network keepalive held while streaming
pub trait KeepaliveLock: Send + Sync {
    fn acquire(&self);

    /// Must be safe to call when not held
    fn release(&self);

    fn is_held(&self) -> bool;
}

/// Injected collaborators for a controller
#[derive(Clone)]
pub struct Platform {
    pub decoders: Arc<dyn DecoderFactory>,
    pub surface: Arc<dyn RenderSurface>,
    pub audio: Arc<dyn AudioService>,
    pub keepalive: Arc<dyn KeepaliveLock>,
}

/// Sender a decoder uses to report events for its session.
///
/// Events are posted onto the UI event loop, never handled on the
/// decoder's own thread.
#[derive(Debug, Clone)]
pub struct DecoderEvents {
    session: SessionId,
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl DecoderEvents {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Post an event; returns false once the UI loop is gone
    pub fn emit(&self, event: DecoderEvent) -> bool {
        self.tx
            .send(UiEvent::Decoder {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_events_tag_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = SessionId::new();
        let events = DecoderEvents::new(session, tx);

        assert!(events.emit(DecoderEvent::Prepared));
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::Decoder {
                session,
                event: DecoderEvent::Prepared
            }
        );

        drop(rx);
        assert!(!events.emit(DecoderEvent::Completion));
    }
}
