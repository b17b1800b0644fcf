//! Simulated platform for headless playback
//!
//! The decoder plays a virtual clip on the tokio clock: it prepares after a
//! short delay, reports its size, advances its position while started and
//! signals completion (or an injected error) from a background task.

use mediaview_core::{
    AudioService, Decoder, DecoderEvent, DecoderEvents, DecoderFactory, KeepaliveLock, Platform,
    RenderSurface, Result, SessionId, Size,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

const PREPARE_DELAY: Duration = Duration::from_millis(150);
const TICK: Duration = Duration::from_millis(50);

/// Parameters of the virtual clip
#[derive(Debug, Clone)]
pub struct Clip {
    pub video: Size,
    pub duration_ms: u32,
    /// Decoder error code raised halfway through
    pub fail_with: Option<i32>,
}

/// Position bookkeeping: `base` plus time elapsed since `started`
#[derive(Debug, Default)]
struct Clock {
    base: u32,
    started: Option<Instant>,
}

impl Clock {
    fn position(&self, duration: u32) -> u32 {
        let elapsed = self
            .started
            .map(|at| at.elapsed().as_millis().min(u32::MAX as u128) as u32)
            .unwrap_or(0);
        self.base.saturating_add(elapsed).min(duration)
    }
}

pub struct SimulatedDecoder {
    clip: Clip,
    events: DecoderEvents,
    clock: Mutex<Clock>,
    prepare: Notify,
    released: AtomicBool,
}

impl SimulatedDecoder {
    fn with_clock<T>(&self, f: impl FnOnce(&mut Clock) -> T) -> T {
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut clock)
    }

    /// Background half of the decoder: preparation and end-of-stream
    async fn run(self: Arc<Self>) {
        self.prepare.notified().await;
        tokio::time::sleep(PREPARE_DELAY).await;
        if self.released.load(Ordering::SeqCst) {
            return;
        }

        let session = self.events.session();
        debug!(%session, "Simulated decoder prepared");
        self.events.emit(DecoderEvent::BufferingProgress { percent: 100 });
        self.events.emit(DecoderEvent::Prepared);
        self.events.emit(DecoderEvent::VideoSizeChanged {
            width: self.clip.video.width,
            height: self.clip.video.height,
        });

        let duration = self.clip.duration_ms;
        loop {
            tokio::time::sleep(TICK).await;
            if self.released.load(Ordering::SeqCst) {
                break;
            }

            let position = self.current_position();
            if let Some(code) = self.clip.fail_with {
                if position >= duration / 2 {
                    self.events.emit(DecoderEvent::Error {
                        what: code,
                        extra: 0,
                    });
                    break;
                }
            }
            if position >= duration {
                self.with_clock(|clock| {
                    clock.base = duration;
                    clock.started = None;
                });
                self.events.emit(DecoderEvent::Completion);
                break;
            }
        }
    }
}

impl Decoder for SimulatedDecoder {
    fn set_data_source(&self, uri: &str) -> Result<()> {
        debug!(uri, "Simulated data source");
        Ok(())
    }

    fn prepare_async(&self) -> Result<()> {
        self.prepare.notify_one();
        Ok(())
    }

    fn start(&self) {
        self.with_clock(|clock| {
            if clock.started.is_none() {
                clock.started = Some(Instant::now());
            }
        });
    }

    fn pause(&self) {
        let duration = self.clip.duration_ms;
        self.with_clock(|clock| {
            clock.base = clock.position(duration);
            clock.started = None;
        });
    }

    fn stop(&self) {
        self.pause();
    }

    fn seek_to(&self, position_ms: u32) {
        let duration = self.clip.duration_ms;
        self.with_clock(|clock| {
            clock.base = position_ms.min(duration);
            if clock.started.is_some() {
                clock.started = Some(Instant::now());
            }
        });
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.pause();
    }

    fn current_position(&self) -> u32 {
        let duration = self.clip.duration_ms;
        self.with_clock(|clock| clock.position(duration))
    }

    fn duration(&self) -> u32 {
        self.clip.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.with_clock(|clock| clock.started.is_some())
    }
}

/// Creates a [`SimulatedDecoder`] per session and spawns its background task
pub struct SimulatedFactory {
    clip: Clip,
}

impl DecoderFactory for SimulatedFactory {
    fn create(
        &self,
        session: SessionId,
        _surface: Arc<dyn RenderSurface>,
        events: DecoderEvents,
    ) -> Result<Arc<dyn Decoder>> {
        info!(%session, video = %self.clip.video, duration_ms = self.clip.duration_ms, "Simulated decoder created");

        let decoder = Arc::new(SimulatedDecoder {
            clip: self.clip.clone(),
            events,
            clock: Mutex::new(Clock::default()),
            prepare: Notify::new(),
            released: AtomicBool::new(false),
        });
        tokio::spawn(decoder.clone().run());
        Ok(decoder)
    }
}

/// Logs the render size it is asked for
pub struct LoggingSurface;

impl RenderSurface for LoggingSurface {
    fn set_fixed_size(&self, size: Size) {
        info!(%size, "Render surface resized");
    }
}

pub struct SimulatedAudio {
    level: AtomicU32,
    max: u32,
}

impl AudioService for SimulatedAudio {
    fn level(&self) -> u32 {
        self.level.load(Ordering::SeqCst)
    }

    fn max_level(&self) -> u32 {
        self.max
    }

    fn set_level(&self, level: u32) {
        self.level.store(level.min(self.max), Ordering::SeqCst);
    }

    fn step_up(&self) {
        self.set_level(self.level() + 1);
    }

    fn step_down(&self) {
        self.set_level(self.level().saturating_sub(1));
    }
}

#[derive(Default)]
pub struct SimulatedLock {
    held: AtomicBool,
}

impl KeepaliveLock for SimulatedLock {
    fn acquire(&self) {
        debug!("Keepalive acquired");
        self.held.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        debug!("Keepalive released");
        self.held.store(false, Ordering::SeqCst);
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Platform bundle playing `clip`
pub fn platform(clip: Clip) -> Platform {
    Platform {
        decoders: Arc::new(SimulatedFactory { clip }),
        surface: Arc::new(LoggingSurface),
        audio: Arc::new(SimulatedAudio {
            level: AtomicU32::new(8),
            max: 15,
        }),
        keepalive: Arc::new(SimulatedLock::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaview_core::UiEvent;
    use tokio::sync::mpsc;

    fn decoder(clip: Clip) -> (Arc<dyn Decoder>, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = SessionId::new();
        let factory = SimulatedFactory { clip };
        let decoder = factory
            .create(session, Arc::new(LoggingSurface), DecoderEvents::new(session, tx))
            .unwrap();
        (decoder, rx)
    }

    fn clip(duration_ms: u32, fail_with: Option<i32>) -> Clip {
        Clip {
            video: Size::new(1280, 720),
            duration_ms,
            fail_with,
        }
    }

    fn decoder_events(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Vec<DecoderEvent> {
        let mut out = Vec::new();
        while let Ok(UiEvent::Decoder { event, .. }) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepares_then_completes() {
        let (decoder, mut rx) = decoder(clip(1_000, None));
        decoder.prepare_async().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(
            decoder_events(&mut rx),
            vec![
                DecoderEvent::BufferingProgress { percent: 100 },
                DecoderEvent::Prepared,
                DecoderEvent::VideoSizeChanged {
                    width: 1280,
                    height: 720
                },
            ]
        );

        decoder.start();
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(decoder_events(&mut rx), vec![DecoderEvent::Completion]);
        assert_eq!(decoder.current_position(), 1_000);
        assert!(!decoder.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_position() {
        let (decoder, _rx) = decoder(clip(10_000, None));
        decoder.start();
        tokio::time::sleep(Duration::from_millis(300)).await;
        decoder.pause();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(decoder.current_position(), 300);
        decoder.seek_to(7_000);
        assert_eq!(decoder.current_position(), 7_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_error_halfway() {
        let (decoder, mut rx) = decoder(clip(1_000, Some(100)));
        decoder.prepare_async().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        decoder_events(&mut rx);

        decoder.start();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(
            decoder_events(&mut rx),
            vec![DecoderEvent::Error { what: 100, extra: 0 }]
        );
    }
}
