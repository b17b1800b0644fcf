//! MediaView Core - playback view controller
//!
//! This crate drives a single video playback view:
//! - Source validation against accepted container extensions
//! - Playback state machine with per-state widget policy
//! - Aspect-preserving scale-to-fit of video onto the render surface
//! - Periodic progress sampling and overlay auto-hide
//! - Volume pass-through to the system audio service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        MediaView Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   front end ──UiHandle──┐          ┌── DecoderEvents ── decoder │
//! │                         ▼          ▼                            │
//! │                  ┌────────────────────────┐                     │
//! │                  │      UiEventLoop       │◄── Progress ──┐     │
//! │                  │  (serial, one task)    │               │     │
//! │                  └───────────┬────────────┘               │     │
//! │                              │                            │     │
//! │                  ┌───────────┴────────────┐      ┌────────┴───┐ │
//! │                  │  PlaybackController    │─────►│  Progress  │ │
//! │                  │  MediaModel ViewModel  │      │  Sampler   │ │
//! │                  └───────────┬────────────┘      └────────────┘ │
//! │                              │                                  │
//! │     ┌──────────────┐  ┌──────┴───────┐  ┌──────────────┐        │
//! │     │    Render    │  │    Audio     │  │  Keepalive   │        │
//! │     │   Surface    │  │   Service    │  │    Lock      │        │
//! │     └──────────────┘  └──────────────┘  └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auto_hide;
pub mod config;
pub mod controller;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod model;
pub mod platform;
pub mod sampler;
pub mod source;
pub mod types;
pub mod view;
pub mod volume;

pub use config::ControllerConfig;
pub use controller::PlaybackController;
pub use error::{Error, Result};
pub use event_loop::{UiEventLoop, UiHandle};
pub use events::{DecoderEvent, UiEvent};
pub use model::{scale_to_fit, MediaModel};
pub use platform::{
    AudioService, Decoder, DecoderEvents, DecoderFactory, KeepaliveLock, Platform, RenderSurface,
};
pub use source::{validate_source, DEFAULT_EXTENSIONS};
pub use types::*;
pub use view::{ControlBar, ControlPolicy, PlayIcon, Status, StatusBar, ViewModel, VolumeBar};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library start-up
pub fn init() {
    tracing::info!(version = VERSION, "MediaView Core initialized");
}
