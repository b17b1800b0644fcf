//! Playback Controller - the state machine behind the playback view
//!
//! Coordinates:
//! - Source validation and decoder session lifecycle
//! - State transitions and the per-state widget policy
//! - Progress sampling and overlay auto-hide
//! - Volume pass-through
//!
//! Every input arrives as a [`UiEvent`] through [`PlaybackController::handle`],
//! one at a time, on the UI event loop.

use crate::{
    auto_hide::AutoHide,
    config::ControllerConfig,
    events::{DecoderEvent, UiEvent},
    model::MediaModel,
    platform::{Decoder, DecoderEvents, Platform},
    sampler::ProgressSampler,
    source::validate_source,
    types::{InfoKind, PlaybackState, SessionId, Size},
    view::{Status, ViewModel, VolumeBar},
    volume::VolumeControl,
    Error, Result,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Controller for one playback view
pub struct PlaybackController {
    config: ControllerConfig,
    platform: Platform,
    model: MediaModel,
    view: ViewModel,
    volume: VolumeControl,
    /// Live decoder; `None` outside a session
    decoder: Option<Arc<dyn Decoder>>,
    session: Option<SessionId>,
    /// Last reported surface size; `None` while no surface exists
    surface: Option<Size>,
    /// Position the seek control was dragged to
    seek_target: Option<u32>,
    sampler: ProgressSampler,
    auto_hide: AutoHide,
    state_tx: watch::Sender<PlaybackState>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
}

impl PlaybackController {
    /// Create a controller in the `Startup` state.
    ///
    /// `ui_tx` feeds the UI event loop; decoders and the progress sampler
    /// post their events through it.
    pub fn new(
        config: ControllerConfig,
        platform: Platform,
        ui_tx: mpsc::UnboundedSender<UiEvent>,
    ) -> Result<Self> {
        config.validate()?;

        let (state_tx, _) = watch::channel(PlaybackState::Startup);
        let mut view = ViewModel::default();
        let volume = VolumeControl::new(platform.audio.clone(), config.volume_step_fraction);
        view.volume = volume.bar();

        Ok(Self {
            sampler: ProgressSampler::new(config.progress_interval()),
            auto_hide: AutoHide::new(config.auto_hide_delay()),
            config,
            platform,
            model: MediaModel::new(),
            view,
            volume,
            decoder: None,
            session: None,
            surface: None,
            seek_target: None,
            state_tx,
            ui_tx,
        })
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.model.state()
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn model(&self) -> &MediaModel {
        &self.model
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Live session, if any
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_running()
    }

    pub fn auto_hide_deadline(&self) -> Option<Instant> {
        self.auto_hide.deadline()
    }

    /// Process one event
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::InputChanged(text) => self.on_input_changed(text),
            UiEvent::PlayPressed => self.on_play_pressed(),
            UiEvent::SurfaceTapped => self.on_surface_tapped(),
            UiEvent::SeekStarted => self.on_seek_started(),
            UiEvent::SeekMoved(position) => self.on_seek_moved(position),
            UiEvent::SeekReleased => self.on_seek_released(),
            UiEvent::VolumeIncrease => {
                let bar = self.volume.increase();
                self.on_volume_changed(bar);
            }
            UiEvent::VolumeDecrease => {
                let bar = self.volume.decrease();
                self.on_volume_changed(bar);
            }
            UiEvent::VolumeSet(level) => {
                let bar = self.volume.set_level(level);
                self.on_volume_changed(bar);
            }
            UiEvent::VolumeKeyUp => {
                let bar = self.volume.key_up();
                self.on_volume_changed(bar);
            }
            UiEvent::VolumeKeyDown => {
                let bar = self.volume.key_down();
                self.on_volume_changed(bar);
            }
            UiEvent::SurfaceCreated => self.on_surface_created(),
            UiEvent::SurfaceChanged(size) => self.on_surface_changed(size),
            UiEvent::SurfaceDestroyed => self.on_surface_destroyed(),
            UiEvent::Stop | UiEvent::Shutdown => self.stop_content(),
            UiEvent::Decoder { session, event } => {
                if self.is_live(session) {
                    self.on_decoder_event(event);
                } else {
                    debug!(%session, ?event, "Ignoring event for stale session");
                }
            }
            UiEvent::Progress { session, position } => {
                if self.is_live(session) && self.state() == PlaybackState::Playing {
                    self.view.control_bar.set_progress(position);
                }
            }
        }
    }

    /// Hide the overlay if the auto-hide deadline has passed while playing
    pub fn on_auto_hide_due(&mut self, now: Instant) {
        if self.auto_hide.take_if_due(now) && self.state() == PlaybackState::Playing {
            debug!("Auto-hiding controls");
            self.view.overlay_visible = false;
        }
    }

    /// Release the session and return to `Stopped`.
    ///
    /// Idempotent: safe to call with no session.
    pub fn teardown(&mut self) {
        self.force_state(PlaybackState::Stopped);
        self.release_resources();
        self.view.control_bar.reset_seek(0);
    }

    fn is_live(&self, session: SessionId) -> bool {
        self.session == Some(session) && self.decoder.is_some()
    }

    /// Transition through the state table
    fn set_state(&mut self, state: PlaybackState) -> bool {
        let current = self.model.state();
        if !current.can_transition_to(state) {
            warn!(from = %current, to = %state, "Rejected state transition");
            return false;
        }

        self.apply_state(state);
        info!(from = %current, to = %state, "State transition");
        true
    }

    /// Teardown path: any state may become `Stopped`
    fn force_state(&mut self, state: PlaybackState) {
        let current = self.model.state();
        self.apply_state(state);
        if current != state {
            info!(from = %current, to = %state, "State forced");
        }
    }

    fn apply_state(&mut self, state: PlaybackState) {
        self.model.set_state(state);
        self.view.apply_state(state);
        if state == PlaybackState::Loading {
            self.view.status_bar.set_status(Status::Preparing);
        }
        self.state_tx.send_replace(state);
    }

    fn on_input_changed(&mut self, text: String) {
        if self.view.status_bar.input_enabled {
            self.view.status_bar.input = text;
        } else {
            debug!(state = %self.state(), "Input is disabled, edit ignored");
        }
    }

    fn read_input(&self) -> Result<String> {
        validate_source(&self.view.status_bar.input, &self.config.accepted_extensions)
    }

    fn on_play_pressed(&mut self) {
        debug!(state = %self.state(), "Play pressed");

        match self.state() {
            PlaybackState::Playing | PlaybackState::Paused => {
                let uri = match self.read_input() {
                    Ok(uri) => uri,
                    Err(e) => return self.report(&e),
                };

                if self.model.is_same_source(&uri) {
                    self.toggle_pause();
                } else if self.decoder.is_some() {
                    // New source: finish the old session before loading
                    self.stop_content();
                    self.view.status_bar.set_status(Status::Stopped);
                    self.prepare_content(&uri);
                } else {
                    // Unreachable while release_resources resets the state
                    // along with the decoder
                    self.report(&Error::NoActiveSession);
                }
            }
            PlaybackState::Stopped => match self.read_input() {
                Ok(uri) => self.prepare_content(&uri),
                Err(e) => self.report(&e),
            },
            state => debug!(%state, "Play ignored"),
        }
    }

    fn prepare_content(&mut self, uri: &str) {
        if let Err(e) = self.load_content(uri) {
            if self.decoder.is_some() {
                self.teardown();
            }
            self.report(&e);
        }
    }

    #[instrument(skip(self))]
    fn load_content(&mut self, uri: &str) -> Result<()> {
        if self.surface.is_none() {
            return Err(Error::SurfaceUnavailable);
        }

        let session = SessionId::new();
        info!(%session, "Loading content");

        let events = DecoderEvents::new(session, self.ui_tx.clone());
        let decoder = self
            .platform
            .decoders
            .create(session, self.platform.surface.clone(), events)
            .map_err(|e| source_error(uri, e))?;

        // Held from here on so teardown can release it if loading fails
        self.decoder = Some(decoder.clone());
        self.session = Some(session);

        decoder
            .set_data_source(uri)
            .map_err(|e| source_error(uri, e))?;

        self.platform.keepalive.acquire();
        self.set_state(PlaybackState::Loading);

        decoder.prepare_async().map_err(|e| source_error(uri, e))?;
        self.model.set_uri(uri);

        Ok(())
    }

    fn start_content(&mut self) {
        let Some(decoder) = self.decoder.clone() else {
            return;
        };

        let scaled = self.model.scaled_size();
        info!(%scaled, "Starting playback");

        self.apply_render_size(scaled);
        self.view.control_bar.reset_seek(decoder.duration());

        decoder.start();
        self.set_state(PlaybackState::Playing);
        self.start_sampler();
        self.schedule_auto_hide();
    }

    fn toggle_pause(&mut self) {
        let Some(decoder) = self.decoder.clone() else {
            return;
        };

        match self.state() {
            PlaybackState::Playing => {
                self.set_state(PlaybackState::Paused);
                self.sampler.stop();
                decoder.pause();
            }
            PlaybackState::Paused => {
                self.set_state(PlaybackState::Playing);
                decoder.start();
                self.start_sampler();
                self.schedule_auto_hide();
            }
            _ => {}
        }
    }

    /// Stop the decoder, then tear down
    fn stop_content(&mut self) {
        if let Some(decoder) = &self.decoder {
            decoder.stop();
        }
        self.teardown();
    }

    fn start_sampler(&mut self) {
        let (Some(decoder), Some(session)) = (&self.decoder, self.session) else {
            return;
        };

        self.sampler.start(
            session,
            Arc::downgrade(decoder),
            self.state_tx.subscribe(),
            self.ui_tx.clone(),
        );
    }

    fn schedule_auto_hide(&mut self) {
        self.auto_hide.schedule(Instant::now());
    }

    fn apply_render_size(&mut self, size: Size) {
        self.platform.surface.set_fixed_size(size);
        self.view.render_size = Some(size);
    }

    fn on_surface_tapped(&mut self) {
        let playing = self.decoder.as_ref().is_some_and(|d| d.is_playing());
        if !playing {
            return;
        }

        self.auto_hide.cancel();
        self.view.overlay_visible = !self.view.overlay_visible;
        if self.view.overlay_visible {
            self.schedule_auto_hide();
        }
    }

    fn on_seek_started(&mut self) {
        if self.decoder.is_none()
            || !matches!(self.state(), PlaybackState::Playing | PlaybackState::Paused)
        {
            debug!(state = %self.state(), "Seek start ignored");
            return;
        }

        self.set_state(PlaybackState::Seeking);
        self.auto_hide.cancel();
        self.sampler.stop();
        self.seek_target = Some(self.view.control_bar.progress);
    }

    fn on_seek_moved(&mut self, position: u32) {
        if self.state() == PlaybackState::Seeking {
            self.view.control_bar.set_progress(position);
            self.seek_target = Some(self.view.control_bar.progress);
        }
    }

    fn on_seek_released(&mut self) {
        if self.state() != PlaybackState::Seeking {
            return;
        }
        let Some(decoder) = self.decoder.clone() else {
            return;
        };

        let target = self
            .seek_target
            .take()
            .unwrap_or(self.view.control_bar.progress);
        debug!(target, "Seek released");

        decoder.seek_to(target);
        if !decoder.is_playing() {
            decoder.start();
        }

        self.set_state(PlaybackState::Playing);
        self.start_sampler();
        self.schedule_auto_hide();
    }

    fn on_volume_changed(&mut self, bar: VolumeBar) {
        self.view.volume = bar;
        self.view.overlay_visible = true;
        self.schedule_auto_hide();
    }

    fn on_surface_created(&mut self) {
        debug!("Surface created");
        if self.surface.is_none() {
            self.surface = Some(Size::UNKNOWN);
        }

        if matches!(self.state(), PlaybackState::Startup | PlaybackState::Stopped) {
            self.set_state(PlaybackState::Stopped);
        }
    }

    fn on_surface_changed(&mut self, size: Size) {
        debug!(%size, "Surface changed");
        self.surface = Some(size);
        self.model.set_surface_size(size);

        if self.state() == PlaybackState::Loading && self.model.is_ready_to_start() {
            self.start_content();
        }
    }

    /// Releases the session but leaves the widgets as they were: the state
    /// watch reports `Stopped` while the view keeps the previous policy until
    /// the next surface is created.
    fn on_surface_destroyed(&mut self) {
        debug!("Surface destroyed");
        self.surface = None;
        self.release_resources();
    }

    fn on_decoder_event(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::Prepared => {
                debug!("Decoder prepared");
                self.model.set_prepared(true);
                if self.state() == PlaybackState::Loading && self.model.is_ready_to_start() {
                    self.start_content();
                }
            }
            DecoderEvent::BufferingProgress { percent } => {
                self.view
                    .status_bar
                    .set_status(Status::Buffering(percent.min(100)));
            }
            DecoderEvent::VideoSizeChanged { width, height } => {
                let size = Size::new(width, height);
                debug!(%size, "Video size changed");
                self.model.set_video_size(size);

                match self.state() {
                    PlaybackState::Loading if self.model.is_ready_to_start() => {
                        self.start_content();
                    }
                    PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Seeking
                        if self.model.is_scaled_size_known() =>
                    {
                        let scaled = self.model.scaled_size();
                        self.apply_render_size(scaled);
                    }
                    _ => {}
                }
            }
            DecoderEvent::Info { what, extra } => {
                let kind = InfoKind::from_code(what);
                info!(%kind, what, extra, "Decoder info");
                self.view.overlay_visible = true;
                self.view.status_bar.set_status(Status::Info(kind));
            }
            DecoderEvent::Error { what, extra } => {
                self.report(&Error::DecoderFault { what, extra });
                self.teardown();
            }
            DecoderEvent::Completion => {
                info!("Playback completed");
                self.view.status_bar.set_status(Status::Completed);
                self.view.control_bar.reset_seek(0);
                self.view.overlay_visible = true;
                self.teardown();
            }
        }
    }

    /// Release the session without touching widgets
    fn release_resources(&mut self) {
        self.sampler.stop();
        self.auto_hide.cancel();
        self.seek_target = None;

        if let Some(decoder) = self.decoder.take() {
            decoder.release();
        }
        self.session = None;

        if self.platform.keepalive.is_held() {
            self.platform.keepalive.release();
        }

        self.model.reset();
        // The surface outlives the session
        if let Some(size) = self.surface {
            self.model.set_surface_size(size);
        }
        self.state_tx.send_replace(self.model.state());
    }

    /// Log an error and surface it on the status line
    fn report(&mut self, err: &Error) {
        let status = match err {
            Error::InvalidUrl(_) => {
                warn!(code = err.error_code(), "{err}");
                Status::InvalidUrl
            }
            Error::InvalidSource { .. } => {
                error!(code = err.error_code(), "{err}");
                Status::InvalidContent
            }
            Error::NoActiveSession => {
                error!(code = err.error_code(), "{err}");
                Status::StopError
            }
            Error::SurfaceUnavailable => {
                warn!(code = err.error_code(), "{err}");
                Status::SurfaceUnavailable
            }
            _ => {
                error!(code = err.error_code(), "{err}");
                Status::Error
            }
        };
        self.view.status_bar.set_status(status);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release_resources();
    }
}

fn source_error(uri: &str, err: Error) -> Error {
    match err {
        Error::InvalidSource { .. } => err,
        other => Error::invalid_source(uri, other),
    }
}
