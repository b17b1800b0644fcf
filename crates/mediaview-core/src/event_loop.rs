//! UI event loop
//!
//! A single tokio task owns the [`PlaybackController`] and processes every
//! [`UiEvent`] serially. Front ends talk to it through a [`UiHandle`] and
//! observe the view through `watch` snapshots.

use crate::{
    config::ControllerConfig,
    controller::PlaybackController,
    events::UiEvent,
    platform::Platform,
    types::PlaybackState,
    view::ViewModel,
    Error, Result,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Event loop owning one controller
pub struct UiEventLoop {
    controller: PlaybackController,
    rx: mpsc::UnboundedReceiver<UiEvent>,
    view_tx: watch::Sender<ViewModel>,
}

/// Cloneable handle to a running [`UiEventLoop`]
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiEvent>,
    view_rx: watch::Receiver<ViewModel>,
    state_rx: watch::Receiver<PlaybackState>,
}

impl UiEventLoop {
    pub fn new(config: ControllerConfig, platform: Platform) -> Result<(Self, UiHandle)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = PlaybackController::new(config, platform, tx.clone())?;
        let (view_tx, view_rx) = watch::channel(controller.view().clone());

        let handle = UiHandle {
            tx,
            view_rx,
            state_rx: controller.subscribe_state(),
        };

        Ok((
            Self {
                controller,
                rx,
                view_tx,
            },
            handle,
        ))
    }

    /// Spawn the loop onto the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process events until [`UiEvent::Shutdown`]
    pub async fn run(mut self) {
        info!("UI event loop started");

        loop {
            let deadline = self.controller.auto_hide_deadline();

            tokio::select! {
                event = self.rx.recv() => {
                    let Some(event) = event else { break };
                    let shutdown = event == UiEvent::Shutdown;
                    self.controller.handle(event);
                    if shutdown {
                        self.publish();
                        break;
                    }
                }
                _ = sleep_until(deadline) => {
                    self.controller.on_auto_hide_due(Instant::now());
                }
            }

            self.publish();
        }

        info!("UI event loop stopped");
    }

    fn publish(&self) {
        let view = self.controller.view();
        self.view_tx.send_if_modified(|current| {
            if current == view {
                return false;
            }
            *current = view.clone();
            true
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl UiHandle {
    /// Queue an event for the loop
    pub fn send(&self, event: UiEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| Error::EventLoopClosed)
    }

    /// Type `uri` into the source input and press play
    pub fn play(&self, uri: impl Into<String>) -> Result<()> {
        self.send(UiEvent::InputChanged(uri.into()))?;
        self.send(UiEvent::PlayPressed)
    }

    /// Tear down and stop the loop
    pub fn shutdown(&self) -> Result<()> {
        debug!("Shutdown requested");
        self.send(UiEvent::Shutdown)
    }

    /// Latest published view
    pub fn view(&self) -> ViewModel {
        self.view_rx.borrow().clone()
    }

    pub fn state(&self) -> PlaybackState {
        *self.state_rx.borrow()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewModel> {
        self.view_rx.clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.state_rx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
