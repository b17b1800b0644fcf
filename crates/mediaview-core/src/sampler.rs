//! Progress sampler
//!
//! While playing, a background task reads the decoder position on a fixed
//! period and posts it to the UI event loop. The task never touches the view
//! model itself.

use crate::{
    events::UiEvent,
    platform::Decoder,
    types::{PlaybackState, SessionId},
};
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

struct Worker {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owner of the at-most-one sampling task
pub struct ProgressSampler {
    interval: Duration,
    worker: Option<Worker>,
}

impl ProgressSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            worker: None,
        }
    }

    /// Stop any running task, then start a new one.
    ///
    /// The task exits when `state` leaves `Playing`, when `decoder` is
    /// dropped, when the UI loop is gone, or on [`ProgressSampler::stop`].
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        session: SessionId,
        decoder: Weak<dyn Decoder>,
        state: watch::Receiver<PlaybackState>,
        ui: mpsc::UnboundedSender<UiEvent>,
    ) {
        self.stop();

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(sample_loop(
            session,
            decoder,
            state,
            ui,
            stop_rx,
            self.interval,
        ));

        debug!(%session, interval_ms = self.interval.as_millis() as u64, "Progress sampler started");
        self.worker = Some(Worker {
            stop: stop_tx,
            handle,
        });
    }

    /// Signal the task to exit. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            // Err means the task already exited on its own
            let _ = worker.stop.send(());
            debug!("Progress sampler stopped");
        }
    }

    /// A task was started and has not yet exited
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sample_loop(
    session: SessionId,
    decoder: Weak<dyn Decoder>,
    state: watch::Receiver<PlaybackState>,
    ui: mpsc::UnboundedSender<UiEvent>,
    mut stop: oneshot::Receiver<()>,
    interval: Duration,
) {
    loop {
        if !matches!(stop.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
            break;
        }
        if *state.borrow() != PlaybackState::Playing {
            break;
        }
        let Some(decoder) = decoder.upgrade() else {
            break;
        };

        let position = decoder.current_position();
        drop(decoder);

        trace!(%session, position, "Progress sample");
        if ui.send(UiEvent::Progress { session, position }).is_err() {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    trace!(%session, "Progress sampler exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Clock {
        position: AtomicU32,
    }

    impl Decoder for Clock {
        fn set_data_source(&self, _uri: &str) -> Result<()> {
            Ok(())
        }
        fn prepare_async(&self) -> Result<()> {
            Ok(())
        }
        fn start(&self) {}
        fn pause(&self) {}
        fn stop(&self) {}
        fn seek_to(&self, _position_ms: u32) {}
        fn release(&self) {}
        fn current_position(&self) -> u32 {
            self.position.fetch_add(500, Ordering::SeqCst)
        }
        fn duration(&self) -> u32 {
            60_000
        }
        fn is_playing(&self) -> bool {
            true
        }
    }

    fn clock() -> Arc<dyn Decoder> {
        Arc::new(Clock {
            position: AtomicU32::new(0),
        })
    }

    fn positions(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let UiEvent::Progress { position, .. } = event {
                out.push(position);
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_on_interval() {
        let decoder = clock();
        let (_state_tx, state_rx) = watch::channel(PlaybackState::Playing);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut sampler = ProgressSampler::new(Duration::from_millis(500));

        sampler.start(SessionId::new(), Arc::downgrade(&decoder), state_rx, ui_tx);
        tokio::time::sleep(Duration::from_millis(1_250)).await;

        assert_eq!(positions(&mut ui_rx), vec![0, 500, 1_000]);
        assert!(sampler.is_running());

        sampler.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!sampler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_sleeping() {
        let decoder = clock();
        let (_state_tx, state_rx) = watch::channel(PlaybackState::Playing);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut sampler = ProgressSampler::new(Duration::from_millis(500));

        sampler.start(SessionId::new(), Arc::downgrade(&decoder), state_rx, ui_tx);
        tokio::time::sleep(Duration::from_millis(100)).await;
        sampler.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(positions(&mut ui_rx), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_state_leaves_playing() {
        let decoder = clock();
        let (state_tx, state_rx) = watch::channel(PlaybackState::Playing);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut sampler = ProgressSampler::new(Duration::from_millis(500));

        sampler.start(SessionId::new(), Arc::downgrade(&decoder), state_rx, ui_tx);
        tokio::time::sleep(Duration::from_millis(750)).await;
        state_tx.send_replace(PlaybackState::Paused);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(positions(&mut ui_rx), vec![0, 500]);
        assert!(!sampler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_decoder_dropped() {
        let decoder = clock();
        let (_state_tx, state_rx) = watch::channel(PlaybackState::Playing);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut sampler = ProgressSampler::new(Duration::from_millis(500));

        sampler.start(SessionId::new(), Arc::downgrade(&decoder), state_rx, ui_tx);
        tokio::time::sleep(Duration::from_millis(250)).await;
        drop(decoder);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(positions(&mut ui_rx), vec![0]);
        assert!(!sampler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_task() {
        let decoder = clock();
        let (_state_tx, state_rx) = watch::channel(PlaybackState::Playing);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut sampler = ProgressSampler::new(Duration::from_millis(500));
        let first = SessionId::new();
        let second = SessionId::new();

        sampler.start(first, Arc::downgrade(&decoder), state_rx.clone(), ui_tx.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        sampler.start(second, Arc::downgrade(&decoder), state_rx, ui_tx);
        tokio::time::sleep(Duration::from_millis(1_200)).await;

        let mut sessions = Vec::new();
        while let Ok(UiEvent::Progress { session, .. }) = ui_rx.try_recv() {
            sessions.push(session);
        }
        assert_eq!(sessions.iter().filter(|s| **s == first).count(), 1);
        assert_eq!(sessions.iter().filter(|s| **s == second).count(), 3);
    }
}
