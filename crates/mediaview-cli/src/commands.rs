//! CLI command implementations

use crate::output::{clock, format_output, OutputFormat};
use crate::simulator::{self, Clip};
use mediaview_core::{
    scale_to_fit, validate_source, ControllerConfig, PlaybackState, Size, Status, UiEvent,
    UiEventLoop, ViewModel,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Options for a simulated playback run
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub uri: String,
    pub video: Size,
    pub surface: Size,
    pub duration_ms: u32,
    pub fail_with: Option<i32>,
    pub pause_after_ms: Option<u64>,
    pub config: Option<PathBuf>,
}

/// One line of playback output
#[derive(Debug, Serialize)]
struct Observation {
    at_ms: u64,
    state: PlaybackState,
    status: Option<Status>,
    position_ms: u32,
    duration_ms: u32,
    overlay_visible: bool,
}

impl Observation {
    fn new(start: Instant, state: PlaybackState, view: &ViewModel) -> Self {
        Self {
            at_ms: start.elapsed().as_millis() as u64,
            state,
            status: view.status_bar.status.clone(),
            position_ms: view.control_bar.progress,
            duration_ms: view.control_bar.max,
            overlay_visible: view.overlay_visible,
        }
    }

    fn text(&self) -> String {
        let status = self
            .status
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        format!(
            "[{:>6.1}s] {:<8} {}/{} {}{}",
            self.at_ms as f64 / 1000.0,
            self.state.to_string(),
            clock(self.position_ms),
            clock(self.duration_ms),
            if self.overlay_visible { "" } else { "(controls hidden) " },
            status,
        )
    }
}

/// Load a config file, or the defaults
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ControllerConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Ok(ControllerConfig::load(path)?)
        }
        None => Ok(ControllerConfig::default()),
    }
}

/// Play a source against the simulated decoder
pub async fn play(options: PlayOptions, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(options.config.as_ref())?;
    let platform = simulator::platform(Clip {
        video: options.video,
        duration_ms: options.duration_ms,
        fail_with: options.fail_with,
    });

    let (ui, handle) = UiEventLoop::new(config, platform)?;
    let task = ui.spawn();
    let mut view_rx = handle.subscribe_view();
    let start = Instant::now();

    handle.send(UiEvent::SurfaceCreated)?;
    handle.send(UiEvent::SurfaceChanged(options.surface))?;
    handle.play(options.uri.clone())?;

    // Pause once, then resume after the same interval
    let mut pause_at = options
        .pause_after_ms
        .map(|ms| start + Duration::from_millis(ms));
    let mut resume_at = None;

    let mut started = false;
    let mut last: Option<(PlaybackState, Option<Status>, bool)> = None;
    let mut final_status = None;

    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                let state = handle.state();
                let observation = Observation::new(start, state, &view);

                let key = (state, observation.status.clone(), observation.overlay_visible);
                if last.as_ref() != Some(&key) {
                    println!("{}", format_output(&observation, format, Observation::text));
                    last = Some(key);
                }

                if state != PlaybackState::Stopped {
                    started = true;
                } else if started || is_refusal(view.status_bar.status.as_ref()) {
                    final_status = view.status_bar.status.clone();
                    break;
                }
            }
            _ = sleep_until(pause_at), if pause_at.is_some() => {
                info!("Pausing");
                handle.send(UiEvent::PlayPressed)?;
                resume_at = pause_at
                    .take()
                    .zip(options.pause_after_ms)
                    .map(|(at, ms)| at + Duration::from_millis(ms));
            }
            _ = sleep_until(resume_at), if resume_at.is_some() => {
                info!("Resuming");
                handle.send(UiEvent::PlayPressed)?;
                resume_at = None;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                handle.send(UiEvent::Stop)?;
            }
        }
    }

    handle.shutdown()?;
    task.await?;

    match final_status {
        Some(
            status @ (Status::Error
            | Status::StopError
            | Status::InvalidUrl
            | Status::InvalidContent
            | Status::SurfaceUnavailable),
        ) => anyhow::bail!("playback ended: {status}"),
        _ => Ok(()),
    }
}

/// Statuses that end a run before any session started
fn is_refusal(status: Option<&Status>) -> bool {
    matches!(
        status,
        Some(Status::InvalidUrl | Status::InvalidContent | Status::SurfaceUnavailable)
    )
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[derive(Debug, Serialize)]
struct SourceCheck {
    input: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate sources against the accepted extensions
pub fn check(
    inputs: &[String],
    config: Option<&PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let mut failed = 0;

    for input in inputs {
        let result = validate_source(input, &config.accepted_extensions);
        let check = SourceCheck {
            input: input.clone(),
            valid: result.is_ok(),
            uri: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(ToString::to_string),
        };
        if !check.valid {
            failed += 1;
        }

        println!(
            "{}",
            format_output(&check, format, |c| match &c.error {
                None => format!("PASS  {}", c.input),
                Some(e) => format!("FAIL  {} ({e})", c.input),
            })
        );
    }

    if format == OutputFormat::Text {
        println!("\nResults: {} passed, {} failed", inputs.len() - failed, failed);
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ScaleResult {
    video: Size,
    surface: Size,
    scaled: Option<Size>,
}

/// Print the aspect-preserving fit of a video into a surface
pub fn scale(video: Size, surface: Size, format: OutputFormat) -> anyhow::Result<()> {
    let result = ScaleResult {
        video,
        surface,
        scaled: scale_to_fit(video, surface),
    };

    println!(
        "{}",
        format_output(&result, format, |r| match r.scaled {
            Some(scaled) => format!("{} in {} -> {}", r.video, r.surface, scaled),
            None => format!("{} in {} -> unknown (both sizes must be nonzero)", r.video, r.surface),
        })
    );

    Ok(())
}

/// Print the effective configuration
pub fn config(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = load_config(path)?;
    println!("{}", config.to_json());
    Ok(())
}
