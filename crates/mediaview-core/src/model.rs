//! Media model - per-session playback facts owned by the controller

use crate::types::{PlaybackState, Size};
use serde::Serialize;

/// Fit `video` into `surface` preserving the video's aspect ratio.
///
/// The more constraining axis is anchored to the surface; the other is
/// truncated toward zero. Returns `None` while either size is unknown.
pub fn scale_to_fit(video: Size, surface: Size) -> Option<Size> {
    if !video.is_known() || !surface.is_known() {
        return None;
    }

    let width_ratio = surface.width as f64 / video.width as f64;
    let height_ratio = surface.height as f64 / video.height as f64;

    let (vw, vh) = (video.width as u64, video.height as u64);
    let (sw, sh) = (surface.width as u64, surface.height as u64);

    let scaled = if width_ratio > height_ratio {
        Size::new((sh * vw / vh) as u32, surface.height)
    } else if width_ratio < height_ratio {
        Size::new(surface.width, (sw * vh / vw) as u32)
    } else {
        surface
    };

    Some(scaled)
}

/// Playback facts for the current session
#[derive(Debug, Clone, Serialize)]
pub struct MediaModel {
    uri: Option<String>,
    video: Size,
    surface: Size,
    scaled: Size,
    prepared: bool,
    state: PlaybackState,
}

impl Default for MediaModel {
    fn default() -> Self {
        Self {
            uri: None,
            video: Size::UNKNOWN,
            surface: Size::UNKNOWN,
            scaled: Size::UNKNOWN,
            prepared: false,
            state: PlaybackState::Startup,
        }
    }
}

impl MediaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore defaults after teardown
    pub fn reset(&mut self) {
        self.uri = None;
        self.video = Size::UNKNOWN;
        self.surface = Size::UNKNOWN;
        self.scaled = Size::UNKNOWN;
        self.prepared = false;
        self.state = PlaybackState::Stopped;
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = Some(uri.into());
    }

    /// Case-insensitive comparison against the active source
    pub fn is_same_source(&self, uri: &str) -> bool {
        self.uri
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(uri))
    }

    pub fn video_size(&self) -> Size {
        self.video
    }

    pub fn set_video_size(&mut self, size: Size) {
        self.video = size;
        self.rescale();
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    pub fn set_surface_size(&mut self, size: Size) {
        self.surface = size;
        self.rescale();
    }

    pub fn scaled_size(&self) -> Size {
        self.scaled
    }

    pub fn is_video_size_known(&self) -> bool {
        self.video.is_known()
    }

    pub fn is_surface_size_known(&self) -> bool {
        self.surface.is_known()
    }

    pub fn is_scaled_size_known(&self) -> bool {
        self.scaled.is_known()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn set_prepared(&mut self, prepared: bool) {
        self.prepared = prepared;
    }

    /// Prepared and the render size is settled
    pub fn is_ready_to_start(&self) -> bool {
        self.prepared && self.is_scaled_size_known()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    fn rescale(&mut self) {
        if let Some(scaled) = scale_to_fit(self.video, self.surface) {
            self.scaled = scaled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_width_bound() {
        let scaled = scale_to_fit(Size::new(1920, 1080), Size::new(640, 480));
        assert_eq!(scaled, Some(Size::new(640, 360)));
    }

    #[test]
    fn test_scale_height_bound() {
        let scaled = scale_to_fit(Size::new(640, 480), Size::new(1280, 480));
        assert_eq!(scaled, Some(Size::new(640, 480)));
    }

    #[test]
    fn test_scale_equal_ratio() {
        let scaled = scale_to_fit(Size::new(320, 240), Size::new(640, 480));
        assert_eq!(scaled, Some(Size::new(640, 480)));
    }

    #[test]
    fn test_scale_truncates() {
        // 1001 * 720 / 1280 = 563.06
        let scaled = scale_to_fit(Size::new(1280, 720), Size::new(1001, 1000));
        assert_eq!(scaled, Some(Size::new(1001, 563)));
    }

    #[test]
    fn test_scale_unknown() {
        assert_eq!(scale_to_fit(Size::new(0, 1080), Size::new(640, 480)), None);
        assert_eq!(scale_to_fit(Size::new(1920, 1080), Size::UNKNOWN), None);
    }

    #[test]
    fn test_scale_fits_and_keeps_aspect() {
        let videos = [(1920, 1080), (640, 480), (176, 144), (1, 1000), (999, 7), (3840, 1600)];
        let surfaces = [(640, 480), (1280, 480), (1, 1), (1024, 600), (333, 777), (2560, 1440)];

        for &(vw, vh) in &videos {
            for &(sw, sh) in &surfaces {
                let out = scale_to_fit(Size::new(vw, vh), Size::new(sw, sh)).unwrap();
                assert!(out.width <= sw && out.height <= sh, "{vw}x{vh} in {sw}x{sh} -> {out}");

                // One pixel of truncation on the derived axis
                if out.width == sw {
                    let exact = sw as f64 * vh as f64 / vw as f64;
                    assert!((exact - out.height as f64).abs() < 1.0);
                } else {
                    assert_eq!(out.height, sh);
                    let exact = sh as f64 * vw as f64 / vh as f64;
                    assert!((exact - out.width as f64).abs() < 1.0);
                }
            }
        }
    }

    #[test]
    fn test_model_scaled_size_follows_inputs() {
        let mut model = MediaModel::new();
        model.set_video_size(Size::new(1920, 1080));
        assert!(!model.is_scaled_size_known());

        model.set_surface_size(Size::new(640, 480));
        assert_eq!(model.scaled_size(), Size::new(640, 360));

        model.set_prepared(true);
        assert!(model.is_ready_to_start());
    }

    #[test]
    fn test_model_reset() {
        let mut model = MediaModel::new();
        model.set_uri("http://host/clip.mp4");
        model.set_video_size(Size::new(1920, 1080));
        model.set_surface_size(Size::new(640, 480));
        model.set_prepared(true);
        model.set_state(PlaybackState::Playing);

        model.reset();

        assert_eq!(model.uri(), None);
        assert_eq!(model.video_size(), Size::UNKNOWN);
        assert_eq!(model.surface_size(), Size::UNKNOWN);
        assert_eq!(model.scaled_size(), Size::UNKNOWN);
        assert!(!model.is_prepared());
        assert_eq!(model.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_same_source_ignores_case() {
        let mut model = MediaModel::new();
        assert!(!model.is_same_source("clip.mp4"));
        model.set_uri("http://Host/Clip.MP4");
        assert!(model.is_same_source("http://host/clip.mp4"));
        assert!(!model.is_same_source("http://host/other.mp4"));
    }
}
