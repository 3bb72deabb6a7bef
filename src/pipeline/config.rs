use std::time::Duration;

use crate::encode::strategy::StrategyKind;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ScenereelError, ScenereelResult};

/// Relative progress share of each pipeline phase, in percentage points.
///
/// The four shares must sum to 100. Fetching and decoding report through the
/// log stream only and do not move the progress bar past the engine-load
/// share.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressWeights {
    /// Engine availability check and warm-up.
    pub engine_load: f64,
    /// Per-scene encoding, incremented proportionally to scenes completed.
    pub scenes: f64,
    /// Clip concatenation (a no-op share for the frame-stream strategy).
    pub concat: f64,
    /// Audio interleaving and container finalization.
    pub audio_merge: f64,
}

impl Default for ProgressWeights {
    fn default() -> Self {
        Self {
            engine_load: 10.0,
            scenes: 70.0,
            concat: 15.0,
            audio_merge: 5.0,
        }
    }
}

impl ProgressWeights {
    fn sum(self) -> f64 {
        self.engine_load + self.scenes + self.concat + self.audio_merge
    }
}

/// Every tunable of a generation run, with documented defaults.
///
/// One value of this struct is fixed for a whole run: canvas geometry, frame
/// rate, animation thresholds, encoder tuning, retry policy, and progress
/// weights all come from here rather than from scattered literals.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Output canvas. Default is 1080x1920 portrait.
    pub canvas: Canvas,
    /// Output frame rate. Default is 30 fps.
    pub fps: Fps,
    /// Central fraction of the canvas width that content occupies; the
    /// remainder is pillarboxed. Must lie in `[0.6, 1.0]`.
    pub content_width_fraction: f64,
    /// An image whose aspect (h/w) exceeds `content_aspect * pan_aspect_factor`
    /// is animated as a top-to-bottom pan.
    pub pan_aspect_factor: f64,
    /// An image whose aspect falls below `content_aspect * zoom_aspect_factor`
    /// is animated as a centered zoom-in.
    pub zoom_aspect_factor: f64,
    /// Final scale of the zoom-in animation (starts at 1.0).
    pub zoom_max: f64,
    /// Final scale of the subtle drift applied to otherwise static scenes.
    pub static_zoom_max: f64,
    /// Scene duration in seconds when the descriptor omits it.
    pub default_scene_secs: f64,
    /// Letterbox/pillarbox fill color, straight RGBA.
    pub background_rgba: [u8; 4],
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 speed preset.
    pub preset: String,
    /// Force a keyframe every this many frames for seekability.
    pub keyframe_interval: u32,
    /// Maximum pending frames in the encoder submission queue. A saturated
    /// queue suspends the producer (cooperative backpressure).
    pub encoder_queue_depth: usize,
    /// Yield the task to the host every this many rendered frames.
    pub yield_every_frames: u32,
    /// Fetch attempts per asset location before the error becomes terminal.
    pub fetch_attempts: u32,
    /// Fixed delay between fetch attempts.
    pub fetch_backoff: Duration,
    /// Clip encoding strategy used for all scenes of the run.
    pub strategy: StrategyKind,
    /// Progress share per phase.
    pub weights: ProgressWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            fps: Fps { num: 30, den: 1 },
            content_width_fraction: 0.9,
            pan_aspect_factor: 1.3,
            zoom_aspect_factor: 0.7,
            zoom_max: 1.15,
            static_zoom_max: 1.03,
            default_scene_secs: 3.0,
            background_rgba: [16, 16, 16, 255],
            crf: 28,
            preset: "ultrafast".to_owned(),
            keyframe_interval: 60,
            encoder_queue_depth: 8,
            yield_every_frames: 10,
            fetch_attempts: 3,
            fetch_backoff: Duration::from_millis(500),
            strategy: StrategyKind::Transcode,
            weights: ProgressWeights::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration before a run.
    pub fn validate(&self) -> ScenereelResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !(0.6..=1.0).contains(&self.content_width_fraction) {
            return Err(ScenereelError::validation(
                "content_width_fraction must lie in [0.6, 1.0]",
            ));
        }
        if self.pan_aspect_factor <= self.zoom_aspect_factor {
            return Err(ScenereelError::validation(
                "pan_aspect_factor must exceed zoom_aspect_factor",
            ));
        }
        if self.zoom_max < 1.0 || self.static_zoom_max < 1.0 {
            return Err(ScenereelError::validation(
                "zoom bounds must be >= 1.0 (zoom-in only)",
            ));
        }
        if self.default_scene_secs <= 0.0 {
            return Err(ScenereelError::validation(
                "default_scene_secs must be positive",
            ));
        }
        if self.keyframe_interval == 0 {
            return Err(ScenereelError::validation(
                "keyframe_interval must be >= 1",
            ));
        }
        if self.encoder_queue_depth == 0 {
            return Err(ScenereelError::validation(
                "encoder_queue_depth must be >= 1",
            ));
        }
        if self.fetch_attempts == 0 {
            return Err(ScenereelError::validation("fetch_attempts must be >= 1"));
        }
        if (self.weights.sum() - 100.0).abs() > 1e-6 {
            return Err(ScenereelError::validation(
                "progress weights must sum to 100",
            ));
        }
        Ok(())
    }

    /// Width in pixels of the central content area (even-rounded).
    pub fn content_width_px(&self) -> u32 {
        let w = (f64::from(self.canvas.width) * self.content_width_fraction).round() as u32;
        (w / 2 * 2).max(2)
    }

    /// Aspect ratio (height over width) of the content area.
    pub fn content_aspect(&self) -> f64 {
        f64::from(self.canvas.height) / f64::from(self.content_width_px())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn content_width_is_even() {
        let mut cfg = PipelineConfig::default();
        cfg.content_width_fraction = 0.777;
        assert_eq!(cfg.content_width_px() % 2, 0);
    }

    #[test]
    fn rejects_odd_canvas() {
        let mut cfg = PipelineConfig::default();
        cfg.canvas.width = 1081;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_unbalanced_weights() {
        let mut cfg = PipelineConfig::default();
        cfg.weights.scenes = 50.0;
        assert!(cfg.validate().is_err());
    }
}
