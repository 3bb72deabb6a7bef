//! Translates planned animations into concrete transform geometry for the
//! fixed output canvas.

use crate::animation::plan::AnimationType;
use crate::assets::decode::ImageAsset;
use crate::pipeline::config::PipelineConfig;
use crate::scene::model::ResolvedScene;

/// Concrete numeric transform parameters for one scene on the fixed canvas.
///
/// All values are canvas-space pixels except the zoom factors. The pre-scale
/// dimensions are even-rounded so every downstream encoder accepts them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneFilter {
    /// Animation these parameters realize.
    pub animation: AnimationType,
    /// Width the source image is pre-scaled to.
    pub scaled_width: u32,
    /// Height the source image is pre-scaled to.
    pub scaled_height: u32,
    /// Left pillarbox offset centering the content horizontally.
    pub offset_x: u32,
    /// Top letterbox offset centering content too short to fill the canvas.
    pub offset_y: u32,
    /// Scale factor at the start of the scene.
    pub zoom_start: f64,
    /// Scale factor at the end of the scene.
    pub zoom_end: f64,
    /// Total vertical pan distance in pre-scaled pixels. Zero when the scaled
    /// image is not tall enough to pan.
    pub pan_travel_px: u32,
    /// Number of output frames for the scene, always at least one.
    pub frames: u64,
}

impl SceneFilter {
    /// Normalized time fraction of `frame` within the scene, reaching exactly
    /// `1.0` on the final frame.
    pub fn time_fraction(&self, frame: u64) -> f64 {
        if self.frames <= 1 {
            return 0.0;
        }
        (frame.min(self.frames - 1)) as f64 / (self.frames - 1) as f64
    }

    /// Zoom factor at time fraction `t`, linearly interpolated.
    pub fn zoom_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        self.zoom_start + (self.zoom_end - self.zoom_start) * t
    }

    /// Vertical pan offset in pre-scaled pixels at time fraction `t`.
    ///
    /// Linear from 0 to the full travel; clamped to 0 when the scaled image
    /// is not tall enough to pan.
    pub fn pan_offset_at(&self, t: f64) -> f64 {
        f64::from(self.pan_travel_px) * t.clamp(0.0, 1.0)
    }
}

/// One entry of a [`RenderPlan`].
#[derive(Clone, Copy, Debug)]
pub struct PlannedScene {
    /// The repaired and planned scene.
    pub resolved: ResolvedScene,
    /// Its compiled transform geometry.
    pub filter: SceneFilter,
}

/// Ordered transform geometry for a whole run; one entry per input scene,
/// consumed once by the clip encoder.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    /// Scenes in input order.
    pub scenes: Vec<PlannedScene>,
}

impl RenderPlan {
    /// Total output frames across all scenes.
    pub fn total_frames(&self) -> u64 {
        self.scenes.iter().map(|s| s.filter.frames).sum()
    }

    /// Total video duration in seconds at the configured frame rate.
    pub fn total_duration_secs(&self, cfg: &PipelineConfig) -> f64 {
        cfg.fps.frames_to_secs(self.total_frames())
    }
}

/// Compile every resolved scene against its source image.
pub fn compile_plan(
    resolved: &[ResolvedScene],
    images: &[ImageAsset],
    cfg: &PipelineConfig,
) -> RenderPlan {
    let scenes = resolved
        .iter()
        .map(|r| PlannedScene {
            resolved: *r,
            filter: compile_scene(r, &images[r.image_index], cfg),
        })
        .collect();
    RenderPlan { scenes }
}

fn compile_scene(scene: &ResolvedScene, img: &ImageAsset, cfg: &PipelineConfig) -> SceneFilter {
    let canvas = cfg.canvas;
    let frames = cfg.fps.secs_to_frames(scene.duration_secs);

    match scene.animation {
        AnimationType::PanDown => {
            let scaled_width = cfg.content_width_px().min(even_floor(canvas.width));
            let scale = f64::from(scaled_width) / f64::from(img.width);
            let scaled_height = even_round(f64::from(img.height) * scale);
            let pan_travel_px = scaled_height.saturating_sub(canvas.height);

            SceneFilter {
                animation: scene.animation,
                scaled_width,
                scaled_height,
                offset_x: (canvas.width - scaled_width) / 2,
                offset_y: canvas.height.saturating_sub(scaled_height) / 2,
                zoom_start: 1.0,
                zoom_end: 1.0,
                pan_travel_px,
                frames,
            }
        }
        AnimationType::Zoom | AnimationType::Static => {
            // Cover the full canvas, center, and crop the overflow.
            let scale = (f64::from(canvas.width) / f64::from(img.width))
                .max(f64::from(canvas.height) / f64::from(img.height));
            let scaled_width = even_ceil(f64::from(img.width) * scale).max(canvas.width);
            let scaled_height = even_ceil(f64::from(img.height) * scale).max(canvas.height);
            let zoom_end = match scene.animation {
                AnimationType::Zoom => cfg.zoom_max,
                _ => cfg.static_zoom_max,
            };

            SceneFilter {
                animation: scene.animation,
                scaled_width,
                scaled_height,
                offset_x: 0,
                offset_y: 0,
                zoom_start: 1.0,
                zoom_end,
                pan_travel_px: 0,
                frames,
            }
        }
    }
}

fn even_round(v: f64) -> u32 {
    let r = v.round().max(2.0) as u32;
    r / 2 * 2
}

fn even_ceil(v: f64) -> u32 {
    let r = v.ceil().max(2.0) as u32;
    r.next_multiple_of(2)
}

fn even_floor(v: u32) -> u32 {
    (v / 2 * 2).max(2)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
