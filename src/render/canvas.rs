use image::RgbaImage;

use crate::animation::plan::AnimationType;
use crate::assets::decode::ImageAsset;
use crate::compile::plan::SceneFilter;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ScenereelError, ScenereelResult};

/// A rendered output frame as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

/// Per-scene rasterizer for the frame-stream strategy.
///
/// The source image is pre-scaled once to the compiled dimensions; every
/// frame then only crops, resizes a zoom window, or copies pan rows.
pub(crate) struct SceneRaster {
    prescaled: RgbaImage,
    filter: SceneFilter,
}

impl SceneRaster {
    /// Pre-scale the source image for its compiled geometry.
    pub(crate) fn prepare(img: &ImageAsset, filter: SceneFilter) -> ScenereelResult<Self> {
        let src = RgbaImage::from_raw(img.width, img.height, img.rgba8.clone()).ok_or_else(
            || ScenereelError::decode(format!("image {} pixel buffer size mismatch", img.index)),
        )?;
        let prescaled = image::imageops::resize(
            &src,
            filter.scaled_width,
            filter.scaled_height,
            image::imageops::FilterType::Triangle,
        );
        Ok(Self { prescaled, filter })
    }

    /// Render output frame `frame` of the scene onto a fresh canvas.
    pub(crate) fn render_frame(&self, frame: u64, canvas: Canvas, bg: [u8; 4]) -> FrameRgba {
        let mut out = RgbaImage::from_pixel(canvas.width, canvas.height, image::Rgba(bg));
        let t = self.filter.time_fraction(frame);

        match self.filter.animation {
            AnimationType::PanDown => self.draw_pan(&mut out, canvas, t),
            AnimationType::Zoom | AnimationType::Static => self.draw_zoom(&mut out, canvas, t),
        }

        FrameRgba {
            width: canvas.width,
            height: canvas.height,
            data: out.into_raw(),
        }
    }

    fn draw_pan(&self, out: &mut RgbaImage, canvas: Canvas, t: f64) {
        let f = &self.filter;
        let y_off = f.pan_offset_at(t).round() as u32;
        let visible_h = f.scaled_height.min(canvas.height);
        let y_off = y_off.min(f.scaled_height - visible_h);

        let view = image::imageops::crop_imm(&self.prescaled, 0, y_off, f.scaled_width, visible_h);
        image::imageops::overlay(
            out,
            &view.to_image(),
            i64::from(f.offset_x),
            i64::from(f.offset_y),
        );
    }

    fn draw_zoom(&self, out: &mut RgbaImage, canvas: Canvas, t: f64) {
        let f = &self.filter;
        let z = f.zoom_at(t).max(1.0);

        // Shrink a canvas-aspect sampling window as zoom grows, keeping it
        // centered. The pre-scale covers the canvas, so the window always
        // fits inside the image.
        let win_w = ((f64::from(canvas.width) / z).round() as u32).clamp(2, f.scaled_width);
        let win_h = ((f64::from(canvas.height) / z).round() as u32).clamp(2, f.scaled_height);
        let win_x = (f.scaled_width - win_w) / 2;
        let win_y = (f.scaled_height - win_h) / 2;

        let window = image::imageops::crop_imm(&self.prescaled, win_x, win_y, win_w, win_h);
        let scaled = image::imageops::resize(
            &window.to_image(),
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Triangle,
        );
        image::imageops::overlay(out, &scaled, 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::PipelineConfig;
    use crate::scene::model::ResolvedScene;
    use bytes::Bytes;

    fn asset(w: u32, h: u32, fill: [u8; 4]) -> ImageAsset {
        ImageAsset {
            index: 0,
            bytes: Bytes::new(),
            width: w,
            height: h,
            rgba8: fill.repeat((w * h) as usize),
        }
    }

    fn small_cfg() -> PipelineConfig {
        PipelineConfig {
            canvas: Canvas {
                width: 64,
                height: 96,
            },
            ..PipelineConfig::default()
        }
    }

    fn filter_for(cfg: &PipelineConfig, img: &ImageAsset, animation: AnimationType) -> SceneFilter {
        let resolved = ResolvedScene {
            scene_index: 0,
            image_index: 0,
            duration_secs: 1.0,
            animation,
        };
        crate::compile::plan::compile_plan(&[resolved], std::slice::from_ref(img), cfg).scenes[0]
            .filter
    }

    #[test]
    fn rendered_frame_matches_canvas_dimensions() {
        let cfg = small_cfg();
        let img = asset(40, 400, [200, 10, 10, 255]);
        let filter = filter_for(&cfg, &img, AnimationType::PanDown);
        let raster = SceneRaster::prepare(&img, filter).unwrap();

        let frame = raster.render_frame(0, cfg.canvas, cfg.background_rgba);
        assert_eq!(frame.width, cfg.canvas.width);
        assert_eq!(frame.height, cfg.canvas.height);
        assert_eq!(frame.data.len(), (64 * 96 * 4) as usize);
    }

    #[test]
    fn pan_frames_differ_over_time() {
        let cfg = small_cfg();
        // Paint a vertical gradient so panned frames are distinguishable.
        let mut img = asset(40, 400, [0, 0, 0, 255]);
        for y in 0..400u32 {
            for x in 0..40u32 {
                img.rgba8[((y * 40 + x) * 4) as usize] = (y % 256) as u8;
            }
        }
        let filter = filter_for(&cfg, &img, AnimationType::PanDown);
        assert!(filter.pan_travel_px > 0);
        let raster = SceneRaster::prepare(&img, filter).unwrap();

        let first = raster.render_frame(0, cfg.canvas, cfg.background_rgba);
        let last = raster.render_frame(filter.frames - 1, cfg.canvas, cfg.background_rgba);
        assert_ne!(first.data, last.data);
    }

    #[test]
    fn zoom_keeps_canvas_fully_covered() {
        let cfg = small_cfg();
        let img = asset(200, 50, [0, 255, 0, 255]);
        let filter = filter_for(&cfg, &img, AnimationType::Zoom);
        let raster = SceneRaster::prepare(&img, filter).unwrap();

        let frame = raster.render_frame(filter.frames - 1, cfg.canvas, cfg.background_rgba);
        // No pixel should show the background through a covering zoom.
        for px in frame.data.chunks_exact(4) {
            assert_eq!(px[1], 255);
        }
    }
}
