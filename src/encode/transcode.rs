//! Transcode strategy: each scene is one engine invocation over its staged
//! source image, producing an intermediate clip in the engine workspace.

use crate::animation::plan::AnimationType;
use crate::assets::decode::ImageAsset;
use crate::compile::plan::{RenderPlan, SceneFilter};
use crate::encode::strategy::{ClipEncodingStrategy, EncodeContext, EncodedVideo};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::ScenereelResult;

/// Strategy that delegates per-scene rendering and encoding to the
/// transcoding engine.
#[derive(Debug, Default)]
pub struct TranscodeStrategy;

impl TranscodeStrategy {
    /// Create the strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ClipEncodingStrategy for TranscodeStrategy {
    async fn encode_scenes(
        &mut self,
        ctx: &EncodeContext<'_>,
        plan: &RenderPlan,
        _images: &[ImageAsset],
        staged_images: &[String],
    ) -> ScenereelResult<EncodedVideo> {
        let cfg = ctx.config;
        let total = plan.scenes.len();
        let mut clips = Vec::with_capacity(total);

        for (i, scene) in plan.scenes.iter().enumerate() {
            ctx.ensure_live()?;

            let input = &staged_images[scene.resolved.image_index];
            let clip = format!("clip_{i}.mp4");
            let filter = engine_filter(&scene.filter, cfg.canvas, cfg.fps, cfg.background_rgba);

            ctx.reporter.log(&format!(
                "clip {}/{}: {} ({:.1}s)",
                i + 1,
                total,
                scene.resolved.animation.label(),
                scene.resolved.duration_secs,
            ));

            let args = vec![
                "-loop".to_owned(),
                "1".to_owned(),
                "-i".to_owned(),
                input.clone(),
                "-vf".to_owned(),
                filter,
                "-t".to_owned(),
                format!("{:.3}", scene.resolved.duration_secs),
                "-c:v".to_owned(),
                "libx264".to_owned(),
                "-preset".to_owned(),
                cfg.preset.clone(),
                "-crf".to_owned(),
                cfg.crf.to_string(),
                "-g".to_owned(),
                cfg.keyframe_interval.to_string(),
                "-pix_fmt".to_owned(),
                "yuv420p".to_owned(),
                "-an".to_owned(),
                clip.clone(),
            ];
            ctx.track(clip.clone());
            ctx.engine.engine().exec(&args).await?;

            clips.push(clip);
            ctx.phases.scenes_done(ctx.reporter, i + 1);
        }

        Ok(EncodedVideo::Clips(clips))
    }
}

/// Build the engine filter expression realizing a compiled [`SceneFilter`].
fn engine_filter(f: &SceneFilter, canvas: Canvas, fps: Fps, bg: [u8; 4]) -> String {
    let (w, h) = (canvas.width, canvas.height);
    let color = format!("0x{:02x}{:02x}{:02x}", bg[0], bg[1], bg[2]);
    let fps_str = format!("{}/{}", fps.num, fps.den);

    match f.animation {
        AnimationType::PanDown => {
            if f.pan_travel_px == 0 {
                // Image shorter than the canvas: center it on the padded frame.
                format!(
                    "scale={sw}:{sh},pad={w}:{h}:{ox}:{oy}:color={color},fps={fps_str}",
                    sw = f.scaled_width,
                    sh = f.scaled_height,
                    ox = f.offset_x,
                    oy = f.offset_y,
                )
            } else {
                // Scroll linearly from the top of the image to its bottom.
                let dur = fps.frames_to_secs(f.frames);
                format!(
                    "scale={sw}:{sh},pad={w}:{sh}:{ox}:0:color={color},\
                     crop={w}:{h}:0:'min({travel},{travel}*t/{dur:.3})',fps={fps_str}",
                    sw = f.scaled_width,
                    sh = f.scaled_height,
                    ox = f.offset_x,
                    travel = f.pan_travel_px,
                )
            }
        }
        AnimationType::Zoom | AnimationType::Static => {
            // Cover-scale, center-crop to the canvas, then zoom in place.
            let dz = f.zoom_end - f.zoom_start;
            format!(
                "scale={sw}:{sh},crop={w}:{h},\
                 zoompan=z='{zs}+{dz:.6}*on/{frames}':d={frames}:\
                 x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s={w}x{h}:fps={fps_str}",
                sw = f.scaled_width,
                sh = f.scaled_height,
                zs = f.zoom_start,
                frames = f.frames,
            )
        }
    }
}
