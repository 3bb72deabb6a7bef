//! Frame-stream strategy: render every output frame onto an in-memory canvas
//! and submit it to a queue-based encoder with cooperative backpressure.

use std::process::Stdio;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::assets::decode::ImageAsset;
use crate::compile::plan::RenderPlan;
use crate::encode::mux::SILENT_VIDEO;
use crate::encode::strategy::{ClipEncodingStrategy, EncodeContext, EncodedVideo};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ScenereelError, ScenereelResult};
use crate::render::canvas::{FrameRgba, SceneRaster};

/// Configuration handed to a [`FrameEncoder`] before the first frame.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Keyframe cadence in frames.
    pub keyframe_interval: u32,
    /// Maximum frames pending in the submission queue.
    pub queue_depth: usize,
    /// x264 speed preset.
    pub preset: String,
    /// x264 constant rate factor.
    pub crf: u8,
}

/// Queue-based low-level encoder consuming rendered frames in timeline order.
///
/// Ordering contract: `submit` is called with strictly increasing frame
/// indices. A saturated submission queue suspends the caller until the
/// encoder drains (cooperative backpressure).
#[async_trait::async_trait]
pub trait FrameEncoder: Send {
    /// Called once before any frame.
    async fn begin(&mut self, cfg: EncoderConfig) -> ScenereelResult<()>;
    /// Submit one frame; `keyframe` marks the run's periodic keyframe cadence.
    async fn submit(
        &mut self,
        idx: FrameIndex,
        frame: FrameRgba,
        keyframe: bool,
    ) -> ScenereelResult<()>;
    /// Flush and return the finished silent video track.
    async fn finish(&mut self) -> ScenereelResult<Bytes>;
}

/// Strategy that renders frames on the CPU and streams them to a
/// [`FrameEncoder`].
pub struct FrameStreamStrategy {
    encoder: Box<dyn FrameEncoder>,
}

impl FrameStreamStrategy {
    /// Use a caller-provided frame encoder.
    pub fn new(encoder: Box<dyn FrameEncoder>) -> Self {
        Self { encoder }
    }

    /// Use the default system-ffmpeg frame encoder.
    pub fn with_default_encoder() -> Self {
        Self::new(Box::new(FfmpegFrameEncoder::new()))
    }
}

#[async_trait::async_trait]
impl ClipEncodingStrategy for FrameStreamStrategy {
    async fn encode_scenes(
        &mut self,
        ctx: &EncodeContext<'_>,
        plan: &RenderPlan,
        images: &[ImageAsset],
        _staged_images: &[String],
    ) -> ScenereelResult<EncodedVideo> {
        let cfg = ctx.config;
        self.encoder
            .begin(EncoderConfig {
                canvas: cfg.canvas,
                fps: cfg.fps,
                keyframe_interval: cfg.keyframe_interval,
                queue_depth: cfg.encoder_queue_depth,
                preset: cfg.preset.clone(),
                crf: cfg.crf,
            })
            .await?;

        let total = plan.scenes.len();
        let mut global = 0u64;
        for (i, scene) in plan.scenes.iter().enumerate() {
            ctx.ensure_live()?;
            ctx.reporter.log(&format!(
                "clip {}/{}: {} ({:.1}s)",
                i + 1,
                total,
                scene.resolved.animation.label(),
                scene.resolved.duration_secs,
            ));

            let raster = SceneRaster::prepare(&images[scene.resolved.image_index], scene.filter)?;
            for frame in 0..scene.filter.frames {
                ctx.ensure_live()?;
                let rendered = raster.render_frame(frame, cfg.canvas, cfg.background_rgba);
                let keyframe = global.is_multiple_of(u64::from(cfg.keyframe_interval));
                self.encoder
                    .submit(FrameIndex(global), rendered, keyframe)
                    .await?;
                global += 1;

                // Keep the host responsive between queue suspensions.
                if global.is_multiple_of(u64::from(cfg.yield_every_frames.max(1))) {
                    tokio::task::yield_now().await;
                }
            }
            ctx.phases.scenes_done(ctx.reporter, i + 1);
        }

        let encoded = self.encoder.finish().await?;
        ctx.stage(SILENT_VIDEO, &encoded).await?;
        Ok(EncodedVideo::Stream(SILENT_VIDEO.to_owned()))
    }
}

/// Frame encoder that pipes raw RGBA frames into a spawned `ffmpeg`.
///
/// The submission queue is a bounded channel drained by a writer task; the
/// keyframe cadence is realized through the encoder's GOP length.
pub struct FfmpegFrameEncoder {
    state: Option<Running>,
    out_dir: Option<tempfile::TempDir>,
    frame_len: usize,
    last_idx: Option<FrameIndex>,
}

struct Running {
    child: tokio::process::Child,
    tx: mpsc::Sender<Vec<u8>>,
    writer: tokio::task::JoinHandle<std::io::Result<()>>,
    out_path: std::path::PathBuf,
}

impl FfmpegFrameEncoder {
    /// Create an idle encoder.
    pub fn new() -> Self {
        Self {
            state: None,
            out_dir: None,
            frame_len: 0,
            last_idx: None,
        }
    }
}

impl Default for FfmpegFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FrameEncoder for FfmpegFrameEncoder {
    async fn begin(&mut self, cfg: EncoderConfig) -> ScenereelResult<()> {
        cfg.canvas.validate()?;
        Fps::new(cfg.fps.num, cfg.fps.den)?;

        let out_dir = tempfile::Builder::new()
            .prefix("scenereel-frames-")
            .tempdir()
            .map_err(|e| {
                ScenereelError::engine(format!("failed to create encoder output dir: {e}"))
            })?;
        let out_path = out_dir.path().join("video_silent.mp4");

        let mut child = tokio::process::Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args([
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
                "-r",
                &format!("{}/{}", cfg.fps.num, cfg.fps.den),
                "-i",
                "pipe:0",
                "-c:v",
                "libx264",
                "-preset",
                &cfg.preset,
                "-crf",
                &cfg.crf.to_string(),
                "-g",
                &cfg.keyframe_interval.to_string(),
                "-pix_fmt",
                "yuv420p",
                "-an",
            ])
            .arg(&out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ScenereelError::engine(format!(
                    "failed to spawn ffmpeg frame encoder (is it installed and on PATH?): {e}"
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScenereelError::engine("failed to open frame encoder stdin"))?;

        // Bounded queue: a full channel suspends `submit` until the writer
        // drains, which is the strategy's backpressure point.
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(cfg.queue_depth.max(1));
        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                stdin.write_all(&frame).await?;
            }
            stdin.shutdown().await
        });

        self.frame_len = (cfg.canvas.width * cfg.canvas.height * 4) as usize;
        self.last_idx = None;
        self.state = Some(Running {
            child,
            tx,
            writer,
            out_path,
        });
        self.out_dir = Some(out_dir);
        Ok(())
    }

    async fn submit(
        &mut self,
        idx: FrameIndex,
        frame: FrameRgba,
        _keyframe: bool,
    ) -> ScenereelResult<()> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ScenereelError::engine("frame encoder not started"))?;

        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ScenereelError::engine(
                "frame encoder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.data.len() != self.frame_len {
            return Err(ScenereelError::validation(format!(
                "frame size mismatch: got {} bytes, expected {}",
                frame.data.len(),
                self.frame_len
            )));
        }

        state
            .tx
            .send(frame.data)
            .await
            .map_err(|_| ScenereelError::engine("frame encoder writer stopped accepting frames"))
    }

    async fn finish(&mut self) -> ScenereelResult<Bytes> {
        let state = self
            .state
            .take()
            .ok_or_else(|| ScenereelError::engine("frame encoder not started"))?;
        let Running {
            mut child,
            tx,
            writer,
            out_path,
        } = state;

        drop(tx);
        writer
            .await
            .map_err(|_| ScenereelError::engine("frame encoder writer task panicked"))?
            .map_err(|e| ScenereelError::engine(format!("failed to write frames to ffmpeg: {e}")))?;

        let out = child
            .wait_with_output()
            .await
            .map_err(|e| ScenereelError::engine(format!("failed to wait for ffmpeg: {e}")))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ScenereelError::engine(format!(
                "ffmpeg frame encoder exited with status {}: {}",
                out.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&out_path).await.map_err(|e| {
            ScenereelError::engine(format!("failed to read encoded video: {e}"))
        })?;
        self.out_dir = None;
        Ok(Bytes::from(bytes))
    }
}

/// Shared view of what a [`MemoryFrameEncoder`] received; survives handing
/// the encoder to a strategy by value.
#[derive(Clone, Default)]
pub struct MemoryFrameLog {
    inner: std::sync::Arc<std::sync::Mutex<Vec<(FrameIndex, bool)>>>,
}

impl MemoryFrameLog {
    /// Submitted frame indices with their keyframe marks, in order.
    pub fn frames(&self) -> Vec<(FrameIndex, bool)> {
        self.inner.lock().expect("frame log poisoned").clone()
    }
}

/// In-memory frame encoder for tests and debugging.
#[derive(Default)]
pub struct MemoryFrameEncoder {
    cfg: Option<EncoderConfig>,
    log: MemoryFrameLog,
}

impl MemoryFrameEncoder {
    /// Create an empty encoder plus a log handle for later inspection.
    pub fn new() -> (Self, MemoryFrameLog) {
        let enc = Self::default();
        let log = enc.log.clone();
        (enc, log)
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.cfg.as_ref()
    }
}

#[async_trait::async_trait]
impl FrameEncoder for MemoryFrameEncoder {
    async fn begin(&mut self, cfg: EncoderConfig) -> ScenereelResult<()> {
        self.cfg = Some(cfg);
        self.log.inner.lock().expect("frame log poisoned").clear();
        Ok(())
    }

    async fn submit(
        &mut self,
        idx: FrameIndex,
        _frame: FrameRgba,
        keyframe: bool,
    ) -> ScenereelResult<()> {
        self.log
            .inner
            .lock()
            .expect("frame log poisoned")
            .push((idx, keyframe));
        Ok(())
    }

    async fn finish(&mut self) -> ScenereelResult<Bytes> {
        Ok(Bytes::from_static(b"memory-encoded-video"))
    }
}
