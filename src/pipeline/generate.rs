//! End-to-end orchestration of one generation run.

use std::path::Path;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::assets::decode::{self, AudioAsset, ImageAsset};
use crate::assets::fetch::AssetFetcher;
use crate::compile::plan::compile_plan;
use crate::encode::engine::EngineHandle;
use crate::encode::mux;
use crate::encode::strategy::{EncodeContext, make_strategy};
use crate::foundation::error::{ScenereelError, ScenereelResult};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::progress::Reporter;
use crate::scene::model::SceneDescriptor;
use crate::scene::resolve::resolve_scenes;

/// Sample rate the narration is probed at.
const PROBE_SAMPLE_RATE: u32 = 48_000;
/// Workspace entry names for the narration input and its probe output.
const AUDIO_INPUT: &str = "audio_input";
const AUDIO_PROBE: &str = "audio_probe.f32le";

/// Everything the upstream collaborator supplies for one run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GenerateRequest {
    /// Ordered image locations; position `i` becomes image asset `i`.
    pub image_urls: Vec<String>,
    /// Location of the single narration track.
    pub audio_url: String,
    /// Ordered scene descriptors, accepted as-is.
    pub scenes: Vec<SceneDescriptor>,
}

impl GenerateRequest {
    /// Parse a request from the upstream collaborator's JSON payload.
    pub fn from_json(json: &str) -> ScenereelResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScenereelError::validation(format!("invalid request JSON: {e}")))
    }

    fn validate(&self) -> ScenereelResult<()> {
        if self.image_urls.is_empty() {
            return Err(ScenereelError::validation(
                "at least one image location is required",
            ));
        }
        if self.audio_url.is_empty() {
            return Err(ScenereelError::validation("audio location is required"));
        }
        if self.scenes.is_empty() {
            return Err(ScenereelError::validation("at least one scene is required"));
        }
        Ok(())
    }
}

/// The finished video. Created exactly once per successful run; ownership
/// passes to the caller.
#[derive(Clone, Debug)]
pub struct VideoOutput {
    /// The encoded MP4 container.
    pub data: Bytes,
    /// Output duration: the shorter of total scene time and narration time.
    pub duration_secs: f64,
}

/// Turn ordered still images, one narration track, and per-scene metadata
/// into a single audio-synchronized MP4.
///
/// The engine handle is borrowed for the whole run, so it cannot be torn
/// down while the run is in flight, and its expensive initialization happens
/// at most once across any number of runs. Intermediate workspace entries
/// are removed on success and failure alike; cancellation is honored at
/// every suspension point.
#[tracing::instrument(skip_all, fields(scenes = request.scenes.len(), images = request.image_urls.len()))]
pub async fn generate_video(
    request: &GenerateRequest,
    engine: &EngineHandle,
    config: &PipelineConfig,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> ScenereelResult<VideoOutput> {
    config.validate()?;
    request.validate()?;

    let ctx = EncodeContext::new(engine, config, reporter, cancel, request.scenes.len());
    let result = run(request, &ctx).await;

    // Guaranteed release of intermediates regardless of how the run ended.
    for name in ctx.into_tracked() {
        if let Err(e) = engine.engine().remove(&name).await {
            tracing::warn!(entry = %name, error = %e, "workspace cleanup failed");
        }
    }

    result
}

async fn run(request: &GenerateRequest, ctx: &EncodeContext<'_>) -> ScenereelResult<VideoOutput> {
    let cfg = ctx.config;
    let reporter = ctx.reporter;
    ctx.ensure_live()?;

    reporter.log("starting video generation");
    reporter.log("loading encoding engine");
    ctx.engine.ensure_loaded().await?;
    ctx.phases.engine_loaded(reporter);

    reporter.log("downloading images and audio");
    let fetcher = AssetFetcher::new(cfg);
    let (image_bytes, audio_bytes) = fetcher
        .fetch_all(&request.image_urls, &request.audio_url, ctx.cancel)
        .await?;
    reporter.log(&format!(
        "downloaded {} images and audio",
        image_bytes.len()
    ));

    let images: Vec<ImageAsset> = image_bytes
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| decode::decode_image(i, bytes))
        .collect::<ScenereelResult<_>>()?;

    let staged_images = stage_images(ctx, &images).await?;
    let audio = probe_audio(ctx, audio_bytes).await?;
    reporter.log("files staged into engine workspace");

    let resolved = resolve_scenes(&request.scenes, &images, cfg);
    let plan = compile_plan(&resolved, &images, cfg);

    let video_secs = plan.total_duration_secs(cfg);
    let audio_secs = audio.duration_secs();
    let drift = (video_secs - audio_secs).abs();
    if drift > cfg.fps.frame_duration_secs() {
        reporter.log(&format!(
            "scene time ({video_secs:.2}s) and narration ({audio_secs:.2}s) differ; \
             output is trimmed to the shorter"
        ));
    }

    reporter.log("generating animated clips");
    let mut strategy = make_strategy(cfg.strategy);
    let encoded = strategy
        .encode_scenes(ctx, &plan, &images, &staged_images)
        .await?;
    reporter.log("all clips generated");

    let video_entry = mux::concatenate(ctx, &encoded).await?;
    let data = mux::mux_audio(ctx, &video_entry, AUDIO_INPUT).await?;
    reporter.log("audio merged");

    ctx.phases.finished(reporter);
    reporter.log("video generation complete");

    Ok(VideoOutput {
        data,
        duration_secs: video_secs.min(audio_secs),
    })
}

/// Stage every image into the engine workspace under its run index.
async fn stage_images(
    ctx: &EncodeContext<'_>,
    images: &[ImageAsset],
) -> ScenereelResult<Vec<String>> {
    let mut names = Vec::with_capacity(images.len());
    for img in images {
        ctx.ensure_live()?;
        let name = format!(
            "image_{}.{}",
            img.index,
            decode::staging_extension(&img.bytes)
        );
        ctx.stage(&name, &img.bytes).await?;
        names.push(name);
    }
    Ok(names)
}

/// Stage the narration and decode it through the engine, yielding the sample
/// summary that drives the "shortest stream wins" duration.
async fn probe_audio(ctx: &EncodeContext<'_>, bytes: Bytes) -> ScenereelResult<AudioAsset> {
    ctx.ensure_live()?;
    ctx.stage(AUDIO_INPUT, &bytes).await?;

    ctx.track(AUDIO_PROBE);
    let rate = PROBE_SAMPLE_RATE.to_string();
    let args = [
        "-i",
        AUDIO_INPUT,
        "-vn",
        "-f",
        "f32le",
        "-acodec",
        "pcm_f32le",
        "-ac",
        "2",
        "-ar",
        rate.as_str(),
        AUDIO_PROBE,
    ]
    .map(str::to_owned);
    ctx.engine.engine().exec(&args).await.map_err(|e| {
        ScenereelError::decode(format!("narration track could not be decoded: {e}"))
    })?;

    let pcm = ctx.engine.engine().read_output(AUDIO_PROBE).await?;
    decode::audio_from_f32le(bytes, &pcm, PROBE_SAMPLE_RATE, 2)
}

/// Write a finished video to disk (the file-save boundary helper).
pub fn save_video(output: &VideoOutput, path: &Path) -> ScenereelResult<()> {
    use anyhow::Context as _;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, &output.data)
        .with_context(|| format!("failed to write video to '{}'", path.display()))?;
    Ok(())
}
