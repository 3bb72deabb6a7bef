use tokio_util::sync::CancellationToken;

use crate::assets::decode::ImageAsset;
use crate::compile::plan::RenderPlan;
use crate::encode::engine::EngineHandle;
use crate::foundation::error::ScenereelResult;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::progress::{PhaseTracker, Reporter};

/// Which clip encoding strategy a run uses. Selected once per run and reused
/// for every scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Hand each scene to the transcoding engine as a single filtered, timed
    /// image source; the engine emits an intermediate clip per scene.
    #[default]
    Transcode,
    /// Render every output frame explicitly and submit it to a queue-based
    /// frame encoder.
    FrameStream,
}

/// Shared state every encoding stage of a run works against.
pub struct EncodeContext<'a> {
    /// The caller-owned engine handle.
    pub engine: &'a EngineHandle,
    /// The run configuration.
    pub config: &'a PipelineConfig,
    /// Progress/log sink.
    pub reporter: &'a Reporter,
    /// Checked at every suspension point.
    pub cancel: &'a CancellationToken,
    pub(crate) phases: PhaseTracker,
    tracked: std::sync::Mutex<Vec<String>>,
}

impl<'a> EncodeContext<'a> {
    pub(crate) fn new(
        engine: &'a EngineHandle,
        config: &'a PipelineConfig,
        reporter: &'a Reporter,
        cancel: &'a CancellationToken,
        scene_count: usize,
    ) -> Self {
        Self {
            engine,
            config,
            reporter,
            cancel,
            phases: PhaseTracker::new(config.weights, scene_count),
            tracked: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Fail fast when the run has been cancelled.
    pub(crate) fn ensure_live(&self) -> ScenereelResult<()> {
        if self.cancel.is_cancelled() {
            return Err(crate::foundation::error::ScenereelError::Cancelled);
        }
        Ok(())
    }

    /// Register a workspace entry for removal when the run ends, whether it
    /// ends in success or failure.
    pub(crate) fn track(&self, name: impl Into<String>) {
        self.tracked
            .lock()
            .expect("tracked entry list poisoned")
            .push(name.into());
    }

    /// Stage bytes into the engine workspace and track the entry.
    pub(crate) async fn stage(&self, name: &str, bytes: &[u8]) -> ScenereelResult<()> {
        self.track(name);
        self.engine.engine().write_input(name, bytes).await
    }

    pub(crate) fn into_tracked(self) -> Vec<String> {
        self.tracked
            .into_inner()
            .expect("tracked entry list poisoned")
    }
}

/// Result of encoding all scenes: either ordered per-scene clips awaiting
/// concatenation, or one already-continuous video track. Names refer to
/// engine workspace entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodedVideo {
    /// Per-scene clip entries in scene order (transcode strategy).
    Clips(Vec<String>),
    /// A single continuous silent video track (frame-stream strategy).
    Stream(String),
}

/// One interchangeable way to realize scenes as encoded video.
///
/// Scenes are encoded strictly one after another in scene order; both
/// strategies honor the run's fixed resolution, frame rate, and keyframe
/// cadence.
#[async_trait::async_trait]
pub trait ClipEncodingStrategy: Send {
    /// Encode every planned scene, reporting per-scene progress.
    async fn encode_scenes(
        &mut self,
        ctx: &EncodeContext<'_>,
        plan: &RenderPlan,
        images: &[ImageAsset],
        staged_images: &[String],
    ) -> ScenereelResult<EncodedVideo>;
}

/// Construct the strategy selected by the configuration.
pub(crate) fn make_strategy(kind: StrategyKind) -> Box<dyn ClipEncodingStrategy> {
    match kind {
        StrategyKind::Transcode => Box::new(crate::encode::transcode::TranscodeStrategy::new()),
        StrategyKind::FrameStream => Box::new(
            crate::encode::frames::FrameStreamStrategy::with_default_encoder(),
        ),
    }
}
