//! Scenereel is a client-side scene-to-video compositing engine.
//!
//! It turns an ordered set of still images, one narration audio track, and
//! per-scene timing/animation metadata into a single encoded,
//! audio-synchronized MP4, entirely inside the calling process. The public
//! API is run-oriented:
//!
//! - Build a [`GenerateRequest`] (directly or from the upstream JSON payload)
//! - Own an [`EngineHandle`] and reuse it across runs
//! - Call [`generate_video`] with a [`Reporter`] and a cancellation token
//!
//! Scenes are repaired (degenerate image mappings are rebuilt round-robin),
//! classified into pan/zoom/static animations from their geometry, compiled
//! into concrete transform parameters, and realized by one of two
//! interchangeable encoding strategies before audio is muxed in with
//! "shortest stream wins" trimming.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod render;

/// Animation planning.
pub mod animation;
/// Asset retrieval and decoding.
pub mod assets;
/// Geometry compilation.
pub mod compile;
/// Encoding strategies, engine seam, muxing.
pub mod encode;
/// Run orchestration and configuration.
pub mod pipeline;
/// Scene descriptors and sequence repair.
pub mod scene;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{ScenereelError, ScenereelResult};

pub use crate::animation::plan::AnimationType;
pub use crate::assets::decode::{AudioAsset, ImageAsset};
pub use crate::assets::fetch::AssetFetcher;
pub use crate::compile::plan::{PlannedScene, RenderPlan, SceneFilter};
pub use crate::encode::engine::{EngineHandle, FfmpegCliEngine, MemoryEngine, TranscodeEngine};
pub use crate::encode::frames::{
    EncoderConfig, FfmpegFrameEncoder, FrameEncoder, FrameStreamStrategy, MemoryFrameEncoder,
    MemoryFrameLog,
};
pub use crate::encode::strategy::{ClipEncodingStrategy, EncodeContext, EncodedVideo, StrategyKind};
pub use crate::encode::transcode::TranscodeStrategy;
pub use crate::pipeline::config::{PipelineConfig, ProgressWeights};
pub use crate::pipeline::generate::{GenerateRequest, VideoOutput, generate_video, save_video};
pub use crate::pipeline::progress::Reporter;
pub use crate::render::canvas::FrameRgba;
pub use crate::scene::model::{ImageIndexValue, ResolvedScene, SceneDescriptor};
pub use crate::scene::resolve::{resolve_indices, resolve_scenes};
