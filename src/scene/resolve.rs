//! Scene sequence repair.
//!
//! Upstream scene lists sometimes assign the same (or no) image index to every
//! scene, which would collapse the whole video onto one still. The resolver
//! detects that shape and rebuilds a usable mapping instead of failing.

use crate::animation::plan::plan_animation;
use crate::assets::decode::ImageAsset;
use crate::pipeline::config::PipelineConfig;
use crate::scene::model::{ResolvedScene, SceneDescriptor};

/// Repair and validate the scene-to-image mapping.
///
/// Deterministic and side-effect free. `image_count` must be non-zero.
///
/// A mapping is considered broken when the distinct parseable indices across
/// all scenes are either absent entirely or collapse to the degenerate
/// default (`0`) while more than one image is available; broken mappings are
/// replaced by a round-robin `scene_index % image_count` assignment so every
/// image is used and scenes advance visually. Otherwise each index is parsed
/// (integer or numeric string), falls back to round-robin on parse failure,
/// and is clamped into `[0, image_count - 1]`.
pub fn resolve_indices(scenes: &[SceneDescriptor], image_count: usize) -> Vec<usize> {
    assert!(image_count > 0, "resolve_indices requires at least one image");

    let mut distinct: Vec<i64> = scenes
        .iter()
        .filter_map(|s| s.image_page_index.as_ref().and_then(|v| v.parse()))
        .collect();
    distinct.sort_unstable();
    distinct.dedup();

    let broken = image_count > 1 && (distinct.is_empty() || distinct == [0]);
    if broken {
        tracing::debug!(
            scenes = scenes.len(),
            image_count,
            "degenerate scene mapping, assigning round-robin indices"
        );
        return (0..scenes.len()).map(|i| i % image_count).collect();
    }

    scenes
        .iter()
        .enumerate()
        .map(|(i, s)| {
            match s.image_page_index.as_ref().and_then(|v| v.parse()) {
                Some(idx) => idx.clamp(0, image_count as i64 - 1) as usize,
                None => i % image_count,
            }
        })
        .collect()
}

/// Duration for one scene, defaulting when missing or non-positive.
fn scene_duration(desc: &SceneDescriptor, cfg: &PipelineConfig) -> f64 {
    match desc.duration {
        Some(d) if d > 0.0 && d.is_finite() => d,
        _ => cfg.default_scene_secs,
    }
}

/// Derive one [`ResolvedScene`] per descriptor: repaired index, defaulted
/// duration, and planned animation. Output order matches input order.
pub fn resolve_scenes(
    scenes: &[SceneDescriptor],
    images: &[ImageAsset],
    cfg: &PipelineConfig,
) -> Vec<ResolvedScene> {
    let indices = resolve_indices(scenes, images.len());
    scenes
        .iter()
        .zip(indices)
        .enumerate()
        .map(|(scene_index, (desc, image_index))| {
            let img = &images[image_index];
            ResolvedScene {
                scene_index,
                image_index,
                duration_secs: scene_duration(desc, cfg),
                animation: plan_animation(
                    desc.animation_type.as_deref(),
                    img.width,
                    img.height,
                    cfg,
                ),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolve.rs"]
mod tests;
