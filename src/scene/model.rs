use serde::{Deserialize, Serialize};

use crate::animation::plan::AnimationType;

/// One timed unit of the output video as supplied by the upstream
/// collaborator. Accepted as-is and never mutated; the resolver derives a
/// [`ResolvedScene`] from it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Index into the ordered image list. Upstream sometimes sends this as a
    /// string, as a duplicate degenerate value, or not at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_page_index: Option<ImageIndexValue>,
    /// Scene duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Free-text animation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_type: Option<String>,
}

/// Wire representation of a scene's image index: integer or numeric string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageIndexValue {
    /// Plain integer index.
    Int(i64),
    /// String-typed index, hopefully numeric.
    Text(String),
}

impl ImageIndexValue {
    /// Parse to an integer. String values are trimmed and parsed; anything
    /// non-numeric yields `None`.
    pub fn parse(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// A scene after index repair and animation planning. Immutable once created;
/// `image_index` is validated to be in range for the run's image list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedScene {
    /// Position of the scene in the input order.
    pub scene_index: usize,
    /// Validated index into the image list.
    pub image_index: usize,
    /// Scene duration in seconds, always positive.
    pub duration_secs: f64,
    /// Animation selected by the planner.
    pub animation: AnimationType,
}
