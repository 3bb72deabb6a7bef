use crate::pipeline::config::PipelineConfig;

/// Animation applied to one scene's source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    /// Vertical scroll from the top of the image to its bottom over the scene
    /// duration. Chosen for images proportionally much taller than the frame.
    PanDown,
    /// Slow bounded zoom-in, centered. Chosen for images proportionally much
    /// shorter/wider than the frame.
    Zoom,
    /// Near-imperceptible continuous scale drift, so the frame is never dead.
    Static,
}

impl AnimationType {
    /// Stable lower-case name used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::PanDown => "pan_down",
            Self::Zoom => "zoom",
            Self::Static => "static",
        }
    }

    /// Parse an upstream animation hint. Unknown hints return `None` and fall
    /// back to geometry classification.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "pan_down" => Some(Self::PanDown),
            "zoom" | "zoom_in" => Some(Self::Zoom),
            "static" => Some(Self::Static),
            _ => None,
        }
    }
}

/// Classify a source image against the canvas content area.
///
/// Pure in `(image aspect, content aspect)`: the same dimensions always yield
/// the same animation. Thresholds come from the configuration.
pub fn classify(image_width: u32, image_height: u32, cfg: &PipelineConfig) -> AnimationType {
    debug_assert!(image_width > 0 && image_height > 0);
    let image_aspect = f64::from(image_height) / f64::from(image_width.max(1));
    let content_aspect = cfg.content_aspect();

    if image_aspect > content_aspect * cfg.pan_aspect_factor {
        AnimationType::PanDown
    } else if image_aspect < content_aspect * cfg.zoom_aspect_factor {
        AnimationType::Zoom
    } else {
        AnimationType::Static
    }
}

/// Pick the animation for a scene: a recognized explicit hint wins, anything
/// else is classified from the source geometry.
pub fn plan_animation(
    hint: Option<&str>,
    image_width: u32,
    image_height: u32,
    cfg: &PipelineConfig,
) -> AnimationType {
    hint.and_then(AnimationType::from_hint)
        .unwrap_or_else(|| classify(image_width, image_height, cfg))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/plan.rs"]
mod tests;
