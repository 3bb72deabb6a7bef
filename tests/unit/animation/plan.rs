use super::*;
use crate::pipeline::config::PipelineConfig;

fn cfg() -> PipelineConfig {
    PipelineConfig::default()
}

#[test]
fn tall_image_pans_down() {
    // Content aspect with the default 1080x1920 canvas and 0.9 fraction is
    // roughly 2.0; a 1000x3000 image (aspect 3.0) is far past the pan factor.
    assert_eq!(classify(1000, 3000, &cfg()), AnimationType::PanDown);
}

#[test]
fn wide_image_zooms() {
    assert_eq!(classify(2000, 800, &cfg()), AnimationType::Zoom);
}

#[test]
fn near_canvas_aspect_is_static() {
    // 1080x1920 matches the canvas itself; inside both thresholds.
    assert_eq!(classify(1080, 1920, &cfg()), AnimationType::Static);
}

#[test]
fn classification_is_total_and_pure() {
    let cfg = cfg();
    for (w, h) in [(1, 1), (10_000, 1), (1, 10_000), (1080, 1920), (640, 480)] {
        let a = classify(w, h, &cfg);
        let b = classify(w, h, &cfg);
        assert_eq!(a, b);
        assert!(matches!(
            a,
            AnimationType::PanDown | AnimationType::Zoom | AnimationType::Static
        ));
    }
}

#[test]
fn thresholds_come_from_config() {
    let mut tight = cfg();
    tight.pan_aspect_factor = 10.0;
    // With an extreme pan factor the tall image no longer pans.
    assert_eq!(classify(1000, 3000, &tight), AnimationType::Static);
}

#[test]
fn recognized_hint_wins_over_geometry() {
    let cfg = cfg();
    assert_eq!(
        plan_animation(Some("static"), 1000, 3000, &cfg),
        AnimationType::Static
    );
    assert_eq!(
        plan_animation(Some("zoom_in"), 1080, 1920, &cfg),
        AnimationType::Zoom
    );
}

#[test]
fn unknown_hint_falls_back_to_geometry() {
    let cfg = cfg();
    assert_eq!(
        plan_animation(Some("wiggle"), 1000, 3000, &cfg),
        AnimationType::PanDown
    );
    assert_eq!(plan_animation(None, 2000, 800, &cfg), AnimationType::Zoom);
}
