use super::*;
use crate::animation::plan::AnimationType;
use crate::foundation::core::Canvas;
use bytes::Bytes;

fn cfg() -> PipelineConfig {
    PipelineConfig::default()
}

fn asset(index: usize, w: u32, h: u32) -> ImageAsset {
    ImageAsset {
        index,
        bytes: Bytes::new(),
        width: w,
        height: h,
        rgba8: vec![0; (w * h * 4) as usize],
    }
}

fn resolved(scene_index: usize, image_index: usize, animation: AnimationType) -> ResolvedScene {
    ResolvedScene {
        scene_index,
        image_index,
        duration_secs: 3.0,
        animation,
    }
}

#[test]
fn plan_has_one_entry_per_scene_in_order() {
    let cfg = cfg();
    let images = vec![asset(0, 1000, 3000), asset(1, 2000, 800)];
    let scenes: Vec<ResolvedScene> = (0..5)
        .map(|i| resolved(i, i % 2, AnimationType::Static))
        .collect();

    let plan = compile_plan(&scenes, &images, &cfg);
    assert_eq!(plan.scenes.len(), 5);
    for (i, s) in plan.scenes.iter().enumerate() {
        assert_eq!(s.resolved.scene_index, i);
    }
}

#[test]
fn pan_geometry_scales_to_content_width_and_travels() {
    let cfg = cfg();
    let images = vec![asset(0, 1000, 3000)];
    let plan = compile_plan(&[resolved(0, 0, AnimationType::PanDown)], &images, &cfg);
    let f = plan.scenes[0].filter;

    assert_eq!(f.scaled_width, cfg.content_width_px());
    // 3000 * (972/1000) = 2916, far taller than the 1920 canvas.
    assert_eq!(f.scaled_height, 2916);
    assert_eq!(f.pan_travel_px, 2916 - 1920);
    assert_eq!(f.offset_x, (1080 - 972) / 2);
    assert_eq!(f.offset_y, 0);

    assert_eq!(f.pan_offset_at(0.0), 0.0);
    assert_eq!(f.pan_offset_at(1.0), f64::from(f.pan_travel_px));
    assert!(f.pan_offset_at(0.5) < f64::from(f.pan_travel_px));
}

#[test]
fn short_pan_image_has_zero_travel_and_centers_vertically() {
    let cfg = cfg();
    // Taller than wide but scaled height still under the canvas height.
    let images = vec![asset(0, 1000, 1500)];
    let plan = compile_plan(&[resolved(0, 0, AnimationType::PanDown)], &images, &cfg);
    let f = plan.scenes[0].filter;

    assert!(f.scaled_height < cfg.canvas.height);
    assert_eq!(f.pan_travel_px, 0);
    assert_eq!(f.pan_offset_at(1.0), 0.0);
    assert_eq!(f.offset_y, (cfg.canvas.height - f.scaled_height) / 2);
}

#[test]
fn zoom_geometry_covers_the_canvas() {
    let cfg = cfg();
    let images = vec![asset(0, 2000, 800)];
    let plan = compile_plan(&[resolved(0, 0, AnimationType::Zoom)], &images, &cfg);
    let f = plan.scenes[0].filter;

    assert!(f.scaled_width >= cfg.canvas.width);
    assert!(f.scaled_height >= cfg.canvas.height);
    assert_eq!(f.scaled_width % 2, 0);
    assert_eq!(f.scaled_height % 2, 0);
    assert!((f.zoom_at(0.0) - 1.0).abs() < 1e-9);
    assert!((f.zoom_at(1.0) - cfg.zoom_max).abs() < 1e-9);
}

#[test]
fn static_uses_the_subtle_zoom_bound() {
    let cfg = cfg();
    let images = vec![asset(0, 1080, 1920)];
    let plan = compile_plan(&[resolved(0, 0, AnimationType::Static)], &images, &cfg);
    let f = plan.scenes[0].filter;
    assert!((f.zoom_at(1.0) - cfg.static_zoom_max).abs() < 1e-9);
}

#[test]
fn total_duration_follows_frame_counts() {
    let cfg = cfg();
    let images = vec![asset(0, 1080, 1920)];
    let scenes = vec![
        ResolvedScene {
            scene_index: 0,
            image_index: 0,
            duration_secs: 2.5,
            animation: AnimationType::Static,
        },
        ResolvedScene {
            scene_index: 1,
            image_index: 0,
            duration_secs: 3.0,
            animation: AnimationType::Static,
        },
    ];
    let plan = compile_plan(&scenes, &images, &cfg);
    assert_eq!(plan.total_frames(), 75 + 90);
    assert!((plan.total_duration_secs(&cfg) - 5.5).abs() < 1e-9);
}

#[test]
fn time_fraction_hits_both_endpoints() {
    let f = SceneFilter {
        animation: AnimationType::PanDown,
        scaled_width: 972,
        scaled_height: 2916,
        offset_x: 54,
        offset_y: 0,
        zoom_start: 1.0,
        zoom_end: 1.0,
        pan_travel_px: 996,
        frames: 90,
    };
    assert_eq!(f.time_fraction(0), 0.0);
    assert_eq!(f.time_fraction(89), 1.0);
    assert!(f.time_fraction(45) > 0.0 && f.time_fraction(45) < 1.0);

    let single = SceneFilter { frames: 1, ..f };
    assert_eq!(single.time_fraction(0), 0.0);
}

#[test]
fn small_canvas_geometry_stays_even() {
    let mut cfg = cfg();
    cfg.canvas = Canvas {
        width: 64,
        height: 96,
    };
    let images = vec![asset(0, 33, 47)];
    for animation in [AnimationType::PanDown, AnimationType::Zoom, AnimationType::Static] {
        let plan = compile_plan(&[resolved(0, 0, animation)], &images, &cfg);
        let f = plan.scenes[0].filter;
        assert_eq!(f.scaled_width % 2, 0, "{animation:?}");
        assert_eq!(f.scaled_height % 2, 0, "{animation:?}");
    }
}
