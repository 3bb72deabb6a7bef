use super::*;
use crate::scene::model::ImageIndexValue;
use bytes::Bytes;

fn scene(idx: Option<ImageIndexValue>) -> SceneDescriptor {
    SceneDescriptor {
        image_page_index: idx,
        duration: None,
        animation_type: None,
    }
}

fn int(v: i64) -> Option<ImageIndexValue> {
    Some(ImageIndexValue::Int(v))
}

fn text(v: &str) -> Option<ImageIndexValue> {
    Some(ImageIndexValue::Text(v.to_owned()))
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

#[test]
fn all_zero_indices_are_round_robined() {
    let scenes = vec![scene(int(0)), scene(int(0)), scene(int(0))];
    assert_eq!(resolve_indices(&scenes, 3), vec![0, 1, 2]);
}

#[test]
fn all_missing_indices_are_round_robined() {
    let scenes = vec![scene(None); 5];
    assert_eq!(resolve_indices(&scenes, 3), vec![0, 1, 2, 0, 1]);
}

#[test]
fn round_robin_uses_every_image_when_scenes_suffice() {
    let scenes = vec![scene(int(0)); 7];
    let indices = resolve_indices(&scenes, 4);
    for img in 0..4 {
        assert!(indices.contains(&img));
    }
}

#[test]
fn healthy_mappings_pass_through() {
    let scenes = vec![scene(int(2)), scene(int(0)), scene(int(1))];
    assert_eq!(resolve_indices(&scenes, 3), vec![2, 0, 1]);
}

#[test]
fn numeric_strings_parse_like_integers() {
    let as_strings = vec![scene(text("0")), scene(text("2")), scene(text(" 1 "))];
    let as_ints = vec![scene(int(0)), scene(int(2)), scene(int(1))];
    assert_eq!(
        resolve_indices(&as_strings, 3),
        resolve_indices(&as_ints, 3)
    );
}

#[test]
fn unparseable_index_falls_back_for_that_scene_only() {
    let scenes = vec![scene(int(2)), scene(text("page-two")), scene(int(1))];
    assert_eq!(resolve_indices(&scenes, 3), vec![2, 1, 1]);
}

#[test]
fn out_of_range_indices_clamp_into_bounds() {
    let scenes = vec![scene(int(99)), scene(int(-4)), scene(int(1))];
    assert_eq!(resolve_indices(&scenes, 3), vec![2, 0, 1]);
}

#[test]
fn single_image_maps_everything_to_it() {
    let scenes = vec![scene(None), scene(int(7)), scene(text("x"))];
    assert_eq!(resolve_indices(&scenes, 1), vec![0, 0, 0]);
}

#[test]
fn repeated_nonzero_index_is_not_considered_broken() {
    // A deliberate mapping onto one specific (non-default) page stays as-is.
    let scenes = vec![scene(int(2)), scene(int(2)), scene(int(2))];
    assert_eq!(resolve_indices(&scenes, 3), vec![2, 2, 2]);
}

#[test]
fn resolution_is_deterministic() {
    let scenes = vec![scene(int(0)), scene(None), scene(text("9"))];
    assert_eq!(resolve_indices(&scenes, 4), resolve_indices(&scenes, 4));
}

#[test]
fn resolve_scenes_defaults_and_plans_every_scene() {
    let cfg = crate::pipeline::config::PipelineConfig::default();
    let images = vec![asset(0, 1000, 3000), asset(1, 2000, 800)];
    let scenes = vec![
        SceneDescriptor {
            image_page_index: int(0),
            duration: Some(4.5),
            animation_type: None,
        },
        SceneDescriptor {
            image_page_index: int(1),
            duration: Some(-2.0),
            animation_type: None,
        },
    ];

    let resolved = resolve_scenes(&scenes, &images, &cfg);
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].scene_index, 0);
    assert_eq!(resolved[0].image_index, 0);
    assert!((resolved[0].duration_secs - 4.5).abs() < 1e-9);
    assert_eq!(resolved[0].animation, crate::animation::plan::AnimationType::PanDown);

    // Non-positive duration defaults rather than producing a zero-length clip.
    assert!((resolved[1].duration_secs - cfg.default_scene_secs).abs() < 1e-9);
    assert_eq!(resolved[1].animation, crate::animation::plan::AnimationType::Zoom);
}
