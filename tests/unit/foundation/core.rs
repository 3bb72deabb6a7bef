use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(30, 1).is_ok());
}

#[test]
fn fps_round_trips_frames_and_seconds() {
    let fps = Fps { num: 30, den: 1 };
    assert_eq!(fps.secs_to_frames(3.0), 90);
    assert!((fps.frames_to_secs(90) - 3.0).abs() < 1e-9);
}

#[test]
fn positive_durations_never_collapse_to_zero_frames() {
    let fps = Fps { num: 30, den: 1 };
    assert_eq!(fps.secs_to_frames(0.001), 1);
    assert_eq!(fps.secs_to_frames(0.0), 0);
}

#[test]
fn rational_fps_frame_duration() {
    // 30000/1001 ~ 29.97
    let fps = Fps {
        num: 30_000,
        den: 1001,
    };
    assert!((fps.frame_duration_secs() - 1001.0 / 30_000.0).abs() < 1e-12);
}

#[test]
fn canvas_requires_even_nonzero_dimensions() {
    assert!(
        Canvas {
            width: 1080,
            height: 1920
        }
        .validate()
        .is_ok()
    );
    assert!(
        Canvas {
            width: 1081,
            height: 1920
        }
        .validate()
        .is_err()
    );
    assert!(Canvas { width: 0, height: 2 }.validate().is_err());
}
