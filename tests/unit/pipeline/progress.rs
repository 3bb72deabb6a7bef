use super::*;
use std::sync::{Arc, Mutex};

fn recording_reporter() -> (Reporter, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let logs = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();
    let logs_cb = logs.clone();
    let reporter = Reporter::new(
        move |p| seen_cb.lock().unwrap().push(p),
        move |m| logs_cb.lock().unwrap().push(m.to_owned()),
    );
    (reporter, seen, logs)
}

#[test]
fn progress_is_monotonic_even_when_phases_regress() {
    let (reporter, seen, _) = recording_reporter();
    reporter.report(10.0);
    reporter.report(40.0);
    reporter.report(25.0);
    reporter.report(40.0);
    reporter.report(100.0);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![10, 40, 100]);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn report_clamps_out_of_range_values() {
    let (reporter, seen, _) = recording_reporter();
    reporter.report(-5.0);
    reporter.report(250.0);
    assert_eq!(seen.lock().unwrap().clone(), vec![100]);
    assert_eq!(reporter.current(), 100);
}

#[test]
fn phase_tracker_walks_the_configured_weights() {
    let (reporter, seen, _) = recording_reporter();
    let phases = PhaseTracker::new(ProgressWeights::default(), 4);

    phases.engine_loaded(&reporter);
    for done in 1..=4 {
        phases.scenes_done(&reporter, done);
    }
    phases.concat_done(&reporter);
    phases.finished(&reporter);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.first(), Some(&10));
    // 10 + 70 * k/4
    assert!(seen.contains(&28));
    assert!(seen.contains(&45));
    assert!(seen.contains(&63));
    assert!(seen.contains(&80));
    assert!(seen.contains(&95));
    assert_eq!(seen.last(), Some(&100));
}

#[test]
fn final_value_is_exactly_100() {
    let (reporter, _, _) = recording_reporter();
    let phases = PhaseTracker::new(ProgressWeights::default(), 1);
    phases.finished(&reporter);
    assert_eq!(reporter.current(), 100);
}

#[test]
fn logs_are_appended_in_order() {
    let (reporter, _, logs) = recording_reporter();
    reporter.log("starting video generation");
    reporter.log("merging clips");
    assert_eq!(
        logs.lock().unwrap().clone(),
        vec!["starting video generation", "merging clips"]
    );
}

#[test]
fn zero_scene_runs_do_not_divide_by_zero() {
    let (reporter, _, _) = recording_reporter();
    let phases = PhaseTracker::new(ProgressWeights::default(), 0);
    phases.scenes_done(&reporter, 0);
    assert_eq!(reporter.current(), 10);
}
