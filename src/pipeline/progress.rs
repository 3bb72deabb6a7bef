use std::sync::atomic::{AtomicU8, Ordering};

use crate::pipeline::config::ProgressWeights;

/// Caller-facing progress and log sink for one or more runs.
///
/// Progress is a single 0..=100 scalar, guaranteed monotonically
/// non-decreasing no matter how phases report; regressions are clamped to the
/// highest value already published. Log messages are append-only free-text
/// phase markers and carry no control-flow meaning.
pub struct Reporter {
    on_progress: Box<dyn Fn(u8) + Send + Sync>,
    on_log: Box<dyn Fn(&str) + Send + Sync>,
    last: AtomicU8,
}

impl Reporter {
    /// Create a reporter from progress and log callbacks.
    pub fn new(
        on_progress: impl Fn(u8) + Send + Sync + 'static,
        on_log: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_progress: Box::new(on_progress),
            on_log: Box::new(on_log),
            last: AtomicU8::new(0),
        }
    }

    /// Reporter that discards everything.
    pub fn noop() -> Self {
        Self::new(|_| {}, |_| {})
    }

    /// Append one log line.
    pub fn log(&self, message: &str) {
        tracing::debug!(target: "scenereel::progress", "{message}");
        (self.on_log)(message);
    }

    /// Publish a progress value, clamped into `[0, 100]` and never below a
    /// previously published value.
    pub fn report(&self, percent: f64) {
        let next = percent.clamp(0.0, 100.0).round() as u8;
        let prev = self.last.fetch_max(next, Ordering::Relaxed);
        if next > prev {
            (self.on_progress)(next);
        }
    }

    /// The highest value published so far.
    pub fn current(&self) -> u8 {
        self.last.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("last", &self.current())
            .finish_non_exhaustive()
    }
}

/// Maps phase completion onto the weighted 0..=100 scale for one run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PhaseTracker {
    weights: ProgressWeights,
    scene_count: usize,
}

impl PhaseTracker {
    pub(crate) fn new(weights: ProgressWeights, scene_count: usize) -> Self {
        Self {
            weights,
            scene_count: scene_count.max(1),
        }
    }

    pub(crate) fn engine_loaded(&self, reporter: &Reporter) {
        reporter.report(self.weights.engine_load);
    }

    pub(crate) fn scenes_done(&self, reporter: &Reporter, done: usize) {
        let frac = done.min(self.scene_count) as f64 / self.scene_count as f64;
        reporter.report(self.weights.engine_load + self.weights.scenes * frac);
    }

    pub(crate) fn concat_done(&self, reporter: &Reporter) {
        reporter.report(self.weights.engine_load + self.weights.scenes + self.weights.concat);
    }

    pub(crate) fn finished(&self, reporter: &Reporter) {
        reporter.report(100.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/progress.rs"]
mod tests;
