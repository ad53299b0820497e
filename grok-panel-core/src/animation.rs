use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

/// A linear opacity ramp sampled against wall-clock time.
///
/// Platforms with a native animation system (AppKit) do not need this; the
/// GTK frontend ticks a timer and samples it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f64,
    to: f64,
    duration: Duration,
    started: Instant,
}

impl Fade {
    pub fn new(from: f64, to: f64, duration: Duration, started: Instant) -> Self {
        Fade {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            duration,
            started,
        }
    }

    /// Fraction of the fade elapsed at `now`, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Opacity at `now`.
    pub fn sample(&self, now: Instant) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// How a show or hide ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The animation ran to the end and its state change was applied.
    Completed,
    /// A newer show / hide started before this one finished, or the platform
    /// dropped the animation. Its state change was not applied.
    Superseded,
    /// Nothing to animate (no panel has been set up).
    Skipped,
}

/// An in-flight show or hide.
///
/// Awaiting it resolves once the platform reports the animation finished.
/// Dropping it does not cancel anything.
#[derive(Debug)]
pub struct Transition {
    rx: Option<oneshot::Receiver<TransitionOutcome>>,
    resolved: Option<TransitionOutcome>,
}

impl Transition {
    pub(crate) fn pending() -> (Self, TransitionSignal) {
        let (tx, rx) = oneshot::channel();
        (
            Transition {
                rx: Some(rx),
                resolved: None,
            },
            TransitionSignal { tx: Some(tx) },
        )
    }

    pub(crate) fn skipped() -> Self {
        Transition {
            rx: None,
            resolved: Some(TransitionOutcome::Skipped),
        }
    }

    /// Non-blocking check. `None` while the animation is still running.
    pub fn try_outcome(&mut self) -> Option<TransitionOutcome> {
        if let Some(outcome) = self.resolved {
            return Some(outcome);
        }
        let rx = self.rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => TransitionOutcome::Superseded,
        };
        self.rx = None;
        self.resolved = Some(outcome);
        Some(outcome)
    }
}

impl Future for Transition {
    type Output = TransitionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.resolved {
            return Poll::Ready(outcome);
        }
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(TransitionOutcome::Skipped);
        };
        let outcome = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result.unwrap_or(TransitionOutcome::Superseded),
        };
        self.rx = None;
        self.resolved = Some(outcome);
        Poll::Ready(outcome)
    }
}

/// Sending half of a [`Transition`], fired from the animation completion.
///
/// Dropping it without calling [`TransitionSignal::finish`] resolves the
/// transition as superseded.
#[derive(Debug)]
pub(crate) struct TransitionSignal {
    tx: Option<oneshot::Sender<TransitionOutcome>>,
}

impl TransitionSignal {
    pub(crate) fn finish(mut self, outcome: TransitionOutcome) {
        if let Some(tx) = self.tx.take() {
            // Receiver gone means nobody is waiting.
            let _ = tx.send(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE_DURATION: Duration = Duration::from_millis(200);

    #[test]
    fn fade_in_reaches_full_opacity_within_duration() {
        let start = Instant::now();
        let fade = Fade::new(0.0, 1.0, FADE_DURATION, start);
        assert_eq!(fade.sample(start), 0.0);
        assert!((fade.sample(start + Duration::from_millis(100)) - 0.5).abs() < 1e-9);
        assert!(!fade.is_finished(start + Duration::from_millis(199)));
        assert_eq!(fade.sample(start + FADE_DURATION), 1.0);
        assert!(fade.is_finished(start + FADE_DURATION));
    }

    #[test]
    fn fade_out_is_monotonic() {
        let start = Instant::now();
        let fade = Fade::new(1.0, 0.0, FADE_DURATION, start);
        let mut last = f64::MAX;
        for ms in (0..=220).step_by(20) {
            let value = fade.sample(start + Duration::from_millis(ms));
            assert!(value <= last);
            last = value;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn zero_duration_fade_jumps_to_target() {
        let start = Instant::now();
        let fade = Fade::new(0.3, 1.0, Duration::ZERO, start);
        assert_eq!(fade.sample(start), 1.0);
        assert!(fade.is_finished(start));
    }

    #[test]
    fn fade_clamps_out_of_range_opacity() {
        let start = Instant::now();
        let fade = Fade::new(-0.5, 2.0, FADE_DURATION, start);
        assert_eq!(fade.sample(start), 0.0);
        assert_eq!(fade.sample(start + FADE_DURATION), 1.0);
    }

    #[test]
    fn sample_before_start_is_initial_value() {
        let start = Instant::now() + Duration::from_secs(1);
        let fade = Fade::new(0.0, 1.0, FADE_DURATION, start);
        assert_eq!(fade.sample(Instant::now()), 0.0);
    }

    #[test]
    fn transition_reports_outcome_once_signalled() {
        let (mut transition, signal) = Transition::pending();
        assert_eq!(transition.try_outcome(), None);
        signal.finish(TransitionOutcome::Completed);
        assert_eq!(transition.try_outcome(), Some(TransitionOutcome::Completed));
        assert_eq!(transition.try_outcome(), Some(TransitionOutcome::Completed));
    }

    #[test]
    fn dropped_signal_counts_as_superseded() {
        let (mut transition, signal) = Transition::pending();
        drop(signal);
        assert_eq!(transition.try_outcome(), Some(TransitionOutcome::Superseded));
    }

    #[tokio::test]
    async fn transition_can_be_awaited() {
        let (transition, signal) = Transition::pending();
        signal.finish(TransitionOutcome::Completed);
        assert_eq!(transition.await, TransitionOutcome::Completed);
        assert_eq!(Transition::skipped().await, TransitionOutcome::Skipped);
    }
}
