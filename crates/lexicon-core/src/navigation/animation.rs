//! Time-bounded eased interpolation, driven by `tokio::time`.

use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};

/// Cubic ease-out: fast start, gentle landing. `t` is clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// An eased move from `from` to `to` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    /// Value after `elapsed`; exactly `to` once `elapsed >= duration`.
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if self.is_done(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * ease_out_cubic(t)
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Runs `tween`, calling `apply` once per frame and finally with `tween.to`.
///
/// Resolves exactly once, after the final value has been applied. A zero
/// duration applies the final value and returns without waiting.
pub async fn run_tween<F>(tween: Tween, frame: Duration, mut apply: F)
where
    F: FnMut(f64),
{
    if tween.duration.is_zero() {
        apply(tween.to);
        return;
    }

    let start = Instant::now();
    let mut ticker = interval(frame.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let elapsed = start.elapsed();
        apply(tween.value_at(elapsed));
        if tween.is_done(elapsed) {
            break;
        }
    }
}
