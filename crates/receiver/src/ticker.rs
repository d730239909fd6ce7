use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::error::ReceiverError;

/// A ticker that emits immediately on construction, then on every
/// `interval` tick thereafter (spec.md §4.4 step 1). `tokio::time::interval`
/// already resolves its first `tick()` immediately, which is exactly the
/// self-priming behavior this wraps; the wrapper exists to reject a
/// non-positive interval at construction (fail fast) and to name the
/// contract explicitly.
///
/// `MissedTickBehavior::Delay` ensures a slow `list()` serializes the next
/// tick instead of firing a burst of catch-up ticks (spec.md §4.4 edge
/// case: "ticks are not coalesced into a burst").
pub struct SelfPrimingTicker {
    interval: Interval,
}

impl SelfPrimingTicker {
    pub fn new(period: Duration) -> Result<Self, ReceiverError> {
        if period.is_zero() {
            return Err(ReceiverError::InvalidInterval);
        }
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ok(Self { interval })
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
