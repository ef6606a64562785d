//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified events per second
pub fn create_limiter(per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Max dropped-message warnings logged per second
pub const DROPPED_MESSAGE_LOG_LIMIT: u32 = 5;

/// Throttles repetitive warnings so a misbehaving authority cannot flood
/// the log. Suppressed warnings are still counted by the caller.
#[derive(Clone)]
pub struct LogThrottle {
    limiter: Arc<Limiter>,
}

impl LogThrottle {
    pub fn new(per_second: u32) -> Self {
        Self {
            limiter: create_limiter(per_second),
        }
    }

    /// Returns true if the next warning may be emitted
    pub fn allow(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(DROPPED_MESSAGE_LOG_LIMIT)
    }
}
