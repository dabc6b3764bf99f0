use std::num::NonZeroU32;
use std::sync::Arc;
use std::thread;
use governor::{Quota, RateLimiter};
use governor::state::{NotKeyed, InMemoryState};
use governor::clock::{Clock, DefaultClock};

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

pub fn per_minute_limiter(requests_per_minute: NonZeroU32) -> Limiter {
    let quota = Quota::per_minute(requests_per_minute);
    Arc::new(RateLimiter::direct(quota))
}

/// Blocks the calling thread until the limiter admits one more request.
pub fn wait(limiter: &Limiter) {
    while let Err(not_until) = limiter.check() {
        thread::sleep(not_until.wait_time_from(limiter.clock().now()));
    }
}
