use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_MAX_REQUESTS: u32 = 50;
pub const DEFAULT_TIME_WINDOW: Duration = Duration::from_secs(3600);

// Per-user sliding window limiter, at most max_requests per trailing time_window
pub struct RequestThrottle<C = SystemClock> {
    max_requests: u32,
    time_window: Duration,
    requests: DashMap<String, VecDeque<Instant>>, // user -> admitted timestamps
    clock: C,
}

impl RequestThrottle<SystemClock> {
    pub fn new(max_requests: u32, time_window: Duration) -> Self {
        Self::with_clock(max_requests, time_window, SystemClock)
    }
}

impl Default for RequestThrottle<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_TIME_WINDOW)
    }
}

impl<C: Clock> RequestThrottle<C> {
    pub fn with_clock(max_requests: u32, time_window: Duration, clock: C) -> Self {
        Self {
            max_requests,
            time_window,
            requests: DashMap::new(),
            clock,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn time_window(&self) -> Duration {
        self.time_window
    }

    // any string is a valid key, including ""
    pub fn try_admit(&self, user_id: &str) -> bool {
        self.try_admit_with_wait(user_id).is_ok()
    }

    // Same decision as try_admit; a rejection carries the wait until the
    // oldest counted request leaves the window, computed under the same guard
    pub fn try_admit_with_wait(&self, user_id: &str) -> Result<(), Duration> {
        let now = self.clock.now();

        let mut log = self.requests.entry(user_id.to_string()).or_default();
        evict_stale(&mut log, now, self.time_window);

        if log.len() < self.max_requests as usize {
            log.push_back(now);
            return Ok(());
        }

        let wait = match log.front() {
            Some(&oldest) => (oldest + self.time_window).saturating_duration_since(now),
            None => self.time_window, // max_requests == 0
        };
        Err(wait)
    }

    // Evict everywhere and drop users left with nothing in the window
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now();
        let before = self.requests.len();

        self.requests.retain(|_, log| {
            evict_stale(log, now, self.time_window);
            !log.is_empty()
        });

        before.saturating_sub(self.requests.len())
    }

    pub fn tracked_users(&self) -> usize {
        self.requests.len()
    }
}

// Timestamps are appended in clock order, so stale ones sit at the front
fn evict_stale(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = log.front() {
        if now.saturating_duration_since(oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}
