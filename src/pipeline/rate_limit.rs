// Fixed-window rate limiting, keyed by client network identity.
// An injected instance rather than a process-global map, so each server (and
// each test) scopes its own counters. The check-and-increment runs inside
// one lock scope; two requests at the cap boundary cannot both be admitted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

/// Requests admitted per key within one window.
pub const DEFAULT_CAP: u32 = 10;
/// Window length before a key's counter resets.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

struct WindowRecord {
    count: u32,
    window_start: Instant,
}

pub struct RateLimiter {
    window: Duration,
    cap: u32,
    records: Mutex<HashMap<String, WindowRecord>>,
}

impl RateLimiter {
    pub fn new(window: Duration, cap: u32) -> Self {
        RateLimiter {
            window,
            cap,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request for the given key.
    ///
    /// An expired window resets the key to a count of 1. At the cap the
    /// request is rejected without consuming quota, so a rejected burst does
    /// not extend the caller's penalty.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            // A poisoned map only means a panic elsewhere; fail open.
            Err(poisoned) => poisoned.into_inner(),
        };

        match records.get_mut(key) {
            Some(record) if now < record.window_start + self.window => {
                if record.count >= self.cap {
                    debug!("Rate limit exceeded for {}", key);
                    false
                } else {
                    record.count += 1;
                    true
                }
            }
            _ => {
                records.insert(
                    key.to_string(),
                    WindowRecord {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_CAP)
    }
}
