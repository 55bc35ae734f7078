use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Failed-login throttle keyed by client IP, sliding window.
#[derive(Clone)]
pub struct LoginLimiter {
    failures: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_failures: usize,
    window: Duration,
}

impl LoginLimiter {
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window,
        }
    }

    fn recent(&self, timestamps: &mut Vec<Instant>, now: Instant) {
        let window = self.window;
        timestamps.retain(|t| now.duration_since(*t) < window);
    }

    /// True once `ip` has used up its failures within the window.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let Some(timestamps) = map.get_mut(&ip) else {
            return false;
        };
        self.recent(timestamps, now);
        if timestamps.is_empty() {
            map.remove(&ip);
            return false;
        }
        timestamps.len() >= self.max_failures
    }

    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let timestamps = map.entry(ip).or_default();
        self.recent(timestamps, now);
        timestamps.push(now);
        if timestamps.len() == self.max_failures {
            log::warn!("Login throttled for {} after {} failures", ip, self.max_failures);
        }
    }

    /// Forget `ip`'s failures after a successful sign-in.
    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}
