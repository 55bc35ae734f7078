use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{Datelike, Local};
use rand::Rng;

use crate::dashboard::{Dashboard, DashboardHandle};
use crate::models::User;

struct Entry {
    handle: DashboardHandle,
    last_seen: Instant,
}

/// Per-session dashboards, keyed by a random key stored in the session cookie.
#[derive(Clone)]
pub struct DashboardRegistry {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    idle_ttl: Duration,
}

impl DashboardRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Random 16-byte hex key for a new session dashboard.
    pub fn new_key() -> String {
        let mut rng = rand::rng();
        let bytes: [u8; 16] = rng.random();
        hex::encode(bytes)
    }

    /// Return the dashboard for `key`, creating one for `user` dated to the
    /// current month if none exists. Idle entries are pruned on the way.
    pub fn get_or_create(&self, key: &str, user: &User) -> DashboardHandle {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let ttl = self.idle_ttl;
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        if map.len() < before {
            log::debug!("Pruned {} idle dashboards", before - map.len());
        }

        let entry = map.entry(key.to_string()).or_insert_with(|| {
            let today = Local::now();
            log::info!("Creating dashboard for user {}", user.id);
            Entry {
                handle: DashboardHandle::new(Dashboard::new(user.clone(), today.month(), today.year())),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        entry.handle.clone()
    }

    pub fn remove(&self, key: &str) {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
