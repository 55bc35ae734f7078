//! Shared test infrastructure.
//!
//! `FakeBackend` implements `PortalBackend` in memory: canned zones,
//! mehfils, stats and totals, a call log for asserting how often the backend
//! was hit, per-call delays for ordering tests and failure switches.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use karkun_portal::backend::{BackendError, LoginResponse, PortalBackend, StatsQuery};
use karkun_portal::models::{DashboardStats, Mehfil, OverallTotals, User, Zone, ZoneReportStat};

// ============================================================================
// FIXTURES
// ============================================================================

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret123";

pub fn zone(id: i64, title: &str) -> Zone {
    Zone {
        id,
        title_en: title.to_string(),
        city_en: title.to_string(),
        country_en: "Pakistan".to_string(),
    }
}

pub fn mehfil(id: i64) -> Mehfil {
    Mehfil {
        id,
        mehfil_number: id.to_string(),
        name_en: format!("Mehfil {id}"),
        address_en: String::new(),
    }
}

pub fn super_admin() -> User {
    User { id: 1, name: "Super".into(), email: "super@example.org".into(), is_super_admin: true, ..Default::default() }
}

pub fn region_admin() -> User {
    User { id: 2, name: "Region".into(), email: "region@example.org".into(), region_id: Some(1), is_region_admin: true, ..Default::default() }
}

pub fn zone_admin(zone_id: i64) -> User {
    User {
        id: 3,
        name: "Zone".into(),
        email: "zone@example.org".into(),
        zone_id: Some(zone_id),
        is_zone_admin: true,
        zone: Some(zone(zone_id, "Own Zone")),
        ..Default::default()
    }
}

pub fn mehfil_admin(zone_id: i64, mehfil_id: i64) -> User {
    User {
        id: 4,
        name: "Mehfil".into(),
        email: "mehfil@example.org".into(),
        zone_id: Some(zone_id),
        mehfil_directory_id: Some(mehfil_id),
        is_mehfil_admin: true,
        ..Default::default()
    }
}

pub fn multan_region_stats() -> DashboardStats {
    DashboardStats {
        total_karkuns: 300,
        report_submission_rate: 85.0,
        zone_report_stats: vec![ZoneReportStat {
            zone_id: 1,
            zone_name: "Multan".to_string(),
            total_mehfils: 20,
            mehfils_with_reports: 17,
            submission_rate: 85.0,
        }],
        ..Default::default()
    }
}

// ============================================================================
// FAKE BACKEND
// ============================================================================

#[derive(Default)]
pub struct FakeBackend {
    pub zones: Mutex<Vec<Zone>>,
    pub mehfils: Mutex<HashMap<i64, Vec<Mehfil>>>,
    /// Stats keyed by the query's zone; `None` is the all-zones response.
    pub stats: Mutex<HashMap<Option<i64>, DashboardStats>>,
    pub totals: Mutex<OverallTotals>,
    pub users: Mutex<HashMap<String, User>>,
    pub delays_ms: Mutex<HashMap<String, u64>>,
    pub fail_stats: AtomicBool,
    pub fail_mehfils: AtomicBool,
    /// Every authenticated call answers 401, as after token expiry.
    pub token_expired: AtomicBool,
    pub calls: Mutex<Vec<String>>,
    pub stats_queries: Mutex<Vec<StatsQuery>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zones(self, zones: Vec<Zone>) -> Self {
        *self.zones.lock().unwrap() = zones;
        self
    }

    pub fn with_mehfils(self, zone_id: i64, list: Vec<Mehfil>) -> Self {
        self.mehfils.lock().unwrap().insert(zone_id, list);
        self
    }

    pub fn with_stats(self, zone_id: Option<i64>, stats: DashboardStats) -> Self {
        self.stats.lock().unwrap().insert(zone_id, stats);
        self
    }

    pub fn with_totals(self, totals: OverallTotals) -> Self {
        *self.totals.lock().unwrap() = totals;
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().insert(user.email.clone(), user);
        self
    }

    pub fn with_delay(self, call: &str, ms: u64) -> Self {
        self.delays_ms.lock().unwrap().insert(call.to_string(), ms);
        self
    }

    pub fn set_fail_stats(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mehfils(&self, fail: bool) {
        self.fail_mehfils.store(fail, Ordering::SeqCst);
    }

    pub fn set_token_expired(&self, expired: bool) {
        self.token_expired.store(expired, Ordering::SeqCst);
    }

    fn check_token(&self, path: &str) -> Result<(), BackendError> {
        if self.token_expired.load(Ordering::SeqCst) {
            return Err(BackendError::Status { status: 401, path: path.to_string() });
        }
        Ok(())
    }

    /// Number of recorded calls whose key starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn last_stats_query(&self) -> Option<StatsQuery> {
        self.stats_queries.lock().unwrap().last().copied()
    }

    async fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call.clone());
        let delay = self.delays_ms.lock().unwrap().get(&call).copied();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

fn server_error(path: &str) -> BackendError {
    BackendError::Status { status: 500, path: path.to_string() }
}

#[async_trait]
impl PortalBackend for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        self.record("login".to_string()).await;
        let user = self.users.lock().unwrap().get(email).cloned();
        match user {
            Some(user) if password == PASSWORD => Ok(LoginResponse { token: TOKEN.to_string(), user }),
            _ => Err(BackendError::Status { status: 401, path: "/login".to_string() }),
        }
    }

    async fn list_zones(&self, _token: &str) -> Result<Vec<Zone>, BackendError> {
        self.record("zones".to_string()).await;
        self.check_token("/zones")?;
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn list_mehfils(&self, _token: &str, zone_id: i64) -> Result<Vec<Mehfil>, BackendError> {
        self.record(format!("mehfils:{zone_id}")).await;
        self.check_token("/mehfils")?;
        if self.fail_mehfils.load(Ordering::SeqCst) {
            return Err(server_error("/mehfils"));
        }
        Ok(self.mehfils.lock().unwrap().get(&zone_id).cloned().unwrap_or_default())
    }

    async fn dashboard_stats(&self, _token: &str, query: &StatsQuery) -> Result<DashboardStats, BackendError> {
        self.stats_queries.lock().unwrap().push(*query);
        let key = match query.zone_id {
            Some(z) => format!("stats:{z}"),
            None => "stats:all".to_string(),
        };
        self.record(key).await;
        self.check_token("/dashboard/stats")?;
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(server_error("/dashboard/stats"));
        }
        Ok(self.stats.lock().unwrap().get(&query.zone_id).cloned().unwrap_or_default())
    }

    async fn overall_totals(&self, _token: &str) -> Result<OverallTotals, BackendError> {
        self.record("totals".to_string()).await;
        self.check_token("/dashboard/totals")?;
        Ok(self.totals.lock().unwrap().clone())
    }
}
