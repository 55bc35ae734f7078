//! Dashboard aggregation controller.
//!
//! `Dashboard` is the synchronous state machine: filter store, mehfil
//! resolver, stats and totals fetchers. Every fetch is split into a `begin`
//! step that hands out a ticket and a `finish` step that applies the result,
//! so `DashboardHandle` can run backend calls without holding its lock and
//! concurrent requests from one session cannot clobber newer data.

pub mod filters;
pub mod resolver;
pub mod stats;
pub mod totals;
pub mod view;

pub use self::filters::{Capabilities, DashboardFilters, FilterError, FilterStore, InitState};
pub use self::resolver::{MehfilLookup, MehfilResolver, MehfilTicket};
pub use self::stats::{StatsFetcher, StatsOutcome, StatsTicket, merge_stats};
pub use self::totals::{TotalsFetcher, TotalsState};
pub use self::view::{RenderMode, SubmissionTier, ViewBody, format_rate, selected_zone_name};

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{BackendError, PortalBackend};
use crate::models::{DashboardStats, Mehfil, OverallTotals, User, Zone};

/// A requested filter change. `None` leaves a field alone; for zone and
/// mehfil, `Some(None)` clears the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub zone_id: Option<Option<i64>>,
    pub mehfil_id: Option<Option<i64>>,
}

impl FilterUpdate {
    pub fn is_empty(&self) -> bool {
        *self == FilterUpdate::default()
    }
}

/// Fetches to run after a state change.
#[derive(Debug, Default)]
pub struct RefreshPlan {
    pub zones: bool,
    pub totals: bool,
    pub mehfils: Option<MehfilTicket>,
    pub stats: Option<StatsTicket>,
}

/// What came back from one round of backend fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Outcome of the stats request, when one was made.
    pub stats: Option<StatsOutcome>,
    /// The backend rejected the session token on at least one call.
    pub unauthorized: bool,
}

fn rejected<T>(result: &Result<T, BackendError>) -> bool {
    matches!(result, Err(e) if e.is_unauthorized())
}

/// Serializable view of the dashboard for templates and the JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub filters: DashboardFilters,
    pub capabilities: Capabilities,
    pub init_state: InitState,
    pub loading: bool,
    pub loading_totals: bool,
    pub totals_state: TotalsState,
    pub stats: DashboardStats,
    pub totals: Option<OverallTotals>,
    pub mehfils: Vec<Mehfil>,
    pub zone_name: Option<String>,
    pub mode: RenderMode,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct Dashboard {
    user: User,
    filters: FilterStore,
    resolver: MehfilResolver,
    stats: StatsFetcher,
    totals: TotalsFetcher,
    mounted: bool,
}

impl Dashboard {
    pub fn new(user: User, month: u32, year: i32) -> Self {
        Self {
            user,
            filters: FilterStore::new(month, year),
            resolver: MehfilResolver::new(),
            stats: StatsFetcher::new(),
            totals: TotalsFetcher::new(),
            mounted: false,
        }
    }

    /// First load: role defaults, then everything the page needs. Returns
    /// `None` once mounted.
    pub fn mount(&mut self) -> Option<RefreshPlan> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.filters.initialize_defaults(&self.user);

        let zone_id = self.filters.filters().zone_id;
        let mehfils = zone_id.and_then(|_| self.select_zone_mehfils(zone_id));
        Some(RefreshPlan {
            zones: self.filters.capabilities().can_filter_zones,
            totals: self.user.is_super_admin && self.totals.begin(),
            mehfils,
            stats: Some(self.stats.begin(self.filters.filters().to_query())),
        })
    }

    /// Apply a filter change atomically. A zone change drops any mehfil in
    /// the same update, since that mehfil belonged to the previous zone.
    pub fn apply(&mut self, update: FilterUpdate) -> Result<RefreshPlan, FilterError> {
        let mut next = self.filters.clone();
        let current = next.filters();
        let mut changed = false;

        if update.month.is_some() || update.year.is_some() {
            let month = update.month.unwrap_or(current.month);
            let year = update.year.unwrap_or(current.year);
            changed |= next.set_period(month, year)?;
        }

        let mut zone_changed = false;
        if let Some(zone_id) = update.zone_id {
            if zone_id != current.zone_id {
                next.set_zone(zone_id)?;
                zone_changed = true;
                changed = true;
            }
        }

        if !zone_changed {
            if let Some(mehfil_id) = update.mehfil_id {
                if mehfil_id != next.filters().mehfil_id {
                    changed |= next.set_mehfil(mehfil_id)?;
                }
            }
        }

        self.filters = next;
        let mut plan = RefreshPlan::default();
        if zone_changed {
            plan.mehfils = self.select_zone_mehfils(self.filters.filters().zone_id);
        }
        if changed {
            plan.stats = Some(self.stats.begin(self.filters.filters().to_query()));
        }
        Ok(plan)
    }

    fn select_zone_mehfils(&mut self, zone_id: Option<i64>) -> Option<MehfilTicket> {
        match self.resolver.select_zone(zone_id) {
            MehfilLookup::Fetch(ticket) => Some(ticket),
            MehfilLookup::Cached | MehfilLookup::Cleared => {
                self.sync_mehfils();
                None
            }
        }
    }

    fn sync_mehfils(&mut self) {
        self.stats.stats_mut().mehfils = self.resolver.working().to_vec();
    }

    pub fn finish_zones(&mut self, result: Result<Vec<Zone>, BackendError>) {
        match result {
            Ok(zones) if !zones.is_empty() => self.stats.stats_mut().zones = zones,
            Ok(_) => log::debug!("Zone list came back empty, keeping current zones"),
            Err(e) => log::error!("Failed to fetch zones: {}", e),
        }
    }

    pub fn finish_totals(&mut self, result: Result<OverallTotals, BackendError>) {
        self.totals.finish(result);
    }

    pub fn finish_mehfils(&mut self, ticket: MehfilTicket, result: Result<Vec<Mehfil>, BackendError>) {
        if self.resolver.complete(ticket, result) {
            self.sync_mehfils();
        }
    }

    pub fn finish_stats(&mut self, ticket: StatsTicket, result: Result<DashboardStats, BackendError>) -> StatsOutcome {
        self.stats.finish(ticket, result)
    }

    pub fn cached_mehfils(&self, zone_id: i64) -> Option<Vec<Mehfil>> {
        self.resolver.cached(zone_id).map(<[Mehfil]>::to_vec)
    }

    pub fn store_mehfils(&mut self, zone_id: i64, mehfils: Vec<Mehfil>) {
        self.resolver.store(zone_id, mehfils);
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::select(
            &self.user,
            &self.filters.filters(),
            !self.stats.stats().zone_report_stats.is_empty(),
        )
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let filters = self.filters.filters();
        let stats = self.stats.stats().clone();
        let zone_name = filters
            .zone_id
            .map(|id| selected_zone_name(&stats.zones, Some(id), &self.user));
        DashboardSnapshot {
            filters,
            capabilities: self.filters.capabilities(),
            init_state: self.filters.state(),
            loading: self.stats.is_loading(),
            loading_totals: self.totals.is_loading(),
            totals_state: self.totals.state(),
            totals: self.totals.totals().cloned(),
            mehfils: self.resolver.working().to_vec(),
            zone_name,
            mode: self.render_mode(),
            last_error: self.stats.last_error().map(String::from),
            stats,
        }
    }
}

/// Shared, lockable dashboard that runs its own backend fetches.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    inner: Arc<Mutex<Dashboard>>,
}

impl DashboardHandle {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { inner: Arc::new(Mutex::new(dashboard)) }
    }

    pub fn lock(&self) -> MutexGuard<'_, Dashboard> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().snapshot()
    }

    /// Mount on first use; later calls return an empty report at once.
    pub async fn mount(&self, api: &dyn PortalBackend, token: &str) -> FetchReport {
        let plan = self.lock().mount();
        match plan {
            Some(plan) => self.run(api, token, plan).await,
            None => FetchReport::default(),
        }
    }

    pub async fn apply(&self, api: &dyn PortalBackend, token: &str, update: FilterUpdate) -> Result<FetchReport, FilterError> {
        if update.is_empty() {
            return Ok(FetchReport::default());
        }
        let plan = self.lock().apply(update)?;
        Ok(self.run(api, token, plan).await)
    }

    /// Mehfils of any zone, through the resolver cache. Does not touch the
    /// current selection.
    pub async fn mehfils_for_zone(&self, api: &dyn PortalBackend, token: &str, zone_id: i64) -> Result<Vec<Mehfil>, BackendError> {
        let cached = self.lock().cached_mehfils(zone_id);
        if let Some(list) = cached {
            return Ok(list);
        }
        let list = api.list_mehfils(token, zone_id).await?;
        self.lock().store_mehfils(zone_id, list.clone());
        Ok(list)
    }

    async fn run(&self, api: &dyn PortalBackend, token: &str, plan: RefreshPlan) -> FetchReport {
        let RefreshPlan { zones, totals, mehfils, stats } = plan;
        let zones = async move {
            if !zones {
                return false;
            }
            let result = api.list_zones(token).await;
            let denied = rejected(&result);
            self.lock().finish_zones(result);
            denied
        };
        let totals = async move {
            if !totals {
                return false;
            }
            let result = api.overall_totals(token).await;
            let denied = rejected(&result);
            self.lock().finish_totals(result);
            denied
        };
        let mehfils = async move {
            let Some(ticket) = mehfils else {
                return false;
            };
            let result = api.list_mehfils(token, ticket.zone_id).await;
            let denied = rejected(&result);
            self.lock().finish_mehfils(ticket, result);
            denied
        };
        let stats = async move {
            let Some(ticket) = stats else {
                return (None, false);
            };
            let result = api.dashboard_stats(token, &ticket.query).await;
            let denied = rejected(&result);
            let outcome = self.lock().finish_stats(ticket, result);
            (Some(outcome), denied)
        };
        let (zones, totals, mehfils, (stats, stats_denied)) = tokio::join!(zones, totals, mehfils, stats);
        FetchReport {
            stats,
            unauthorized: zones || totals || mehfils || stats_denied,
        }
    }
}
