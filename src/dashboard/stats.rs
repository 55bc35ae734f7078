use crate::backend::{BackendError, StatsQuery};
use crate::models::DashboardStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsTicket {
    pub seq: u64,
    pub query: StatsQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsOutcome {
    Applied,
    Stale,
    Failed,
}

/// Merge a fresh stats response into what is currently shown.
///
/// Zones survive a transient empty list. Mehfils belong to the resolver, so
/// a non-empty previous list wins over whatever the stats endpoint sent.
pub fn merge_stats(prev: &DashboardStats, next: DashboardStats) -> DashboardStats {
    let mut merged = next;
    if merged.zones.is_empty() && !prev.zones.is_empty() {
        merged.zones = prev.zones.clone();
    }
    if !prev.mehfils.is_empty() {
        merged.mehfils = prev.mehfils.clone();
    }
    merged
}

/// Stats for the current filter tuple plus the `loading` flag.
#[derive(Debug, Default)]
pub struct StatsFetcher {
    stats: DashboardStats,
    loading: bool,
    latest_seq: u64,
    last_error: Option<String>,
}

impl StatsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut DashboardStats {
        &mut self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a request for `query`; supersedes any request in flight.
    pub fn begin(&mut self, query: StatsQuery) -> StatsTicket {
        self.latest_seq += 1;
        self.loading = true;
        StatsTicket { seq: self.latest_seq, query }
    }

    /// Apply the result of `ticket`. Responses for superseded tickets are
    /// dropped and leave `loading` to the newer request.
    pub fn finish(&mut self, ticket: StatsTicket, result: Result<DashboardStats, BackendError>) -> StatsOutcome {
        if ticket.seq != self.latest_seq {
            log::debug!("Discarding stale stats response #{} (latest #{})", ticket.seq, self.latest_seq);
            return StatsOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(next) => {
                self.stats = merge_stats(&self.stats, next);
                self.last_error = None;
                StatsOutcome::Applied
            }
            Err(e) => {
                log::error!("Failed to fetch dashboard stats for {:?}: {}", ticket.query, e);
                self.last_error = Some(e.to_string());
                StatsOutcome::Failed
            }
        }
    }
}
