use std::collections::HashMap;

use crate::backend::BackendError;
use crate::models::Mehfil;

/// Issued for every mehfil fetch; only the newest ticket may replace the
/// working list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MehfilTicket {
    pub seq: u64,
    pub zone_id: i64,
}

#[derive(Debug, PartialEq)]
pub enum MehfilLookup {
    /// No zone selected; the working list was emptied.
    Cleared,
    /// Served from cache; the working list is already updated.
    Cached,
    /// Not cached; the caller must fetch and call `complete`.
    Fetch(MehfilTicket),
}

/// Resolves the mehfils belonging to a zone, caching per zone.
#[derive(Debug, Default)]
pub struct MehfilResolver {
    cache: HashMap<i64, Vec<Mehfil>>,
    working: Vec<Mehfil>,
    latest_seq: u64,
}

impl MehfilResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mehfils for the currently selected zone.
    pub fn working(&self) -> &[Mehfil] {
        &self.working
    }

    pub fn cached(&self, zone_id: i64) -> Option<&[Mehfil]> {
        self.cache.get(&zone_id).map(Vec::as_slice)
    }

    pub fn store(&mut self, zone_id: i64, mehfils: Vec<Mehfil>) {
        self.cache.insert(zone_id, mehfils);
    }

    /// React to a zone selection change. Any fetch still in flight for an
    /// earlier selection becomes stale.
    pub fn select_zone(&mut self, zone_id: Option<i64>) -> MehfilLookup {
        self.latest_seq += 1;
        let Some(zone_id) = zone_id else {
            self.working.clear();
            return MehfilLookup::Cleared;
        };
        match self.cache.get(&zone_id) {
            Some(list) => {
                self.working = list.clone();
                MehfilLookup::Cached
            }
            None => MehfilLookup::Fetch(MehfilTicket { seq: self.latest_seq, zone_id }),
        }
    }

    /// Apply a finished fetch. Successful results are always cached under
    /// their zone; the working list only follows the newest ticket. Errors
    /// leave both untouched. Returns true when the working list changed.
    pub fn complete(&mut self, ticket: MehfilTicket, result: Result<Vec<Mehfil>, BackendError>) -> bool {
        match result {
            Ok(list) => {
                let is_latest = ticket.seq == self.latest_seq;
                if is_latest {
                    self.working = list.clone();
                } else {
                    log::debug!("Discarding stale mehfil list for zone {}", ticket.zone_id);
                }
                self.cache.insert(ticket.zone_id, list);
                is_latest
            }
            Err(e) => {
                log::error!("Failed to fetch mehfils for zone {}: {}", ticket.zone_id, e);
                false
            }
        }
    }
}
