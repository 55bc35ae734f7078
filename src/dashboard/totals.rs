use serde::Serialize;

use crate::backend::BackendError;
use crate::models::OverallTotals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsState {
    NotStarted,
    InFlight,
    Done,
    Failed,
}

/// Organization-wide totals, fetched at most once per dashboard.
///
/// Has its own `loading_totals` flag so filter-driven refreshes never put
/// the totals cards back into a loading state.
#[derive(Debug)]
pub struct TotalsFetcher {
    totals: Option<OverallTotals>,
    state: TotalsState,
}

impl Default for TotalsFetcher {
    fn default() -> Self {
        Self { totals: None, state: TotalsState::NotStarted }
    }
}

impl TotalsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> Option<&OverallTotals> {
        self.totals.as_ref()
    }

    pub fn state(&self) -> TotalsState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == TotalsState::InFlight
    }

    /// Claim the single fetch. Returns false if it was already claimed.
    pub fn begin(&mut self) -> bool {
        if self.state != TotalsState::NotStarted {
            return false;
        }
        self.state = TotalsState::InFlight;
        true
    }

    pub fn finish(&mut self, result: Result<OverallTotals, BackendError>) {
        match result {
            Ok(totals) => {
                self.totals = Some(totals);
                self.state = TotalsState::Done;
            }
            Err(e) => {
                log::error!("Failed to fetch overall totals: {}", e);
                self.state = TotalsState::Failed;
            }
        }
    }
}
