use serde::Serialize;
use std::fmt;

use crate::backend::StatsQuery;
use crate::models::User;

/// The currently selected filter tuple.
///
/// `mehfil_id` is only ever set while `zone_id` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardFilters {
    pub month: u32,
    pub year: i32,
    pub zone_id: Option<i64>,
    pub mehfil_id: Option<i64>,
}

impl DashboardFilters {
    pub fn to_query(&self) -> StatsQuery {
        StatsQuery {
            month: self.month,
            year: self.year,
            zone_id: self.zone_id,
            mehfil_id: self.mehfil_id,
        }
    }
}

/// What the signed-in user may change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_filter_zones: bool,
    pub can_filter_mehfils: bool,
}

impl Capabilities {
    pub fn for_user(user: &User) -> Self {
        let can_filter_zones = user.is_all_region_admin || user.is_region_admin;
        Self {
            can_filter_zones,
            can_filter_mehfils: can_filter_zones || user.is_zone_admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitState {
    Uninitialized,
    Initialized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    ZoneLocked,
    MehfilLocked,
    MehfilWithoutZone,
    InvalidMonth(u32),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::ZoneLocked => write!(f, "Zone filter is not available for this account"),
            FilterError::MehfilLocked => write!(f, "Mehfil filter is not available for this account"),
            FilterError::MehfilWithoutZone => write!(f, "Select a zone before selecting a mehfil"),
            FilterError::InvalidMonth(m) => write!(f, "Invalid month: {m}"),
        }
    }
}

impl std::error::Error for FilterError {}

/// Holds the filter selection and the capabilities derived from the user.
#[derive(Debug, Clone)]
pub struct FilterStore {
    filters: DashboardFilters,
    caps: Capabilities,
    state: InitState,
}

impl FilterStore {
    /// A store for the given reporting period, nothing selected and no
    /// capabilities until a user is applied.
    pub fn new(month: u32, year: i32) -> Self {
        Self {
            filters: DashboardFilters { month, year, zone_id: None, mehfil_id: None },
            caps: Capabilities::default(),
            state: InitState::Uninitialized,
        }
    }

    pub fn filters(&self) -> DashboardFilters {
        self.filters
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Apply role defaults exactly once. Returns false when already initialized.
    pub fn initialize_defaults(&mut self, user: &User) -> bool {
        if self.state == InitState::Initialized {
            return false;
        }
        self.caps = Capabilities::for_user(user);
        if user.is_zone_admin || user.is_mehfil_admin {
            self.filters.zone_id = user.zone_id;
        }
        if user.is_mehfil_admin && self.filters.zone_id.is_some() {
            self.filters.mehfil_id = user.mehfil_directory_id;
        }
        self.state = InitState::Initialized;
        true
    }

    /// Select a zone (or "all zones"). The mehfil selection is always cleared.
    /// Returns whether the filter tuple changed.
    pub fn set_zone(&mut self, zone_id: Option<i64>) -> Result<bool, FilterError> {
        if !self.caps.can_filter_zones {
            return Err(FilterError::ZoneLocked);
        }
        let before = self.filters;
        self.filters.zone_id = zone_id;
        self.filters.mehfil_id = None;
        Ok(before != self.filters)
    }

    pub fn set_mehfil(&mut self, mehfil_id: Option<i64>) -> Result<bool, FilterError> {
        if !self.caps.can_filter_mehfils {
            return Err(FilterError::MehfilLocked);
        }
        if mehfil_id.is_some() && self.filters.zone_id.is_none() {
            return Err(FilterError::MehfilWithoutZone);
        }
        let changed = self.filters.mehfil_id != mehfil_id;
        self.filters.mehfil_id = mehfil_id;
        Ok(changed)
    }

    pub fn set_period(&mut self, month: u32, year: i32) -> Result<bool, FilterError> {
        if !(1..=12).contains(&month) {
            return Err(FilterError::InvalidMonth(month));
        }
        let changed = self.filters.month != month || self.filters.year != year;
        self.filters.month = month;
        self.filters.year = year;
        Ok(changed)
    }
}
