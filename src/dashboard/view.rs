use serde::Serialize;

use super::filters::DashboardFilters;
use crate::models::{User, Zone};

pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Color tier for a report submission rate. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionTier {
    Green,
    Yellow,
    Red,
}

impl SubmissionTier {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            SubmissionTier::Green
        } else if rate >= 50.0 {
            SubmissionTier::Yellow
        } else {
            SubmissionTier::Red
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            SubmissionTier::Green => "bg-green-100 text-green-800",
            SubmissionTier::Yellow => "bg-yellow-100 text-yellow-800",
            SubmissionTier::Red => "bg-red-100 text-red-800",
        }
    }
}

/// `85` -> `"85.0%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

/// The main body of the dashboard. Overall totals are decided separately
/// because they are shown alongside any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewBody {
    AllZones,
    RegionTable,
    ZoneCards,
    MehfilDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderMode {
    pub show_overall_totals: bool,
    pub body: ViewBody,
}

impl RenderMode {
    pub fn select(user: &User, filters: &DashboardFilters, has_zone_report_stats: bool) -> Self {
        let body = if (user.is_super_admin || user.is_region_admin)
            && filters.zone_id.is_none()
            && has_zone_report_stats
        {
            ViewBody::RegionTable
        } else {
            match (filters.zone_id, filters.mehfil_id) {
                (Some(_), None) => ViewBody::ZoneCards,
                (Some(_), Some(_)) => ViewBody::MehfilDetail,
                (None, _) => ViewBody::AllZones,
            }
        };
        Self { show_overall_totals: user.is_super_admin, body }
    }
}

/// Name of the selected zone: the loaded zone list first, then the user's own
/// zone, then a placeholder while zone data is still arriving.
pub fn selected_zone_name(zones: &[Zone], zone_id: Option<i64>, user: &User) -> String {
    if let Some(id) = zone_id {
        if let Some(zone) = zones.iter().find(|z| z.id == id) {
            return zone.title_en.clone();
        }
    }
    match &user.zone {
        Some(zone) if !zone.title_en.is_empty() => zone.title_en.clone(),
        _ => LOADING_PLACEHOLDER.to_string(),
    }
}
