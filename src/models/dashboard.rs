use serde::{Deserialize, Serialize};

use super::{Mehfil, Zone, null_as_empty, string_or_number};

// ---------- Types ----------

/// Aggregate statistics for one `(month, year, zone, mehfil)` filter tuple.
///
/// Every field defaults so a partial response still parses; the stats
/// fetcher decides how a response is merged into what is already shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_karkuns: u64,
    pub ehad_karkuns: u64,
    pub total_new_ehads: u64,
    pub total_tabarukats: u64,
    pub total_mehfils: u64,
    pub mehfils_with_reports: u64,
    pub mehfils_without_reports: u64,
    /// Percentage 0..=100, computed by the backend.
    pub report_submission_rate: f64,
    pub mehfils_with_reports_list: Vec<MehfilReportEntry>,
    pub mehfils_without_reports_list: Vec<MehfilReportEntry>,
    pub zone_report_stats: Vec<ZoneReportStat>,
    pub zones: Vec<Zone>,
    pub mehfils: Vec<Mehfil>,
}

/// Per-zone report rollup, shown as one row of the region table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneReportStat {
    pub zone_id: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub zone_name: String,
    pub total_mehfils: u64,
    pub mehfils_with_reports: u64,
    pub submission_rate: f64,
}

/// A mehfil in the submitted/pending report lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MehfilReportEntry {
    pub id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub mehfil_number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name_en: String,
    pub submitted_at: Option<String>,
}

/// Organization-wide counters, independent of the dashboard filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverallTotals {
    pub total_regions: u64,
    pub total_zones: u64,
    pub total_mehfils: u64,
    pub total_karkuns: u64,
    pub total_ehad_karkuns: u64,
    pub total_tabarukats: u64,
}

// ---------- Validation ----------

fn check_rate(label: &str, rate: f64) -> Result<(), String> {
    if rate.is_finite() && (0.0..=100.0).contains(&rate) {
        Ok(())
    } else {
        Err(format!("{label} out of range: {rate}"))
    }
}

impl DashboardStats {
    /// Reject responses whose percentages cannot be displayed.
    pub fn validate(&self) -> Result<(), String> {
        check_rate("reportSubmissionRate", self.report_submission_rate)?;
        for zone in &self.zone_report_stats {
            check_rate(&format!("submission_rate for zone {}", zone.zone_id), zone.submission_rate)?;
        }
        Ok(())
    }
}
