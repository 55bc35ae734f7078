use askama::Template;

use super::PageContext;
use crate::dashboard::{DashboardSnapshot, SubmissionTier, ViewBody, format_rate};
use crate::models::MehfilReportEntry;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Years offered in the period dropdown, counted back from the selected one.
const YEAR_SPAN: i32 = 5;

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

pub struct RegionRow {
    pub zone_id: i64,
    pub zone_name: String,
    pub total_mehfils: u64,
    pub mehfils_with_reports: u64,
    pub rate_label: String,
    pub rate_class: &'static str,
}

pub struct ReportRow {
    pub mehfil_number: String,
    pub name: String,
    pub submitted_at: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub period_label: String,
    pub loading: bool,
    pub loading_totals: bool,
    pub last_error: Option<String>,
    pub can_filter_zones: bool,
    pub can_filter_mehfils: bool,
    pub month_options: Vec<SelectOption>,
    pub year_options: Vec<SelectOption>,
    pub zone_options: Vec<SelectOption>,
    pub mehfil_options: Vec<SelectOption>,
    /// Hidden inputs keep locked filters in the form submission.
    pub locked_zone_id: Option<i64>,
    pub zone_name: String,
    pub show_totals: bool,
    pub totals_cards: Vec<StatCard>,
    pub view: &'static str,
    pub region_rows: Vec<RegionRow>,
    pub zone_cards: Vec<StatCard>,
    pub rate_label: String,
    pub rate_class: &'static str,
    pub submitted: Vec<ReportRow>,
    pub pending: Vec<ReportRow>,
}

fn report_rows(entries: &[MehfilReportEntry]) -> Vec<ReportRow> {
    entries
        .iter()
        .map(|e| ReportRow {
            mehfil_number: e.mehfil_number.clone(),
            name: e.name_en.clone(),
            submitted_at: e.submitted_at.clone().unwrap_or_default(),
        })
        .collect()
}

impl DashboardTemplate {
    pub fn build(ctx: PageContext, greeting: String, snap: DashboardSnapshot) -> Self {
        let f = snap.filters;
        let stats = &snap.stats;

        let month_options = MONTH_NAMES
            .iter()
            .zip(1u32..)
            .map(|(name, m)| SelectOption { value: m.to_string(), label: name.to_string(), selected: m == f.month })
            .collect();
        let year_options = (0..YEAR_SPAN)
            .map(|back| f.year - back)
            .map(|y| SelectOption { value: y.to_string(), label: y.to_string(), selected: y == f.year })
            .collect();
        let mut zone_options: Vec<SelectOption> = stats
            .zones
            .iter()
            .map(|z| SelectOption { value: z.id.to_string(), label: z.label(), selected: Some(z.id) == f.zone_id })
            .collect();
        let locked_zone_id = if snap.capabilities.can_filter_zones { None } else { f.zone_id };
        // Locked accounts never load the zone list; show their own zone.
        if let Some(id) = locked_zone_id {
            if !zone_options.iter().any(|o| o.selected) {
                zone_options.push(SelectOption {
                    value: id.to_string(),
                    label: snap.zone_name.clone().unwrap_or_default(),
                    selected: true,
                });
            }
        }
        let mehfil_options = snap
            .mehfils
            .iter()
            .map(|m| SelectOption { value: m.id.to_string(), label: m.label(), selected: Some(m.id) == f.mehfil_id })
            .collect();

        let totals_cards = snap
            .totals
            .as_ref()
            .map(|t| {
                vec![
                    StatCard { label: "Regions", value: t.total_regions.to_string() },
                    StatCard { label: "Zones", value: t.total_zones.to_string() },
                    StatCard { label: "Mehfils", value: t.total_mehfils.to_string() },
                    StatCard { label: "Karkuns", value: t.total_karkuns.to_string() },
                    StatCard { label: "Ehad Karkuns", value: t.total_ehad_karkuns.to_string() },
                    StatCard { label: "Tabarukat", value: t.total_tabarukats.to_string() },
                ]
            })
            .unwrap_or_default();

        let region_rows = stats
            .zone_report_stats
            .iter()
            .map(|z| RegionRow {
                zone_id: z.zone_id,
                zone_name: z.zone_name.clone(),
                total_mehfils: z.total_mehfils,
                mehfils_with_reports: z.mehfils_with_reports,
                rate_label: format_rate(z.submission_rate),
                rate_class: SubmissionTier::for_rate(z.submission_rate).css_class(),
            })
            .collect();

        let zone_cards = vec![
            StatCard { label: "Total Karkuns", value: stats.total_karkuns.to_string() },
            StatCard { label: "Ehad Karkuns", value: stats.ehad_karkuns.to_string() },
            StatCard { label: "New Ehads", value: stats.total_new_ehads.to_string() },
            StatCard { label: "Tabarukat", value: stats.total_tabarukats.to_string() },
            StatCard { label: "Mehfils", value: stats.total_mehfils.to_string() },
            StatCard { label: "Reports Submitted", value: stats.mehfils_with_reports.to_string() },
            StatCard { label: "Reports Pending", value: stats.mehfils_without_reports.to_string() },
        ];

        let view = match snap.mode.body {
            ViewBody::AllZones => "all_zones",
            ViewBody::RegionTable => "region_table",
            ViewBody::ZoneCards => "zone_cards",
            ViewBody::MehfilDetail => "mehfil_detail",
        };

        let month_name = (f.month as usize)
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i))
            .copied()
            .unwrap_or("");

        Self {
            ctx,
            greeting,
            period_label: format!("{} {}", month_name, f.year),
            loading: snap.loading,
            loading_totals: snap.loading_totals,
            last_error: snap.last_error.clone(),
            can_filter_zones: snap.capabilities.can_filter_zones,
            can_filter_mehfils: snap.capabilities.can_filter_mehfils,
            month_options,
            year_options,
            zone_options,
            mehfil_options,
            locked_zone_id,
            zone_name: snap.zone_name.clone().unwrap_or_default(),
            show_totals: snap.mode.show_overall_totals,
            totals_cards,
            view,
            region_rows,
            zone_cards,
            rate_label: format_rate(stats.report_submission_rate),
            rate_class: SubmissionTier::for_rate(stats.report_submission_rate).css_class(),
            submitted: report_rows(&stats.mehfils_with_reports_list),
            pending: report_rows(&stats.mehfils_without_reports_list),
        }
    }
}
