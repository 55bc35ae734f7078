//! Dashboard controller tests: filter cascade, role defaults, mehfil cache,
//! stats merging, one-shot totals and last-request-wins ordering.
//!
//! Every test drives a `DashboardHandle` against the in-memory `FakeBackend`
//! and asserts both the resulting snapshot and how the backend was called.

mod common;

use karkun_portal::backend::PortalBackend;
use karkun_portal::dashboard::{
    Dashboard, DashboardHandle, FetchReport, FilterError, StatsOutcome, FilterUpdate, InitState, SubmissionTier, TotalsState, ViewBody,
};
use karkun_portal::models::{DashboardStats, OverallTotals, User};
use common::*;

fn handle_for(user: User) -> DashboardHandle {
    DashboardHandle::new(Dashboard::new(user, 6, 2025))
}

fn zone_update(zone_id: Option<i64>) -> FilterUpdate {
    FilterUpdate { zone_id: Some(zone_id), ..Default::default() }
}

// ---------------------------------------------------------------------------
// Role defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mehfil_admin_defaults_without_interaction() {
    let backend = FakeBackend::new().with_mehfils(3, vec![mehfil(7), mehfil(8)]);
    let handle = handle_for(mehfil_admin(3, 7));

    handle.mount(&backend, TOKEN).await;
    let snap = handle.snapshot();

    assert_eq!(snap.init_state, InitState::Initialized);
    assert_eq!(snap.filters.zone_id, Some(3));
    assert_eq!(snap.filters.mehfil_id, Some(7));
    assert!(!snap.capabilities.can_filter_zones);
    assert!(!snap.capabilities.can_filter_mehfils);
    assert_eq!(snap.mode.body, ViewBody::MehfilDetail);

    // Zone list is only fetched for users who can pick a zone.
    assert_eq!(backend.count("zones"), 0);
    assert_eq!(backend.count("totals"), 0);
    assert_eq!(backend.count("mehfils:3"), 1);
    let q = backend.last_stats_query().expect("stats fetched on mount");
    assert_eq!((q.month, q.year, q.zone_id, q.mehfil_id), (6, 2025, Some(3), Some(7)));
}

#[tokio::test]
async fn test_mehfil_admin_with_other_ids() {
    let backend = FakeBackend::new();
    let handle = handle_for(mehfil_admin(5, 12));
    handle.mount(&backend, TOKEN).await;

    let snap = handle.snapshot();
    assert_eq!(snap.filters.zone_id, Some(5));
    assert_eq!(snap.filters.mehfil_id, Some(12));
}

#[tokio::test]
async fn test_mount_runs_once() {
    let backend = FakeBackend::new();
    let handle = handle_for(zone_admin(4));

    handle.mount(&backend, TOKEN).await;
    handle.mount(&backend, TOKEN).await;

    assert_eq!(backend.count("stats"), 1);
    assert_eq!(backend.count("mehfils:4"), 1);
}

#[tokio::test]
async fn test_zone_admin_cannot_change_zone() {
    let backend = FakeBackend::new();
    let handle = handle_for(zone_admin(4));
    handle.mount(&backend, TOKEN).await;

    let err = handle.apply(&backend, TOKEN, zone_update(Some(9))).await.unwrap_err();
    assert_eq!(err, FilterError::ZoneLocked);
    assert_eq!(handle.snapshot().filters.zone_id, Some(4));
    assert_eq!(backend.count("stats"), 1, "rejected change must not refetch");

    // Resubmitting the locked zone is accepted and changes nothing.
    handle.apply(&backend, TOKEN, zone_update(Some(4))).await.expect("same zone is a no-op");
    assert_eq!(backend.count("stats"), 1);
}

// ---------------------------------------------------------------------------
// Filter cascade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_zone_change_resets_mehfil() {
    let backend = FakeBackend::new()
        .with_mehfils(2, vec![mehfil(40), mehfil(41)])
        .with_mehfils(3, vec![mehfil(50)]);
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    handle.apply(&backend, TOKEN, zone_update(Some(2))).await.unwrap();
    handle
        .apply(&backend, TOKEN, FilterUpdate { mehfil_id: Some(Some(40)), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(handle.snapshot().filters.mehfil_id, Some(40));

    // A form that changes the zone still carries the old mehfil; it is dropped.
    let update = FilterUpdate { zone_id: Some(Some(3)), mehfil_id: Some(Some(40)), ..Default::default() };
    handle.apply(&backend, TOKEN, update).await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.filters.zone_id, Some(3));
    assert_eq!(snap.filters.mehfil_id, None);
    assert_eq!(snap.mehfils, vec![mehfil(50)]);
    assert_eq!(snap.mode.body, ViewBody::ZoneCards);

    handle.apply(&backend, TOKEN, zone_update(None)).await.unwrap();
    let snap = handle.snapshot();
    assert_eq!(snap.filters.mehfil_id, None);
    assert!(snap.mehfils.is_empty());
}

#[tokio::test]
async fn test_mehfil_without_zone_is_rejected() {
    let backend = FakeBackend::new();
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    let err = handle
        .apply(&backend, TOKEN, FilterUpdate { mehfil_id: Some(Some(1)), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err, FilterError::MehfilWithoutZone);
}

#[tokio::test]
async fn test_period_change_refetches_stats_once() {
    let backend = FakeBackend::new();
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;
    assert_eq!(backend.count("stats"), 1);

    let update = FilterUpdate { month: Some(2), year: Some(2024), ..Default::default() };
    handle.apply(&backend, TOKEN, update).await.unwrap();

    assert_eq!(backend.count("stats"), 2);
    let q = backend.last_stats_query().unwrap();
    assert_eq!((q.month, q.year), (2, 2024));

    // Unchanged values do not trigger a refetch.
    handle.apply(&backend, TOKEN, update).await.unwrap();
    assert_eq!(backend.count("stats"), 2);
}

#[tokio::test]
async fn test_invalid_month_leaves_filters_untouched() {
    let backend = FakeBackend::new();
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    let update = FilterUpdate { month: Some(0), zone_id: Some(Some(2)), ..Default::default() };
    let err = handle.apply(&backend, TOKEN, update).await.unwrap_err();
    assert_eq!(err, FilterError::InvalidMonth(0));

    let snap = handle.snapshot();
    assert_eq!(snap.filters.month, 6);
    assert_eq!(snap.filters.zone_id, None);
}

// ---------------------------------------------------------------------------
// Mehfil cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mehfils_for_zone_hits_backend_once() {
    let backend = FakeBackend::new().with_mehfils(5, vec![mehfil(1)]);
    let handle = handle_for(region_admin());

    let first = handle.mehfils_for_zone(&backend, TOKEN, 5).await.unwrap();
    let second = handle.mehfils_for_zone(&backend, TOKEN, 5).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.count("mehfils:5"), 1);
}

#[tokio::test]
async fn test_revisiting_zone_uses_cache() {
    let backend = FakeBackend::new()
        .with_mehfils(5, vec![mehfil(1), mehfil(2)])
        .with_mehfils(6, vec![mehfil(3)]);
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    handle.apply(&backend, TOKEN, zone_update(Some(5))).await.unwrap();
    handle.apply(&backend, TOKEN, zone_update(Some(6))).await.unwrap();
    handle.apply(&backend, TOKEN, zone_update(Some(5))).await.unwrap();

    assert_eq!(backend.count("mehfils:5"), 1);
    assert_eq!(backend.count("mehfils:6"), 1);
    assert_eq!(handle.snapshot().mehfils, vec![mehfil(1), mehfil(2)]);
}

#[tokio::test]
async fn test_mehfil_fetch_failure_keeps_list() {
    let backend = FakeBackend::new().with_mehfils(5, vec![mehfil(1)]);
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;
    handle.apply(&backend, TOKEN, zone_update(Some(5))).await.unwrap();

    backend.set_fail_mehfils(true);
    handle.apply(&backend, TOKEN, zone_update(Some(6))).await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.filters.zone_id, Some(6));
    assert_eq!(snap.mehfils, vec![mehfil(1)], "stale list preferred over an empty one");
}

// ---------------------------------------------------------------------------
// Stats merging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_empty_zone_list_does_not_erase_zones() {
    let backend = FakeBackend::new()
        .with_zones(vec![zone(1, "A"), zone(2, "B")])
        .with_stats(None, DashboardStats { total_karkuns: 10, ..Default::default() });
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    let snap = handle.snapshot();
    assert_eq!(snap.stats.zones, vec![zone(1, "A"), zone(2, "B")]);
    assert_eq!(snap.stats.total_karkuns, 10);

    handle.apply(&backend, TOKEN, FilterUpdate { month: Some(1), ..Default::default() }).await.unwrap();
    assert_eq!(handle.snapshot().stats.zones.len(), 2);
}

#[tokio::test]
async fn test_stats_failure_keeps_previous_stats() {
    let backend = FakeBackend::new().with_stats(None, DashboardStats { total_mehfils: 44, ..Default::default() });
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    backend.set_fail_stats(true);
    handle.apply(&backend, TOKEN, FilterUpdate { month: Some(1), ..Default::default() }).await.unwrap();

    let snap = handle.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.stats.total_mehfils, 44);
    assert!(snap.last_error.is_some());

    backend.set_fail_stats(false);
    handle.apply(&backend, TOKEN, FilterUpdate { month: Some(2), ..Default::default() }).await.unwrap();
    assert!(handle.snapshot().last_error.is_none());
}

#[tokio::test]
async fn test_fetch_report_flags_rejected_token() {
    let backend = FakeBackend::new();
    let handle = handle_for(region_admin());

    let report = handle.mount(&backend, TOKEN).await;
    assert_eq!(report, FetchReport { stats: Some(StatsOutcome::Applied), unauthorized: false });
    assert_eq!(handle.mount(&backend, TOKEN).await, FetchReport::default());

    backend.set_token_expired(true);
    let report = handle.apply(&backend, TOKEN, FilterUpdate { month: Some(3), ..Default::default() }).await.unwrap();
    assert_eq!(report.stats, Some(StatsOutcome::Failed));
    assert!(report.unauthorized);

    // A zone change refetches mehfils as well; rejections are reported the same way.
    let report = handle.apply(&backend, TOKEN, zone_update(Some(8))).await.unwrap();
    assert!(report.unauthorized);
}

// ---------------------------------------------------------------------------
// Totals and render mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_super_admin_region_table_and_totals() {
    let backend = FakeBackend::new()
        .with_stats(None, multan_region_stats())
        .with_totals(OverallTotals { total_zones: 12, total_karkuns: 900, ..Default::default() });
    let handle = handle_for(super_admin());
    handle.mount(&backend, TOKEN).await;

    let snap = handle.snapshot();
    assert!(snap.mode.show_overall_totals);
    assert_eq!(snap.mode.body, ViewBody::RegionTable);
    assert_eq!(snap.stats.zone_report_stats.len(), 1);
    let row = &snap.stats.zone_report_stats[0];
    assert_eq!(row.zone_name, "Multan");
    assert_eq!(SubmissionTier::for_rate(row.submission_rate), SubmissionTier::Green);
    assert_eq!(snap.totals.as_ref().map(|t| t.total_zones), Some(12));
    assert_eq!(snap.totals_state, TotalsState::Done);
    assert!(!snap.loading_totals);
}

#[tokio::test]
async fn test_totals_fetched_once_across_filter_changes() {
    let backend = FakeBackend::new();
    let handle = handle_for(super_admin());
    handle.mount(&backend, TOKEN).await;
    for month in 1..=3 {
        handle.apply(&backend, TOKEN, FilterUpdate { month: Some(month), ..Default::default() }).await.unwrap();
    }
    assert_eq!(backend.count("totals"), 1);
    assert_eq!(backend.count("stats"), 4);
}

#[tokio::test]
async fn test_zone_name_falls_back_to_user_zone() {
    let backend = FakeBackend::new();
    let handle = handle_for(zone_admin(4));
    handle.mount(&backend, TOKEN).await;
    assert_eq!(handle.snapshot().zone_name.as_deref(), Some("Own Zone"));

    let handle = handle_for(mehfil_admin(3, 7));
    handle.mount(&backend, TOKEN).await;
    assert_eq!(handle.snapshot().zone_name.as_deref(), Some("Loading..."));
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_slow_earlier_response_does_not_win() {
    let backend = FakeBackend::new()
        .with_mehfils(1, vec![mehfil(10)])
        .with_mehfils(2, vec![mehfil(20)])
        .with_stats(Some(1), DashboardStats { total_karkuns: 1, ..Default::default() })
        .with_stats(Some(2), DashboardStats { total_karkuns: 2, ..Default::default() })
        .with_delay("mehfils:1", 60)
        .with_delay("stats:1", 60);
    let handle = handle_for(region_admin());
    handle.mount(&backend, TOKEN).await;

    let api: &dyn PortalBackend = &backend;
    let (first, second) = tokio::join!(
        handle.apply(api, TOKEN, zone_update(Some(1))),
        handle.apply(api, TOKEN, zone_update(Some(2))),
    );
    first.unwrap();
    second.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.filters.zone_id, Some(2));
    assert_eq!(snap.mehfils, vec![mehfil(20)]);
    assert_eq!(snap.stats.total_karkuns, 2);
    assert!(!snap.loading);
}
