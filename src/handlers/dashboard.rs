use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};
use serde::Deserialize;

use crate::auth::session::{DASHBOARD_KEY, dashboard_key, require_user, set_flash};
use crate::backend::PortalBackend;
use crate::config::Settings;
use crate::dashboard::{Capabilities, DashboardHandle, FetchReport, FilterUpdate, StatsOutcome};
use crate::errors::{AppError, render};
use crate::models::User;
use crate::registry::DashboardRegistry;
use crate::templates_structs::{DashboardTemplate, PageContext};

fn time_greeting(username: &str) -> String {
    let hour = Local::now().hour();
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{}, {}", period, username)
}

/// Dashboard filter query. An absent key leaves the filter alone; an empty
/// value clears it ("All zones").
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub month: Option<String>,
    pub year: Option<String>,
    pub zone_id: Option<String>,
    pub mehfil_id: Option<String>,
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{name} must be a number")))
}

fn parse_scalar<T: std::str::FromStr>(name: &str, raw: &Option<String>) -> Result<Option<T>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_number(name, v).map(Some),
    }
}

fn parse_selection(name: &str, raw: &Option<String>) -> Result<Option<Option<i64>>, AppError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(v) => parse_number(name, v).map(|id| Some(Some(id))),
    }
}

impl FilterQuery {
    pub fn to_update(&self) -> Result<FilterUpdate, AppError> {
        Ok(FilterUpdate {
            month: parse_scalar("month", &self.month)?,
            year: parse_scalar("year", &self.year)?,
            zone_id: parse_selection("zone_id", &self.zone_id)?,
            mehfil_id: parse_selection("mehfil_id", &self.mehfil_id)?,
        })
    }
}

/// The backend no longer accepts the session's token: forget the dashboard
/// and the session so the next request lands on the login page.
fn expire_session(registry: &DashboardRegistry, session: &Session, user: &User) -> AppError {
    if let Ok(Some(key)) = session.get::<String>(DASHBOARD_KEY) {
        registry.remove(&key);
    }
    session.purge();
    log::info!("Backend rejected the token of user {}, signing out", user.id);
    AppError::Unauthorized
}

fn check_report(report: FetchReport, registry: &DashboardRegistry, session: &Session, user: &User) -> Result<(), AppError> {
    if report.unauthorized {
        return Err(expire_session(registry, session, user));
    }
    if report.stats == Some(StatsOutcome::Stale) {
        log::debug!("Stats for user {} superseded by a newer request", user.id);
    }
    Ok(())
}

/// Session's dashboard, mounted.
async fn load_dashboard(
    backend: &dyn PortalBackend,
    registry: &DashboardRegistry,
    session: &Session,
    token: &str,
    user: &User,
) -> Result<DashboardHandle, AppError> {
    let handle = registry.get_or_create(&dashboard_key(session)?, user);
    let report = handle.mount(backend, token).await;
    check_report(report, registry, session, user)?;
    Ok(handle)
}

/// GET /dashboard
pub async fn index(
    backend: web::Data<dyn PortalBackend>,
    registry: web::Data<DashboardRegistry>,
    settings: web::Data<Settings>,
    session: Session,
    query: web::Query<FilterQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, user) = require_user(&session)?;
    let update = query.to_update()?;

    let handle = load_dashboard(backend.get_ref(), &registry, &session, &token, &user).await?;
    match handle.apply(backend.get_ref(), &token, update).await {
        Ok(report) => check_report(report, &registry, &session, &user)?,
        Err(e) => {
            log::warn!("Rejected dashboard filter for user {}: {}", user.id, e);
            set_flash(&session, &e.to_string());
        }
    }

    let snapshot = handle.snapshot();
    let ctx = PageContext::build(&session, &user, &settings.app_name);
    let greeting = time_greeting(user.display_name());
    render(DashboardTemplate::build(ctx, greeting, snapshot))
}

/// GET /dashboard/state - JSON snapshot, same filter query as the page
pub async fn state(
    backend: web::Data<dyn PortalBackend>,
    registry: web::Data<DashboardRegistry>,
    session: Session,
    query: web::Query<FilterQuery>,
) -> Result<HttpResponse, AppError> {
    let (token, user) = require_user(&session)?;
    let update = query.to_update()?;

    let handle = load_dashboard(backend.get_ref(), &registry, &session, &token, &user).await?;
    let report = handle.apply(backend.get_ref(), &token, update).await?;
    check_report(report, &registry, &session, &user)?;
    Ok(HttpResponse::Ok().json(handle.snapshot()))
}

/// GET /dashboard/zones/{id}/mehfils
pub async fn zone_mehfils(
    backend: web::Data<dyn PortalBackend>,
    registry: web::Data<DashboardRegistry>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let (token, user) = require_user(&session)?;
    let zone_id = path.into_inner();

    if !Capabilities::for_user(&user).can_filter_zones && user.zone_id != Some(zone_id) {
        return Err(AppError::Forbidden);
    }

    let handle = registry.get_or_create(&dashboard_key(&session)?, &user);
    let mehfils = match handle.mehfils_for_zone(backend.get_ref(), &token, zone_id).await {
        Ok(list) => list,
        Err(e) if e.is_unauthorized() => return Err(expire_session(&registry, &session, &user)),
        Err(e) => return Err(e.into()),
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": mehfils })))
}
