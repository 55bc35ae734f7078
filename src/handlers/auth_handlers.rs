use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::session::{DASHBOARD_KEY, get_token, sign_in};
use crate::auth::rate_limit::LoginLimiter;
use crate::auth::{csrf, validate};
use crate::backend::{BackendError, PortalBackend};
use crate::config::Settings;
use crate::errors::{AppError, render};
use crate::registry::DashboardRegistry;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_form(session: &Session, settings: &Settings, email: &str, errors: Vec<String>) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        errors,
        email: email.to_string(),
        app_name: settings.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
    };
    render(tmpl)
}

pub async fn login_page(
    settings: web::Data<Settings>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    // If already logged in, redirect to dashboard
    if get_token(&session).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    login_form(&session, &settings, "", Vec::new())
}

pub async fn login_submit(
    req: HttpRequest,
    backend: web::Data<dyn PortalBackend>,
    settings: web::Data<Settings>,
    limiter: web::Data<LoginLimiter>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Throttle before the backend sees the credentials
    let ip = req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    if limiter.is_blocked(ip) {
        let msg = "Too many failed sign-in attempts. Please try again later.".to_string();
        return login_form(&session, &settings, &form.email, vec![msg]);
    }

    let errors = validate::validate_login(&form.email, &form.password);
    if !errors.is_empty() {
        return login_form(&session, &settings, &form.email, errors);
    }

    match backend.login(form.email.trim(), &form.password).await {
        Ok(login) => {
            limiter.clear(ip);
            sign_in(&session, &login.token, &login.user)?;
            log::info!("User {} signed in", login.user.id);
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish())
        }
        Err(e) if e.is_unauthorized() || matches!(e, BackendError::Status { status: 422, .. }) => {
            limiter.record_failure(ip);
            login_form(&session, &settings, &form.email, vec!["Invalid email or password".to_string()])
        }
        Err(e) => {
            log::error!("Login request failed: {}", e);
            login_form(&session, &settings, &form.email, vec!["Login service is unavailable, please try again".to_string()])
        }
    }
}

pub async fn logout(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    if let Ok(Some(key)) = session.get::<String>(DASHBOARD_KEY) {
        registry.remove(&key);
    }
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
