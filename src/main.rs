use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use karkun_portal::auth::rate_limit::LoginLimiter;
use karkun_portal::backend::{HttpBackend, PortalBackend};
use karkun_portal::config::Settings;
use karkun_portal::handlers;
use karkun_portal::registry::DashboardRegistry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let backend: Arc<dyn PortalBackend> = match HttpBackend::new(
        &settings.backend_url,
        settings.per_page,
        settings.request_timeout,
    ) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            log::error!("Failed to build backend client: {e}");
            std::process::exit(1);
        }
    };
    let registry = DashboardRegistry::new(settings.session_ttl);
    let limiter = LoginLimiter::new(settings.login_max_failures, settings.login_window);

    // Session encryption key; set SESSION_KEY to keep sessions across restarts
    let secret_key = match settings.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let bind = settings.bind.clone();
    log::info!("Starting server at http://{} (backend {})", bind, settings.backend_url);

    let backend = web::Data::from(backend);
    let registry = web::Data::new(registry);
    let limiter = web::Data::new(limiter);
    let settings = web::Data::new(settings);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(backend.clone())
            .app_data(registry.clone())
            .app_data(limiter.clone())
            .app_data(settings.clone())
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind)?
    .run()
    .await
}
