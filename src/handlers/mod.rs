pub mod auth_handlers;
pub mod dashboard;

use actix_web::web;

use crate::auth::middleware::require_auth;

/// Register all portal routes. Shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        // Root redirect
        .route("/", web::get().to(|| async {
            actix_web::HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish()
        }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(actix_web::middleware::from_fn(require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/dashboard/state", web::get().to(dashboard::state))
                .route("/dashboard/zones/{id}/mehfils", web::get().to(dashboard::zone_mehfils))
        );
}
