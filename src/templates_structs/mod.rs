// Template context structures for Askama templates.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::take_flash;
use crate::models::User;

mod common;
mod dashboard;

pub use self::common::LoginTemplate;
pub use self::dashboard::{DashboardTemplate, RegionRow, ReportRow, SelectOption, StatCard};

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub role_label: String,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session, user: &User, app_name: &str) -> Self {
        let username = user.display_name().to_string();
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Self {
            username,
            avatar_initial,
            role_label: user.role_label().to_string(),
            flash: take_flash(session),
            app_name: app_name.to_string(),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}
