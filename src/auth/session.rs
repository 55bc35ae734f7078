use actix_session::Session;

use crate::errors::AppError;
use crate::models::User;

pub const TOKEN_KEY: &str = "api_token";
pub const USER_KEY: &str = "user";
pub const DASHBOARD_KEY: &str = "dashboard_key";
pub const CSRF_KEY: &str = "csrf_token";
pub const FLASH_KEY: &str = "flash";

pub fn get_token(session: &Session) -> Option<String> {
    session.get::<String>(TOKEN_KEY).unwrap_or(None)
}

/// Token and user of the signed-in session, or `Unauthorized`.
pub fn require_user(session: &Session) -> Result<(String, User), AppError> {
    let token = get_token(session).ok_or(AppError::Unauthorized)?;
    let user = session
        .get::<User>(USER_KEY)
        .map_err(|e| AppError::Session(format!("Failed to read user: {e}")))?
        .ok_or(AppError::Unauthorized)?;
    Ok((token, user))
}

pub fn sign_in(session: &Session, token: &str, user: &User) -> Result<(), AppError> {
    session.renew();
    session.remove(DASHBOARD_KEY);
    session
        .insert(TOKEN_KEY, token)
        .and_then(|_| session.insert(USER_KEY, user))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

/// The session's dashboard key, created on first use.
pub fn dashboard_key(session: &Session) -> Result<String, AppError> {
    if let Ok(Some(key)) = session.get::<String>(DASHBOARD_KEY) {
        return Ok(key);
    }
    let key = crate::registry::DashboardRegistry::new_key();
    session
        .insert(DASHBOARD_KEY, &key)
        .map_err(|e| AppError::Session(format!("Failed to store dashboard key: {e}")))?;
    Ok(key)
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert(FLASH_KEY, message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}
