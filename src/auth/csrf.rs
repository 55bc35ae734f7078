use actix_session::Session;
use rand::Rng;

use super::session::CSRF_KEY;
use crate::errors::AppError;

/// Get the CSRF token from the session, or generate a new one.
pub fn get_or_create_token(session: &Session) -> String {
    if let Ok(Some(token)) = session.get::<String>(CSRF_KEY) {
        return token;
    }
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    let token = hex::encode(bytes);
    let _ = session.insert(CSRF_KEY, &token);
    token
}

/// Compare the submitted token with the session's, in constant time.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored = session.get::<String>(CSRF_KEY).unwrap_or(None).unwrap_or_default();
    let matches = stored.len() == submitted.len()
        && stored.bytes().zip(submitted.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0;
    if stored.is_empty() || !matches {
        return Err(AppError::Csrf);
    }
    Ok(())
}
