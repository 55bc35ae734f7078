/// Validate a login email: required, must contain '@', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') {
        return Some("Email must be a valid address".to_string());
    }
    None
}

/// Passwords are checked by the backend; only presence is required here.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    None
}

/// Collect all login form errors in display order.
pub fn validate_login(email: &str, password: &str) -> Vec<String> {
    [validate_email(email), validate_password(password)]
        .into_iter()
        .flatten()
        .collect()
}
