use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

use crate::backend::BackendError;
use crate::dashboard::FilterError;

#[derive(Debug)]
pub enum AppError {
    Backend(BackendError),
    Template(askama::Error),
    Filter(FilterError),
    Session(String),
    Config(String),
    BadRequest(String),
    Csrf,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "{e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Filter(e) => write!(f, "{e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Config(e) => write!(f, "Configuration error: {e}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Unauthorized => write!(f, "Not signed in"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().body("Not Found"),
            AppError::Filter(e) => HttpResponse::BadRequest().body(e.to_string()),
            AppError::BadRequest(_) => HttpResponse::BadRequest().body(self.to_string()),
            AppError::Csrf | AppError::Forbidden => HttpResponse::Forbidden().body(self.to_string()),
            AppError::Unauthorized => HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish(),
            AppError::Backend(e) if e.is_unauthorized() => HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish(),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Backend(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::Filter(e)
    }
}

/// Render an Askama template into an HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
