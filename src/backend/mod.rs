//! REST backend access.
//!
//! The portal owns no data: zones, mehfils, statistics and the login itself
//! all come from the backend. `PortalBackend` is the seam the dashboard and
//! handlers are written against; `HttpBackend` is the reqwest implementation.

pub mod http;

pub use self::http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{DashboardStats, Mehfil, OverallTotals, User, Zone};

/// Query parameters for `GET /dashboard/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsQuery {
    pub month: u32,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mehfil_id: Option<i64>,
}

/// Successful `POST /login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `{ "data": [...] }` list envelope used by the collection endpoints.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug)]
pub enum BackendError {
    Http(reqwest::Error),
    Status { status: u16, path: String },
    Schema(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "Backend request failed: {e}"),
            BackendError::Status { status, path } => write!(f, "Backend returned {status} for {path}"),
            BackendError::Schema(e) => write!(f, "Backend response rejected: {e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Schema(e.to_string())
        } else {
            BackendError::Http(e)
        }
    }
}

impl BackendError {
    /// True when the backend rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status: 401 | 403, .. })
    }
}

#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// Exchange credentials for a bearer token and the user record.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError>;

    async fn list_zones(&self, token: &str) -> Result<Vec<Zone>, BackendError>;

    async fn list_mehfils(&self, token: &str, zone_id: i64) -> Result<Vec<Mehfil>, BackendError>;

    async fn dashboard_stats(&self, token: &str, query: &StatsQuery) -> Result<DashboardStats, BackendError>;

    async fn overall_totals(&self, token: &str) -> Result<OverallTotals, BackendError>;
}
