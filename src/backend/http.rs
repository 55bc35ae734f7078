use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{BackendError, ListEnvelope, LoginResponse, PortalBackend, StatsQuery};
use crate::models::{DashboardStats, Mehfil, OverallTotals, Zone};

/// reqwest-backed client for the portal's REST backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl HttpBackend {
    pub fn new(base_url: &str, per_page: u32, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed_get(&self, token: &str, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .header("Accept", "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, BackendError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("Backend {} -> {}", path, status);
            return Err(BackendError::Status { status: status.as_u16(), path: path.to_string() });
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Schema(format!("{path}: {e}")))
    }
}

#[async_trait]
impl PortalBackend for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let req = self.client
            .post(self.url("/login"))
            .header("Accept", "application/json")
            .json(&body);
        self.send_json(req, "/login").await
    }

    async fn list_zones(&self, token: &str) -> Result<Vec<Zone>, BackendError> {
        let req = self.authed_get(token, "/zones").query(&[("per_page", self.per_page)]);
        let envelope: ListEnvelope<Zone> = self.send_json(req, "/zones").await?;
        log::debug!("Fetched {} zones", envelope.data.len());
        Ok(envelope.data)
    }

    async fn list_mehfils(&self, token: &str, zone_id: i64) -> Result<Vec<Mehfil>, BackendError> {
        let req = self.authed_get(token, "/mehfils")
            .query(&[("zone_id", zone_id), ("per_page", i64::from(self.per_page))]);
        let envelope: ListEnvelope<Mehfil> = self.send_json(req, "/mehfils").await?;
        log::debug!("Fetched {} mehfils for zone {}", envelope.data.len(), zone_id);
        Ok(envelope.data)
    }

    async fn dashboard_stats(&self, token: &str, query: &StatsQuery) -> Result<DashboardStats, BackendError> {
        let req = self.authed_get(token, "/dashboard/stats").query(query);
        let stats: DashboardStats = self.send_json(req, "/dashboard/stats").await?;
        stats.validate().map_err(BackendError::Schema)?;
        Ok(stats)
    }

    async fn overall_totals(&self, token: &str) -> Result<OverallTotals, BackendError> {
        let req = self.authed_get(token, "/dashboard/totals");
        self.send_json(req, "/dashboard/totals").await
    }
}
