//! Hosted backend reached over its REST and auth endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Value};

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::auth::{AuthUser, Session},
};

use super::{AuthBackend, DataBackend, Query};

/// Postgres unique-violation code, reported in the error body
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Request with the API key and the caller's token (anon key otherwise)
    fn authorized(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    fn table_request(&self, method: Method, query: &Query) -> RequestBuilder {
        tracing::debug!(
            table = query.table_name(),
            method = %method,
            params = ?query.to_params(),
            "Backend table request"
        );
        self.authorized(method, &self.table_url(query.table_name()), query.bearer_token())
            .query(&query.to_params())
    }

    async fn rows(response: Response) -> AppResult<Vec<Value>> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&body)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }

    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), &body))
    }
}

/// Build an error from a failed response's status and body
fn error_from_body(status: u16, body: &str) -> AppError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let message = ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Backend request failed")
                .to_string()
        });

    let status = match parsed.get("code").and_then(Value::as_str) {
        Some(UNIQUE_VIOLATION) => 409,
        _ => status,
    };

    AppError::Backend { status, message }
}

#[async_trait]
impl DataBackend for RestBackend {
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        let response = self.table_request(Method::GET, query).send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, query: &Query, rows: Value) -> AppResult<Vec<Value>> {
        let response = self
            .table_request(Method::POST, query)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        let response = self
            .table_request(Method::PATCH, query)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>> {
        let response = self
            .table_request(Method::DELETE, query)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn ping(&self) -> AppResult<()> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self.authorized(Method::GET, &url, None).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        tracing::debug!(email, "Backend password sign-in");
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session = Self::check(response).await?.json::<Session>().await?;
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .authorized(Method::POST, &self.auth_url("logout"), Some(access_token))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser> {
        let response = self
            .authorized(Method::GET, &self.auth_url("user"), Some(access_token))
            .send()
            .await?;
        let user = Self::check(response).await?.json::<AuthUser>().await?;
        Ok(user)
    }
}
