// src/client/mod.rs

pub mod csrf;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::errors::{DashboardError, Result};
use crate::models::{JobRecord, ResultPayload};
use csrf::CsrfSigner;

/// Path of the job collection, relative to the service root.
pub const JOB_LIST_PATH: &str = "job_list/.json";

/// Where job snapshots and result payloads come from.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetches the full job collection.
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>>;

    /// Fetches one result payload. `url` may be absolute or relative to the service root.
    async fn fetch_result(&self, url: &str) -> Result<ResultPayload>;
}

/// HTTP client for the job service.
#[derive(Clone)]
pub struct JobServiceClient {
    client: Client,
    base: Url,
    csrf: CsrfSigner,
}

impl JobServiceClient {
    pub fn new(client: Client, base: &str, csrf: CsrfSigner) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&normalized)
            .map_err(|e| DashboardError::Config(format!("invalid upstream URL '{}': {}", base, e)))?;
        Ok(Self { client, base, csrf })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| DashboardError::Config(format!("invalid path '{}': {}", path, e)))
    }

    /// Builds a request, signing it when the method and origin require it.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.resolve(path)?;
        let same_origin = url.origin() == self.base.origin();
        let builder = self.client.request(method.clone(), url);
        Ok(self.csrf.sign(builder, &method, same_origin))
    }

    async fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> Result<T> {
        let resp = builder.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(DashboardError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl JobSource for JobServiceClient {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>> {
        let builder = self.request(Method::GET, JOB_LIST_PATH)?;
        self.get_json(builder, JOB_LIST_PATH).await
    }

    async fn fetch_result(&self, url: &str) -> Result<ResultPayload> {
        log::info!("Loading result data from {}", url);
        // Results are never served from cache
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();
        let builder = self
            .request(Method::GET, url)?
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .query(&[("_", cache_buster)]);
        self.get_json(builder, url).await
    }
}
