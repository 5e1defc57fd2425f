//! Backend fetch boundary
//!
//! Everything that leaves this module is typed: wire JSON is decoded into
//! [`RawBrigade`] / [`DiscourseTag`] here or rejected with an error naming
//! the fetch that failed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{DiscourseTag, RawBrigade, RawProject, TagsEnvelope};
use crate::{Error, FetchTarget, Result};

const USER_AGENT: &str = concat!("statusboard/", env!("CARGO_PKG_VERSION"));

/// Source of brigade and tag data
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch and decode the brigade directory
    async fn fetch_brigades(&self) -> Result<Vec<RawBrigade>>;

    /// Fetch and decode the forum tag list
    async fn fetch_tags(&self) -> Result<Vec<DiscourseTag>>;
}

/// [`DataSource`] backed by the status board HTTP API
pub struct HttpDataSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, target: FetchTarget) -> String {
        format!("{}{}", self.base_url, target.path())
    }

    async fn get_body(&self, target: FetchTarget) -> Result<Vec<u8>> {
        let url = self.url_for(target);
        debug!(fetch = %target, url = %url, "Fetching from status board API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Fetch {
                target,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                target,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Fetch {
            target,
            message: e.to_string(),
        })?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_brigades(&self) -> Result<Vec<RawBrigade>> {
        let body = self.get_body(FetchTarget::Brigades).await?;
        let brigades = decode_brigades(&body)?;
        info!(count = brigades.len(), "Fetched brigades");
        Ok(brigades)
    }

    async fn fetch_tags(&self) -> Result<Vec<DiscourseTag>> {
        let body = self.get_body(FetchTarget::Tags).await?;
        let tags = decode_tags(&body)?;
        info!(count = tags.len(), "Fetched discourse tags");
        Ok(tags)
    }
}

/// Brigade with its projects still undecoded, so one bad project does not
/// sink the whole payload
#[derive(Deserialize)]
struct WireBrigade {
    name: String,
    #[serde(default)]
    projects: Option<Vec<Value>>,
}

/// Decode a `/api/data.json` body.
///
/// The payload must be a JSON array. Brigade and project records that do
/// not match the schema are logged and skipped; a brigade with null or
/// missing projects reads as having none.
pub fn decode_brigades(body: &[u8]) -> Result<Vec<RawBrigade>> {
    let records: Vec<Value> = serde_json::from_slice(body).map_err(|e| Error::Decode {
        target: FetchTarget::Brigades,
        message: e.to_string(),
    })?;

    Ok(records
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WireBrigade>(value) {
            Ok(brigade) => Some(decode_projects(brigade)),
            Err(e) => {
                warn!(error = %e, "Skipping malformed brigade record");
                None
            }
        })
        .collect())
}

fn decode_projects(brigade: WireBrigade) -> RawBrigade {
    let projects = brigade
        .projects
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawProject>(value) {
            Ok(project) => Some(project),
            Err(e) => {
                warn!(brigade = %brigade.name, error = %e, "Skipping malformed project record");
                None
            }
        })
        .collect();

    RawBrigade {
        name: brigade.name,
        projects,
    }
}

/// Decode a `/api/tags.json` body. A missing `tags` key reads as no tags.
pub fn decode_tags(body: &[u8]) -> Result<Vec<DiscourseTag>> {
    let envelope: TagsEnvelope = serde_json::from_slice(body).map_err(|e| Error::Decode {
        target: FetchTarget::Tags,
        message: e.to_string(),
    })?;

    Ok(envelope.tags.unwrap_or_default())
}
