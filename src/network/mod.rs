mod fake;

pub use fake::FakeNewsNetworkDataSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::NewsResourceType;

/// Topic payload as served by the backend; mirrors the domain shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTopic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkAuthor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub bio: String,
}

/// News payload. `topics` and `authors` carry the ids the backend links the
/// resource to; cross-reference rows are derived from them during sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkNewsResource {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    pub publish_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NewsResourceType,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Upstream collaborator supplying raw topic/author/news payloads. Consumed
/// only by the repository layer, never by the query engine.
#[async_trait]
pub trait NewsNetworkDataSource: Send + Sync {
    async fn topics(&self) -> Result<Vec<NetworkTopic>>;

    async fn authors(&self) -> Result<Vec<NetworkAuthor>>;

    async fn news_resources(&self) -> Result<Vec<NetworkNewsResource>>;

    /// Monotonically increasing version of the backend change list, recorded
    /// by repositories after a successful sync.
    async fn latest_change_list_version(&self) -> Result<i64>;
}
