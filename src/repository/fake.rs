use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::db::NewsResourceQuery;
use crate::error::Result;
use crate::models::{Author, NewsResource, Topic};
use crate::network::{
    FakeNewsNetworkDataSource, NetworkAuthor, NetworkNewsResource, NetworkTopic,
    NewsNetworkDataSource,
};

use super::{AuthorsRepository, NewsRepository, Synchronizer, TopicsRepository};

/// News repository over the hardcoded data source, for offline/demo builds.
/// Read streams emit a single snapshot of the fake payloads; `sync_with` is a
/// no-op that reports success.
pub struct FakeNewsRepository {
    source: Arc<FakeNewsNetworkDataSource>,
}

impl FakeNewsRepository {
    pub fn new(source: Arc<FakeNewsNetworkDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl NewsRepository for FakeNewsRepository {
    fn news_resources(&self, query: NewsResourceQuery) -> BoxStream<'static, Vec<NewsResource>> {
        let source = Arc::clone(&self.source);
        stream::once(async move {
            match news_snapshot(&source, &query).await {
                Ok(resources) => resources,
                Err(e) => {
                    tracing::error!("Failed to read fake news resources: {}", e);
                    Vec::new()
                }
            }
        })
        .boxed()
    }

    async fn sync_with(&self, _synchronizer: &dyn Synchronizer) -> bool {
        true
    }
}

pub struct FakeTopicsRepository {
    source: Arc<FakeNewsNetworkDataSource>,
}

impl FakeTopicsRepository {
    pub fn new(source: Arc<FakeNewsNetworkDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl TopicsRepository for FakeTopicsRepository {
    fn topics(&self) -> BoxStream<'static, Vec<Topic>> {
        let source = Arc::clone(&self.source);
        stream::once(async move {
            match source.topics().await {
                Ok(payloads) => payloads.into_iter().map(Topic::from).collect(),
                Err(e) => {
                    tracing::error!("Failed to read fake topics: {}", e);
                    Vec::new()
                }
            }
        })
        .boxed()
    }

    fn topic(&self, id: &str) -> BoxStream<'static, Topic> {
        let source = Arc::clone(&self.source);
        let id = id.to_string();
        stream::once(async move {
            match source.topics().await {
                Ok(payloads) => payloads
                    .into_iter()
                    .find(|payload| payload.id == id)
                    .map(Topic::from),
                Err(e) => {
                    tracing::error!("Failed to read fake topic: {}", e);
                    None
                }
            }
        })
        .filter_map(|topic| async move { topic })
        .boxed()
    }

    async fn sync_with(&self, _synchronizer: &dyn Synchronizer) -> bool {
        true
    }
}

pub struct FakeAuthorsRepository {
    source: Arc<FakeNewsNetworkDataSource>,
}

impl FakeAuthorsRepository {
    pub fn new(source: Arc<FakeNewsNetworkDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AuthorsRepository for FakeAuthorsRepository {
    fn authors(&self) -> BoxStream<'static, Vec<Author>> {
        let source = Arc::clone(&self.source);
        stream::once(async move {
            match source.authors().await {
                Ok(payloads) => payloads.into_iter().map(Author::from).collect(),
                Err(e) => {
                    tracing::error!("Failed to read fake authors: {}", e);
                    Vec::new()
                }
            }
        })
        .boxed()
    }

    fn author(&self, id: &str) -> BoxStream<'static, Author> {
        let source = Arc::clone(&self.source);
        let id = id.to_string();
        stream::once(async move {
            match source.authors().await {
                Ok(payloads) => payloads
                    .into_iter()
                    .find(|payload| payload.id == id)
                    .map(Author::from),
                Err(e) => {
                    tracing::error!("Failed to read fake author: {}", e);
                    None
                }
            }
        })
        .filter_map(|author| async move { author })
        .boxed()
    }

    async fn sync_with(&self, _synchronizer: &dyn Synchronizer) -> bool {
        true
    }
}

/// Applies the store's filter and ordering contract to the fake payloads:
/// union of the topic and author matches, publish date descending, ties by
/// id ascending.
async fn news_snapshot(
    source: &FakeNewsNetworkDataSource,
    query: &NewsResourceQuery,
) -> Result<Vec<NewsResource>> {
    let topics: BTreeMap<String, Topic> = source
        .topics()
        .await?
        .into_iter()
        .map(|payload| (payload.id.clone(), Topic::from(payload)))
        .collect();
    let authors: BTreeMap<String, Author> = source
        .authors()
        .await?
        .into_iter()
        .map(|payload| (payload.id.clone(), Author::from(payload)))
        .collect();

    let mut resources: Vec<NewsResource> = source
        .news_resources()
        .await?
        .into_iter()
        .filter(|payload| matches_query(payload, query))
        .map(|payload| NewsResource {
            topics: payload
                .topics
                .iter()
                .filter_map(|id| topics.get(id).cloned())
                .collect(),
            authors: payload
                .authors
                .iter()
                .filter_map(|id| authors.get(id).cloned())
                .collect(),
            id: payload.id,
            title: payload.title,
            content: payload.content,
            url: payload.url,
            header_image_url: payload.header_image_url,
            publish_date: payload.publish_date,
            kind: payload.kind,
        })
        .collect();

    resources.sort_by(|a, b| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(resources)
}

fn matches_query(payload: &NetworkNewsResource, query: &NewsResourceQuery) -> bool {
    if query.filter_topic_ids.is_empty() && query.filter_author_ids.is_empty() {
        return true;
    }
    payload
        .topics
        .iter()
        .any(|id| query.filter_topic_ids.contains(id))
        || payload
            .authors
            .iter()
            .any(|id| query.filter_author_ids.contains(id))
}

impl From<NetworkTopic> for Topic {
    fn from(payload: NetworkTopic) -> Self {
        Topic {
            id: payload.id,
            name: payload.name,
            short_description: payload.short_description,
            long_description: payload.long_description,
            url: payload.url,
            image_url: payload.image_url,
        }
    }
}

impl From<NetworkAuthor> for Author {
    fn from(payload: NetworkAuthor) -> Self {
        Author {
            id: payload.id,
            name: payload.name,
            image_url: payload.image_url,
            twitter: payload.twitter,
            bio: payload.bio,
        }
    }
}
