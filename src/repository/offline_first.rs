use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::db::{
    AuthorEntity, LocalStore, NewsResourceAuthorCrossRef, NewsResourceEntity, NewsResourceQuery,
    NewsResourceTopicCrossRef, TopicEntity,
};
use crate::error::Result;
use crate::models::{Author, NewsResource, Topic};
use crate::network::{NetworkAuthor, NetworkNewsResource, NetworkTopic, NewsNetworkDataSource};

use super::{AuthorsRepository, NewsRepository, SyncKind, Synchronizer, TopicsRepository};

/// News repository that reads from the local store and reconciles the
/// backend into it on demand.
pub struct OfflineFirstNewsRepository {
    store: LocalStore,
    network: Arc<dyn NewsNetworkDataSource>,
}

impl OfflineFirstNewsRepository {
    pub fn new(store: LocalStore, network: Arc<dyn NewsNetworkDataSource>) -> Self {
        Self { store, network }
    }

    async fn sync(&self, synchronizer: &dyn Synchronizer) -> Result<()> {
        let current = synchronizer.change_list_version(SyncKind::NewsResources);
        let latest = self.network.latest_change_list_version().await?;
        tracing::debug!(
            "Syncing news resources from change list version {} to {}",
            current,
            latest
        );

        let payloads = self.network.news_resources().await?;

        let mut entities = Vec::with_capacity(payloads.len());
        let mut topic_refs = Vec::new();
        let mut author_refs = Vec::new();
        for payload in payloads {
            for topic_id in &payload.topics {
                topic_refs.push(NewsResourceTopicCrossRef {
                    news_resource_id: payload.id.clone(),
                    topic_id: topic_id.clone(),
                });
            }
            for author_id in &payload.authors {
                author_refs.push(NewsResourceAuthorCrossRef {
                    news_resource_id: payload.id.clone(),
                    author_id: author_id.clone(),
                });
            }
            entities.push(NewsResourceEntity::from(payload));
        }

        // Each batch commits atomically; a failure after one batch leaves the
        // batches committed so far in place.
        self.store.upsert_news_resources(entities).await?;
        self.store
            .insert_or_ignore_topic_cross_refs(topic_refs)
            .await?;
        self.store
            .insert_or_ignore_author_cross_refs(author_refs)
            .await?;

        synchronizer.update_change_list_version(SyncKind::NewsResources, latest);
        Ok(())
    }
}

#[async_trait]
impl NewsRepository for OfflineFirstNewsRepository {
    fn news_resources(&self, query: NewsResourceQuery) -> BoxStream<'static, Vec<NewsResource>> {
        self.store
            .watch_news_resources(query)
            .map(|populated| populated.into_iter().map(NewsResource::from).collect())
            .boxed()
    }

    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool {
        match self.sync(synchronizer).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to sync news resources: {}", e);
                false
            }
        }
    }
}

pub struct OfflineFirstTopicsRepository {
    store: LocalStore,
    network: Arc<dyn NewsNetworkDataSource>,
}

impl OfflineFirstTopicsRepository {
    pub fn new(store: LocalStore, network: Arc<dyn NewsNetworkDataSource>) -> Self {
        Self { store, network }
    }

    async fn sync(&self, synchronizer: &dyn Synchronizer) -> Result<()> {
        let current = synchronizer.change_list_version(SyncKind::Topics);
        let latest = self.network.latest_change_list_version().await?;
        tracing::debug!(
            "Syncing topics from change list version {} to {}",
            current,
            latest
        );

        let topics = self
            .network
            .topics()
            .await?
            .into_iter()
            .map(TopicEntity::from)
            .collect();
        self.store.upsert_topics(topics).await?;

        synchronizer.update_change_list_version(SyncKind::Topics, latest);
        Ok(())
    }
}

#[async_trait]
impl TopicsRepository for OfflineFirstTopicsRepository {
    fn topics(&self) -> BoxStream<'static, Vec<Topic>> {
        self.store
            .watch_topics()
            .map(|topics| topics.into_iter().map(Topic::from).collect())
            .boxed()
    }

    fn topic(&self, id: &str) -> BoxStream<'static, Topic> {
        self.store
            .watch_topic(id.to_string())
            .filter_map(|topic| async move { topic.map(Topic::from) })
            .boxed()
    }

    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool {
        match self.sync(synchronizer).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to sync topics: {}", e);
                false
            }
        }
    }
}

pub struct OfflineFirstAuthorsRepository {
    store: LocalStore,
    network: Arc<dyn NewsNetworkDataSource>,
}

impl OfflineFirstAuthorsRepository {
    pub fn new(store: LocalStore, network: Arc<dyn NewsNetworkDataSource>) -> Self {
        Self { store, network }
    }

    async fn sync(&self, synchronizer: &dyn Synchronizer) -> Result<()> {
        let current = synchronizer.change_list_version(SyncKind::Authors);
        let latest = self.network.latest_change_list_version().await?;
        tracing::debug!(
            "Syncing authors from change list version {} to {}",
            current,
            latest
        );

        let authors = self
            .network
            .authors()
            .await?
            .into_iter()
            .map(AuthorEntity::from)
            .collect();
        self.store.upsert_authors(authors).await?;

        synchronizer.update_change_list_version(SyncKind::Authors, latest);
        Ok(())
    }
}

#[async_trait]
impl AuthorsRepository for OfflineFirstAuthorsRepository {
    fn authors(&self) -> BoxStream<'static, Vec<Author>> {
        self.store
            .watch_authors()
            .map(|authors| authors.into_iter().map(Author::from).collect())
            .boxed()
    }

    fn author(&self, id: &str) -> BoxStream<'static, Author> {
        self.store
            .watch_author(id.to_string())
            .filter_map(|author| async move { author.map(Author::from) })
            .boxed()
    }

    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool {
        match self.sync(synchronizer).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to sync authors: {}", e);
                false
            }
        }
    }
}

impl From<NetworkNewsResource> for NewsResourceEntity {
    fn from(payload: NetworkNewsResource) -> Self {
        NewsResourceEntity {
            id: payload.id,
            title: payload.title,
            content: payload.content,
            url: payload.url,
            header_image_url: payload.header_image_url,
            publish_date: payload.publish_date,
            kind: payload.kind,
        }
    }
}

impl From<NetworkTopic> for TopicEntity {
    fn from(payload: NetworkTopic) -> Self {
        TopicEntity {
            id: payload.id,
            name: payload.name,
            short_description: payload.short_description,
            long_description: payload.long_description,
            url: payload.url,
            image_url: payload.image_url,
        }
    }
}

impl From<NetworkAuthor> for AuthorEntity {
    fn from(payload: NetworkAuthor) -> Self {
        AuthorEntity {
            id: payload.id,
            name: payload.name,
            image_url: payload.image_url,
            twitter: payload.twitter,
            bio: payload.bio,
        }
    }
}
