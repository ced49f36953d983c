mod fake;
mod offline_first;

pub use fake::{FakeAuthorsRepository, FakeNewsRepository, FakeTopicsRepository};
pub use offline_first::{
    OfflineFirstAuthorsRepository, OfflineFirstNewsRepository, OfflineFirstTopicsRepository,
};

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::db::NewsResourceQuery;
use crate::models::{Author, NewsResource, Topic};

/// Collections whose change-list versions are tracked across syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncKind {
    Topics,
    Authors,
    NewsResources,
}

/// Change-list bookkeeping that outlives individual sync runs. A collection's
/// version moves forward only after its rows have committed.
pub trait Synchronizer: Send + Sync {
    fn change_list_version(&self, kind: SyncKind) -> i64;

    fn update_change_list_version(&self, kind: SyncKind, version: i64);
}

/// In-process synchronizer for the demo binary and tests. Unknown collections
/// start at version 0.
#[derive(Debug, Default)]
pub struct InMemorySynchronizer {
    versions: Mutex<BTreeMap<SyncKind, i64>>,
}

impl InMemorySynchronizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Synchronizer for InMemorySynchronizer {
    fn change_list_version(&self, kind: SyncKind) -> i64 {
        self.versions.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }

    fn update_change_list_version(&self, kind: SyncKind, version: i64) {
        self.versions.lock().unwrap().insert(kind, version);
    }
}

/// Reactive read API over the news resource cache.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Live snapshots of the resources matching `query`, newest first.
    fn news_resources(&self, query: NewsResourceQuery) -> BoxStream<'static, Vec<NewsResource>>;

    /// Reconciles the backend into the local cache. Returns `false` on
    /// failure; rows committed before the failure stay in place and the
    /// caller should retry later.
    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool;
}

#[async_trait]
pub trait TopicsRepository: Send + Sync {
    fn topics(&self) -> BoxStream<'static, Vec<Topic>>;

    /// Live view of one topic. While no topic with this id exists the stream
    /// emits nothing.
    fn topic(&self, id: &str) -> BoxStream<'static, Topic>;

    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool;
}

#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    fn authors(&self) -> BoxStream<'static, Vec<Author>>;

    /// Live view of one author. While no author with this id exists the
    /// stream emits nothing.
    fn author(&self, id: &str) -> BoxStream<'static, Author>;

    async fn sync_with(&self, synchronizer: &dyn Synchronizer) -> bool;
}
