mod authors;
mod entities;
mod live;
mod news;
mod schema;
mod topics;

pub use entities::{
    AuthorEntity, NewsResourceAuthorCrossRef, NewsResourceEntity, NewsResourceTopicCrossRef,
    PopulatedNewsResource, TopicEntity,
};
pub use news::NewsResourceQuery;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_rusqlite::Connection;

use crate::error::Result;

use schema::SCHEMA;

/// Handle to the local relational cache. Cheap to clone; all clones share one
/// background connection thread and one data-version channel, so batch writes
/// are serialized and a reader never observes a half-written batch.
#[derive(Clone)]
pub struct LocalStore {
    conn: Connection,
    data_version: Arc<watch::Sender<u64>>,
}

impl LocalStore {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    /// In-memory store for tests and throwaway demo runs.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let (data_version, _) = watch::channel(0u64);

        Ok(Self {
            conn,
            data_version: Arc::new(data_version),
        })
    }

    /// Bumps the data version exactly once per committed mutation, waking
    /// every live subscription.
    pub(crate) fn mark_changed(&self) {
        self.data_version.send_modify(|version| *version += 1);
    }

    pub(crate) fn watch_data_version(&self) -> watch::Receiver<u64> {
        self.data_version.subscribe()
    }
}
