use futures::stream::Stream;
use rusqlite::{params, OptionalExtension};

use crate::error::Result;

use super::entities::{topic_from_row, TopicEntity};
use super::LocalStore;

impl LocalStore {
    // Topic queries

    pub async fn topics(&self) -> Result<Vec<TopicEntity>> {
        let topics = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, short_description, long_description, url, image_url FROM topics ORDER BY name, id",
                )?;
                let topics = stmt
                    .query_map([], |row| Ok(topic_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(topics)
            })
            .await?;
        Ok(topics)
    }

    pub async fn topic(&self, id: &str) -> Result<Option<TopicEntity>> {
        let id = id.to_string();
        let topic = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, short_description, long_description, url, image_url FROM topics WHERE id = ?1",
                )?;
                let topic = stmt
                    .query_row(params![id], |row| Ok(topic_from_row(row)))
                    .optional()?;
                Ok(topic)
            })
            .await?;
        Ok(topic)
    }

    pub fn watch_topics(&self) -> impl Stream<Item = Vec<TopicEntity>> + Send + 'static {
        let store = self.clone();
        super::live::watch_snapshots(self.watch_data_version(), move || {
            let store = store.clone();
            async move { store.topics().await }
        })
    }

    /// Live view of a single topic; emits `None` snapshots while the id is
    /// absent.
    pub fn watch_topic(
        &self,
        id: String,
    ) -> impl Stream<Item = Option<TopicEntity>> + Send + 'static {
        let store = self.clone();
        super::live::watch_snapshots(self.watch_data_version(), move || {
            let store = store.clone();
            let id = id.clone();
            async move { store.topic(&id).await }
        })
    }

    // Topic mutations

    /// Inserts each row, fully replacing any existing row with the same id.
    pub async fn upsert_topics(&self, topics: Vec<TopicEntity>) -> Result<()> {
        if topics.is_empty() {
            return Ok(());
        }
        let count = topics.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for topic in &topics {
                    tx.execute(
                        r#"INSERT INTO topics (id, name, short_description, long_description, url, image_url)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                           ON CONFLICT(id) DO UPDATE SET
                               name = excluded.name,
                               short_description = excluded.short_description,
                               long_description = excluded.long_description,
                               url = excluded.url,
                               image_url = excluded.image_url"#,
                        params![
                            topic.id,
                            topic.name,
                            topic.short_description,
                            topic.long_description,
                            topic.url,
                            topic.image_url,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        tracing::debug!("Upserted {} topics", count);
        self.mark_changed();
        Ok(())
    }

    /// Inserts each row unless one with the same id already exists; existing
    /// rows keep their current field values.
    pub async fn insert_or_ignore_topics(&self, topics: Vec<TopicEntity>) -> Result<()> {
        if topics.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for topic in &topics {
                    tx.execute(
                        "INSERT OR IGNORE INTO topics (id, name, short_description, long_description, url, image_url)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            topic.id,
                            topic.name,
                            topic.short_description,
                            topic.long_description,
                            topic.url,
                            topic.image_url,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        self.mark_changed();
        Ok(())
    }
}
