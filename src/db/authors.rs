use futures::stream::Stream;
use rusqlite::{params, OptionalExtension};

use crate::error::Result;

use super::entities::{author_from_row, AuthorEntity};
use super::LocalStore;

impl LocalStore {
    // Author queries

    pub async fn authors(&self) -> Result<Vec<AuthorEntity>> {
        let authors = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, image_url, twitter, bio FROM authors ORDER BY name, id",
                )?;
                let authors = stmt
                    .query_map([], |row| Ok(author_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(authors)
            })
            .await?;
        Ok(authors)
    }

    pub async fn author(&self, id: &str) -> Result<Option<AuthorEntity>> {
        let id = id.to_string();
        let author = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, image_url, twitter, bio FROM authors WHERE id = ?1",
                )?;
                let author = stmt
                    .query_row(params![id], |row| Ok(author_from_row(row)))
                    .optional()?;
                Ok(author)
            })
            .await?;
        Ok(author)
    }

    pub fn watch_authors(&self) -> impl Stream<Item = Vec<AuthorEntity>> + Send + 'static {
        let store = self.clone();
        super::live::watch_snapshots(self.watch_data_version(), move || {
            let store = store.clone();
            async move { store.authors().await }
        })
    }

    /// Live view of a single author; emits `None` snapshots while the id is
    /// absent.
    pub fn watch_author(
        &self,
        id: String,
    ) -> impl Stream<Item = Option<AuthorEntity>> + Send + 'static {
        let store = self.clone();
        super::live::watch_snapshots(self.watch_data_version(), move || {
            let store = store.clone();
            let id = id.clone();
            async move { store.author(&id).await }
        })
    }

    // Author mutations

    /// Inserts each row, fully replacing any existing row with the same id.
    pub async fn upsert_authors(&self, authors: Vec<AuthorEntity>) -> Result<()> {
        if authors.is_empty() {
            return Ok(());
        }
        let count = authors.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for author in &authors {
                    tx.execute(
                        r#"INSERT INTO authors (id, name, image_url, twitter, bio)
                           VALUES (?1, ?2, ?3, ?4, ?5)
                           ON CONFLICT(id) DO UPDATE SET
                               name = excluded.name,
                               image_url = excluded.image_url,
                               twitter = excluded.twitter,
                               bio = excluded.bio"#,
                        params![
                            author.id,
                            author.name,
                            author.image_url,
                            author.twitter,
                            author.bio,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        tracing::debug!("Upserted {} authors", count);
        self.mark_changed();
        Ok(())
    }

    /// Inserts each row unless one with the same id already exists; existing
    /// rows keep their current field values.
    pub async fn insert_or_ignore_authors(&self, authors: Vec<AuthorEntity>) -> Result<()> {
        if authors.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for author in &authors {
                    tx.execute(
                        "INSERT OR IGNORE INTO authors (id, name, image_url, twitter, bio)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            author.id,
                            author.name,
                            author.image_url,
                            author.twitter,
                            author.bio,
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
