use std::collections::{BTreeMap, BTreeSet};

use futures::stream::Stream;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::error::Result;

use super::entities::{
    author_from_row, news_resource_from_row, topic_from_row, AuthorEntity,
    NewsResourceAuthorCrossRef, NewsResourceEntity, NewsResourceTopicCrossRef,
    PopulatedNewsResource, TopicEntity,
};
use super::LocalStore;

/// Filter for news resource reads. Empty sets place no restriction; when both
/// sets are non-empty, a resource matching either one is included once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsResourceQuery {
    pub filter_topic_ids: BTreeSet<String>,
    pub filter_author_ids: BTreeSet<String>,
}

impl LocalStore {
    // News resource queries

    /// One-shot snapshot of the news resources matching `query`, each
    /// decorated with its linked topics and authors, ordered by publish date
    /// descending with ties broken by id ascending.
    pub async fn news_resources(
        &self,
        query: &NewsResourceQuery,
    ) -> Result<Vec<PopulatedNewsResource>> {
        let query = query.clone();
        let populated = self
            .conn
            .call(move |conn| {
                let resources = select_news_resources(conn, &query)?;
                Ok(populate(conn, resources)?)
            })
            .await?;
        Ok(populated)
    }

    /// Live view of [`LocalStore::news_resources`]: emits the current snapshot
    /// immediately, then a fresh snapshot after every mutation that changes
    /// the result. Dropping the stream cancels the subscription.
    pub fn watch_news_resources(
        &self,
        query: NewsResourceQuery,
    ) -> impl Stream<Item = Vec<PopulatedNewsResource>> + Send + 'static {
        let store = self.clone();
        super::live::watch_snapshots(self.watch_data_version(), move || {
            let store = store.clone();
            let query = query.clone();
            async move { store.news_resources(&query).await }
        })
    }

    // News resource mutations

    /// Inserts each row, fully replacing any existing row with the same id.
    pub async fn upsert_news_resources(&self, resources: Vec<NewsResourceEntity>) -> Result<()> {
        if resources.is_empty() {
            return Ok(());
        }
        let count = resources.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for resource in &resources {
                    tx.execute(
                        r#"INSERT INTO news_resources (id, title, content, url, header_image_url, publish_date, type)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                           ON CONFLICT(id) DO UPDATE SET
                               title = excluded.title,
                               content = excluded.content,
                               url = excluded.url,
                               header_image_url = excluded.header_image_url,
                               publish_date = excluded.publish_date,
                               type = excluded.type"#,
                        params![
                            resource.id,
                            resource.title,
                            resource.content,
                            resource.url,
                            resource.header_image_url,
                            resource.publish_date.timestamp_millis(),
                            resource.kind.as_str(),
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        tracing::debug!("Upserted {} news resources", count);
        self.mark_changed();
        Ok(())
    }

    /// Records topic links; pairs that already exist are silently skipped.
    pub async fn insert_or_ignore_topic_cross_refs(
        &self,
        cross_refs: Vec<NewsResourceTopicCrossRef>,
    ) -> Result<()> {
        if cross_refs.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for cross_ref in &cross_refs {
                    tx.execute(
                        "INSERT OR IGNORE INTO news_resources_topics (news_resource_id, topic_id) VALUES (?1, ?2)",
                        params![cross_ref.news_resource_id, cross_ref.topic_id],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        self.mark_changed();
        Ok(())
    }

    /// Records author links; pairs that already exist are silently skipped.
    pub async fn insert_or_ignore_author_cross_refs(
        &self,
        cross_refs: Vec<NewsResourceAuthorCrossRef>,
    ) -> Result<()> {
        if cross_refs.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for cross_ref in &cross_refs {
                    tx.execute(
                        "INSERT OR IGNORE INTO news_resources_authors (news_resource_id, author_id) VALUES (?1, ?2)",
                        params![cross_ref.news_resource_id, cross_ref.author_id],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        self.mark_changed();
        Ok(())
    }

    /// Deletes the rows whose id is in `ids`. Absent ids are ignored, and
    /// cross-reference rows pointing at deleted ids are left in place.
    pub async fn delete_news_resources(&self, ids: Vec<String>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let deleted = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "DELETE FROM news_resources WHERE id IN ({})",
                    placeholders(ids.len())
                );
                Ok(conn.execute(&sql, params_from_iter(ids.iter()))?)
            })
            .await?;
        tracing::debug!("Deleted {} news resources", deleted);
        self.mark_changed();
        Ok(())
    }
}

fn select_news_resources(
    conn: &Connection,
    query: &NewsResourceQuery,
) -> rusqlite::Result<Vec<NewsResourceEntity>> {
    let mut sql = String::from(
        "SELECT id, title, content, url, header_image_url, publish_date, type FROM news_resources",
    );
    let mut criteria = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if !query.filter_topic_ids.is_empty() {
        criteria.push(format!(
            "EXISTS (SELECT 1 FROM news_resources_topics \
             WHERE news_resource_id = news_resources.id AND topic_id IN ({}))",
            placeholders(query.filter_topic_ids.len())
        ));
        bind_values.extend(query.filter_topic_ids.iter().cloned().map(Value::Text));
    }

    if !query.filter_author_ids.is_empty() {
        criteria.push(format!(
            "EXISTS (SELECT 1 FROM news_resources_authors \
             WHERE news_resource_id = news_resources.id AND author_id IN ({}))",
            placeholders(query.filter_author_ids.len())
        ));
        bind_values.extend(query.filter_author_ids.iter().cloned().map(Value::Text));
    }

    // Criteria are ORed: with both filters set, the result is the union of
    // the topic matches and the author matches, never the intersection.
    if !criteria.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&criteria.join(" OR "));
    }
    sql.push_str(" ORDER BY publish_date DESC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let resources = stmt
        .query_map(params_from_iter(bind_values), |row| {
            Ok(news_resource_from_row(row))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(resources)
}

fn populate(
    conn: &Connection,
    resources: Vec<NewsResourceEntity>,
) -> rusqlite::Result<Vec<PopulatedNewsResource>> {
    let ids: Vec<String> = resources.iter().map(|r| r.id.clone()).collect();
    let mut topics = load_topics_by_news_id(conn, &ids)?;
    let mut authors = load_authors_by_news_id(conn, &ids)?;

    Ok(resources
        .into_iter()
        .map(|news_resource| PopulatedNewsResource {
            topics: topics.remove(&news_resource.id).unwrap_or_default(),
            authors: authors.remove(&news_resource.id).unwrap_or_default(),
            news_resource,
        })
        .collect())
}

fn load_topics_by_news_id(
    conn: &Connection,
    news_ids: &[String],
) -> rusqlite::Result<BTreeMap<String, Vec<TopicEntity>>> {
    let mut by_news_id: BTreeMap<String, Vec<TopicEntity>> = BTreeMap::new();
    if news_ids.is_empty() {
        return Ok(by_news_id);
    }

    // Links to topic ids with no stored topic row drop out of the join.
    let sql = format!(
        "SELECT t.id, t.name, t.short_description, t.long_description, t.url, t.image_url, x.news_resource_id \
         FROM news_resources_topics x \
         JOIN topics t ON t.id = x.topic_id \
         WHERE x.news_resource_id IN ({}) \
         ORDER BY t.id",
        placeholders(news_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(news_ids.iter()))?;
    while let Some(row) = rows.next()? {
        let news_id: String = row.get(6)?;
        by_news_id.entry(news_id).or_default().push(topic_from_row(row));
    }
    Ok(by_news_id)
}

fn load_authors_by_news_id(
    conn: &Connection,
    news_ids: &[String],
) -> rusqlite::Result<BTreeMap<String, Vec<AuthorEntity>>> {
    let mut by_news_id: BTreeMap<String, Vec<AuthorEntity>> = BTreeMap::new();
    if news_ids.is_empty() {
        return Ok(by_news_id);
    }

    let sql = format!(
        "SELECT a.id, a.name, a.image_url, a.twitter, a.bio, x.news_resource_id \
         FROM news_resources_authors x \
         JOIN authors a ON a.id = x.author_id \
         WHERE x.news_resource_id IN ({}) \
         ORDER BY a.id",
        placeholders(news_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(news_ids.iter()))?;
    while let Some(row) = rows.next()? {
        let news_id: String = row.get(5)?;
        by_news_id.entry(news_id).or_default().push(author_from_row(row));
    }
    Ok(by_news_id)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
