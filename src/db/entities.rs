use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Row;

use crate::models::{Author, NewsResource, NewsResourceType, Topic};

/// Stored row for a news resource. `publish_date` is persisted as epoch
/// milliseconds so the descending-order index stays comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsResourceEntity {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub header_image_url: Option<String>,
    pub publish_date: DateTime<Utc>,
    pub kind: NewsResourceType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntity {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub url: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEntity {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub twitter: String,
    pub bio: String,
}

/// Link row tagging a news resource with a topic. Either side may be absent
/// from its entity table; the pair only records the relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsResourceTopicCrossRef {
    pub news_resource_id: String,
    pub topic_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsResourceAuthorCrossRef {
    pub news_resource_id: String,
    pub author_id: String,
}

/// A news resource row decorated with the topics and authors it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedNewsResource {
    pub news_resource: NewsResourceEntity,
    pub topics: Vec<TopicEntity>,
    pub authors: Vec<AuthorEntity>,
}

pub(super) fn news_resource_from_row(row: &Row) -> NewsResourceEntity {
    NewsResourceEntity {
        id: row.get(0).unwrap(),
        title: row.get(1).unwrap(),
        content: row.get(2).unwrap(),
        url: row.get(3).unwrap(),
        header_image_url: row.get(4).unwrap(),
        publish_date: Utc
            .timestamp_millis_opt(row.get(5).unwrap())
            .single()
            .unwrap_or_else(Utc::now),
        kind: NewsResourceType::parse(&row.get::<_, String>(6).unwrap()),
    }
}

pub(super) fn topic_from_row(row: &Row) -> TopicEntity {
    TopicEntity {
        id: row.get(0).unwrap(),
        name: row.get(1).unwrap(),
        short_description: row.get(2).unwrap(),
        long_description: row.get(3).unwrap(),
        url: row.get(4).unwrap(),
        image_url: row.get(5).unwrap(),
    }
}

pub(super) fn author_from_row(row: &Row) -> AuthorEntity {
    AuthorEntity {
        id: row.get(0).unwrap(),
        name: row.get(1).unwrap(),
        image_url: row.get(2).unwrap(),
        twitter: row.get(3).unwrap(),
        bio: row.get(4).unwrap(),
    }
}

impl From<TopicEntity> for Topic {
    fn from(entity: TopicEntity) -> Self {
        Topic {
            id: entity.id,
            name: entity.name,
            short_description: entity.short_description,
            long_description: entity.long_description,
            url: entity.url,
            image_url: entity.image_url,
        }
    }
}

impl From<AuthorEntity> for Author {
    fn from(entity: AuthorEntity) -> Self {
        Author {
            id: entity.id,
            name: entity.name,
            image_url: entity.image_url,
            twitter: entity.twitter,
            bio: entity.bio,
        }
    }
}

impl From<PopulatedNewsResource> for NewsResource {
    fn from(populated: PopulatedNewsResource) -> Self {
        NewsResource {
            id: populated.news_resource.id,
            title: populated.news_resource.title,
            content: populated.news_resource.content,
            url: populated.news_resource.url,
            header_image_url: populated.news_resource.header_image_url,
            publish_date: populated.news_resource.publish_date,
            kind: populated.news_resource.kind,
            topics: populated.topics.into_iter().map(Topic::from).collect(),
            authors: populated.authors.into_iter().map(Author::from).collect(),
        }
    }
}
