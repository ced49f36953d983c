use std::time::Duration;

use chrono::{TimeZone, Utc};
use futures::StreamExt;
use tokio::time::timeout;

use newsstand::db::{
    LocalStore, NewsResourceEntity, NewsResourceQuery, NewsResourceTopicCrossRef, TopicEntity,
};
use newsstand::models::NewsResourceType;

const NO_EMISSION: Duration = Duration::from_millis(100);

fn news(id: &str, publish_millis: i64) -> NewsResourceEntity {
    NewsResourceEntity {
        id: id.to_string(),
        title: format!("Title {id}"),
        content: String::new(),
        url: String::new(),
        header_image_url: None,
        publish_date: Utc.timestamp_millis_opt(publish_millis).unwrap(),
        kind: NewsResourceType::Article,
    }
}

fn topic(id: &str) -> TopicEntity {
    TopicEntity {
        id: id.to_string(),
        name: format!("Topic {id}"),
        short_description: String::new(),
        long_description: String::new(),
        url: String::new(),
        image_url: String::new(),
    }
}

fn topic_ref(news_id: &str, topic_id: &str) -> NewsResourceTopicCrossRef {
    NewsResourceTopicCrossRef {
        news_resource_id: news_id.to_string(),
        topic_id: topic_id.to_string(),
    }
}

#[tokio::test]
async fn subscription_emits_the_current_snapshot_immediately() {
    let store = LocalStore::open_in_memory().await.unwrap();
    store
        .upsert_news_resources(vec![news("r0", 0), news("r1", 1)])
        .await
        .unwrap();

    let mut snapshots = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    let first = snapshots.next().await.unwrap();
    assert_eq!(
        first
            .iter()
            .map(|p| p.news_resource.id.as_str())
            .collect::<Vec<_>>(),
        ["r1", "r0"]
    );
}

#[tokio::test]
async fn mutations_push_fresh_snapshots_to_subscribers() {
    let store = LocalStore::open_in_memory().await.unwrap();

    let mut snapshots = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    assert!(snapshots.next().await.unwrap().is_empty());

    store
        .upsert_news_resources(vec![news("r0", 0)])
        .await
        .unwrap();
    let after_upsert = snapshots.next().await.unwrap();
    assert_eq!(after_upsert.len(), 1);

    store
        .delete_news_resources(vec!["r0".to_string()])
        .await
        .unwrap();
    let after_delete = snapshots.next().await.unwrap();
    assert!(after_delete.is_empty());
}

#[tokio::test]
async fn mutations_outside_the_filter_do_not_emit() {
    let store = LocalStore::open_in_memory().await.unwrap();
    store.upsert_topics(vec![topic("t1")]).await.unwrap();
    store
        .upsert_news_resources(vec![news("r0", 0)])
        .await
        .unwrap();
    store
        .insert_or_ignore_topic_cross_refs(vec![topic_ref("r0", "t1")])
        .await
        .unwrap();

    let query = NewsResourceQuery {
        filter_topic_ids: ["t1".to_string()].into(),
        ..Default::default()
    };
    let mut snapshots = Box::pin(store.watch_news_resources(query));
    assert_eq!(snapshots.next().await.unwrap().len(), 1);

    // An untagged resource bumps the data version but leaves this query's
    // result unchanged, so the equal snapshot is suppressed.
    store
        .upsert_news_resources(vec![news("unrelated", 99)])
        .await
        .unwrap();
    assert!(timeout(NO_EMISSION, snapshots.next()).await.is_err());

    // A tagged resource must come through.
    store
        .upsert_news_resources(vec![news("r1", 50)])
        .await
        .unwrap();
    store
        .insert_or_ignore_topic_cross_refs(vec![topic_ref("r1", "t1")])
        .await
        .unwrap();
    let snapshot = snapshots.next().await.unwrap();
    assert_eq!(
        snapshot
            .iter()
            .map(|p| p.news_resource.id.as_str())
            .collect::<Vec<_>>(),
        ["r1", "r0"]
    );
}

#[tokio::test]
async fn each_emission_is_a_complete_ordered_snapshot() {
    let store = LocalStore::open_in_memory().await.unwrap();
    store
        .upsert_news_resources(vec![news("r0", 5)])
        .await
        .unwrap();

    let mut snapshots = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    snapshots.next().await.unwrap();

    // An older row must still appear, behind the newer one.
    store
        .upsert_news_resources(vec![news("r1", 1)])
        .await
        .unwrap();
    let snapshot = snapshots.next().await.unwrap();
    assert_eq!(
        snapshot
            .iter()
            .map(|p| p.news_resource.id.as_str())
            .collect::<Vec<_>>(),
        ["r0", "r1"]
    );
}

#[tokio::test]
async fn dropping_a_subscription_does_not_block_writers() {
    let store = LocalStore::open_in_memory().await.unwrap();

    let mut snapshots = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    snapshots.next().await.unwrap();
    drop(snapshots);

    store
        .upsert_news_resources(vec![news("r0", 0)])
        .await
        .unwrap();
    store
        .delete_news_resources(vec!["r0".to_string()])
        .await
        .unwrap();

    // A fresh subscription still works.
    let mut snapshots = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    assert!(snapshots.next().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_subscriptions_see_the_same_writes() {
    let store = LocalStore::open_in_memory().await.unwrap();

    let mut all = Box::pin(store.watch_news_resources(NewsResourceQuery::default()));
    let mut topics = Box::pin(store.watch_topics());
    assert!(all.next().await.unwrap().is_empty());
    assert!(topics.next().await.unwrap().is_empty());

    store.upsert_topics(vec![topic("t1")]).await.unwrap();
    store
        .upsert_news_resources(vec![news("r0", 0)])
        .await
        .unwrap();

    assert_eq!(topics.next().await.unwrap().len(), 1);
    assert_eq!(all.next().await.unwrap().len(), 1);
}
