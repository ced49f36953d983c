use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;

use newsstand::db::{LocalStore, NewsResourceQuery};
use newsstand::models::NewsResource;
use newsstand::network::FakeNewsNetworkDataSource;
use newsstand::repository::{
    AuthorsRepository, InMemorySynchronizer, NewsRepository, OfflineFirstAuthorsRepository,
    OfflineFirstNewsRepository, OfflineFirstTopicsRepository, TopicsRepository,
};
use newsstand::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let follow = args.iter().any(|arg| arg == "--follow");

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    let store = LocalStore::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open store at {}", config.db_path))?;

    // The demo ships against the hardcoded data source; a real build swaps in
    // a backend client behind the same trait.
    let source = Arc::new(
        FakeNewsNetworkDataSource::new().context("failed to load embedded demo data")?,
    );
    let news = OfflineFirstNewsRepository::new(store.clone(), source.clone());
    let topics = OfflineFirstTopicsRepository::new(store.clone(), source.clone());
    let authors = OfflineFirstAuthorsRepository::new(store.clone(), source);

    if config.sync_on_start {
        let synchronizer = InMemorySynchronizer::new();
        let synced = topics.sync_with(&synchronizer).await
            && authors.sync_with(&synchronizer).await
            && news.sync_with(&synchronizer).await;
        if !synced {
            eprintln!("Sync failed; showing cached content");
        }
    }

    let query = NewsResourceQuery {
        filter_topic_ids: config.default_topic_filter.iter().cloned().collect(),
        ..Default::default()
    };
    let mut snapshots = news.news_resources(query);

    if follow {
        while let Some(snapshot) = snapshots.next().await {
            print_headlines(&snapshot, config.headline_limit);
            println!("--");
        }
    } else if let Some(snapshot) = snapshots.next().await {
        print_headlines(&snapshot, config.headline_limit);
    }

    Ok(())
}

fn print_headlines(resources: &[NewsResource], limit: usize) {
    for resource in resources.iter().take(limit) {
        let topics: Vec<&str> = resource.topics.iter().map(|t| t.name.as_str()).collect();
        let authors: Vec<&str> = resource.authors.iter().map(|a| a.name.as_str()).collect();
        println!(
            "{}  {}  [{}] by {}",
            resource.publish_date.format("%Y-%m-%d"),
            resource.title,
            topics.join(", "),
            authors.join(", "),
        );
    }
}
