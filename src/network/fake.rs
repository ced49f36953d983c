use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};

use super::{NetworkAuthor, NetworkNewsResource, NetworkTopic, NewsNetworkDataSource};

// Demo payloads baked into the binary so offline builds ship with content.
const FAKE_DATA: &str = include_str!("fake_data.json");

#[derive(Debug, Deserialize)]
struct FakeData {
    change_list_version: i64,
    topics: Vec<NetworkTopic>,
    authors: Vec<NetworkAuthor>,
    news_resources: Vec<NetworkNewsResource>,
}

/// Hardcoded data source for offline/demo builds. The embedded JSON document
/// is parsed once at construction; reads never touch the network.
pub struct FakeNewsNetworkDataSource {
    data: FakeData,
    failing: AtomicBool,
}

impl FakeNewsNetworkDataSource {
    pub fn new() -> Result<Self> {
        let data: FakeData = serde_json::from_str(FAKE_DATA)?;
        Ok(Self {
            data,
            failing: AtomicBool::new(false),
        })
    }

    /// Makes every call fail until reset, so callers can exercise the
    /// sync failure path.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Network(
                "fake data source set to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NewsNetworkDataSource for FakeNewsNetworkDataSource {
    async fn topics(&self) -> Result<Vec<NetworkTopic>> {
        self.check_available()?;
        Ok(self.data.topics.clone())
    }

    async fn authors(&self) -> Result<Vec<NetworkAuthor>> {
        self.check_available()?;
        Ok(self.data.authors.clone())
    }

    async fn news_resources(&self) -> Result<Vec<NetworkNewsResource>> {
        self.check_available()?;
        Ok(self.data.news_resources.clone())
    }

    async fn latest_change_list_version(&self) -> Result<i64> {
        self.check_available()?;
        Ok(self.data.change_list_version)
    }
}

#[cfg(test)]
mod tests {
    use super::{FakeNewsNetworkDataSource, NewsNetworkDataSource};

    #[test]
    fn embedded_data_parses_and_links_resolve() {
        tokio_test::block_on(async {
            let source = FakeNewsNetworkDataSource::new().unwrap();
            let topics = source.topics().await.unwrap();
            let authors = source.authors().await.unwrap();
            let news = source.news_resources().await.unwrap();

            assert!(!topics.is_empty());
            assert!(!authors.is_empty());
            assert!(!news.is_empty());

            // Every id list entry must point at a payload that exists.
            for resource in &news {
                for topic_id in &resource.topics {
                    assert!(topics.iter().any(|t| &t.id == topic_id));
                }
                for author_id in &resource.authors {
                    assert!(authors.iter().any(|a| &a.id == author_id));
                }
            }
        });
    }

    #[test]
    fn failure_toggle_fails_every_read() {
        tokio_test::block_on(async {
            let source = FakeNewsNetworkDataSource::new().unwrap();
            source.set_failing(true);
            assert!(source.topics().await.is_err());
            assert!(source.latest_change_list_version().await.is_err());

            source.set_failing(false);
            assert!(source.topics().await.is_ok());
        });
    }
}
