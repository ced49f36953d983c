use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Topic};

/// Category of a news resource. Stored values that no longer map to a known
/// category read back as `Unknown` instead of failing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsResourceType {
    Article,
    Video,
    Podcast,
    Event,
    #[serde(other)]
    Unknown,
}

impl NewsResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            NewsResourceType::Article => "article",
            NewsResourceType::Video => "video",
            NewsResourceType::Podcast => "podcast",
            NewsResourceType::Event => "event",
            NewsResourceType::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "article" => NewsResourceType::Article,
            "video" => NewsResourceType::Video,
            "podcast" => NewsResourceType::Podcast,
            "event" => NewsResourceType::Event,
            _ => NewsResourceType::Unknown,
        }
    }
}

/// A news item together with the topics and authors it is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsResource {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub header_image_url: Option<String>,
    pub publish_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NewsResourceType,
    pub topics: Vec<Topic>,
    pub authors: Vec<Author>,
}

#[cfg(test)]
mod tests {
    use super::NewsResourceType;

    #[test]
    fn type_round_trips_known_values() {
        for kind in [
            NewsResourceType::Article,
            NewsResourceType::Video,
            NewsResourceType::Podcast,
            NewsResourceType::Event,
        ] {
            assert_eq!(NewsResourceType::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn unrecognized_type_parses_as_unknown() {
        assert_eq!(
            NewsResourceType::parse("holographic"),
            NewsResourceType::Unknown
        );
    }

    #[test]
    fn unknown_type_deserializes_from_json() {
        let kind: NewsResourceType = serde_json::from_str("\"codelab\"").unwrap();
        assert_eq!(kind, NewsResourceType::Unknown);
    }
}
