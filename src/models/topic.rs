use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub url: String,
    pub image_url: String,
}
