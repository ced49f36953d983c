mod author;
mod news_resource;
mod topic;

pub use author::Author;
pub use news_resource::{NewsResource, NewsResourceType};
pub use topic::Topic;
