pub const SCHEMA: &str = r#"
-- news_resources table
CREATE TABLE IF NOT EXISTS news_resources (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    url TEXT NOT NULL,
    header_image_url TEXT,
    publish_date INTEGER NOT NULL,
    type TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_news_resources_publish_date ON news_resources(publish_date DESC);

-- topics table
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    short_description TEXT NOT NULL,
    long_description TEXT NOT NULL,
    url TEXT NOT NULL,
    image_url TEXT NOT NULL
);

-- authors table
CREATE TABLE IF NOT EXISTS authors (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    image_url TEXT NOT NULL,
    twitter TEXT NOT NULL,
    bio TEXT NOT NULL
);

-- news_resources_topics table (tag links; no foreign keys, rows may reference
-- ids that are not stored yet, and deleting a news resource leaves its links in place)
CREATE TABLE IF NOT EXISTS news_resources_topics (
    news_resource_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    PRIMARY KEY (news_resource_id, topic_id)
);

CREATE INDEX IF NOT EXISTS idx_news_resources_topics_topic_id ON news_resources_topics(topic_id);

-- news_resources_authors table (byline links, same lifecycle as topic links)
CREATE TABLE IF NOT EXISTS news_resources_authors (
    news_resource_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    PRIMARY KEY (news_resource_id, author_id)
);

CREATE INDEX IF NOT EXISTS idx_news_resources_authors_author_id ON news_resources_authors(author_id);
"#;
