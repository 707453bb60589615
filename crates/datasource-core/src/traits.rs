use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DataItem, SearchContext, Topic, TopicId};

/// An external content provider (Stack Exchange, Wikipedia, a custom
/// knowledge base) the host can search.
///
/// The host calls [`initialize`](DataSource::initialize) exactly once and only
/// shares the instance after it succeeded. The remaining methods take `&self`
/// and may run concurrently with each other. Implementations own their
/// transport, rate limiting and timeouts.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// One-time setup: load configuration, warm caches, open connections.
    ///
    /// An error marks the instance unusable.
    async fn initialize(&mut self) -> Result<()>;

    /// Cheap, read-only liveness check; should answer within a few seconds.
    /// An unreachable dependency is `false`, never an error.
    async fn check_availability(&self) -> bool;

    /// Search for at most `count` topics, most relevant first.
    ///
    /// Blank question text without an embedding is rejected with
    /// [`Error::Validation`](crate::Error::Validation) before any remote call.
    /// No matches is `Ok(vec![])`.
    async fn search_topics(&self, count: usize, context: &SearchContext) -> Result<Vec<Topic>>;

    /// Fetch at most `count` content items for `topic_id`, ranked by
    /// relevance or votes.
    ///
    /// Non-positive ids are rejected before any remote call. A topic without
    /// content is `Ok(vec![])`.
    async fn fetch_content(&self, count: usize, topic_id: TopicId) -> Result<Vec<DataItem>>;
}
