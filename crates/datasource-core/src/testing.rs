//! In-memory [`DataSource`] used to exercise hosts and the contract itself.
//!
//! `StaticSource` is seeded with topics and content up front and answers from
//! memory. It counts every call that would have reached the remote service,
//! and it can be switched offline, made to fail, or slowed down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::DataSource;
use crate::types::{DataItem, SearchContext, Topic, TopicId};
use crate::validate;

struct SeededTopic {
    topic: Topic,
    relevance: f64,
    tags: Vec<String>,
    embedding: Option<Vec<f64>>,
}

/// Seeded test double. Unknown topic ids fetch as an empty list, the same as
/// a known topic that has no content.
pub struct StaticSource {
    name: String,
    topics: Vec<SeededTopic>,
    content: HashMap<TopicId, Vec<(DataItem, f64)>>,
    latency: Option<Duration>,
    initialized: bool,
    available: AtomicBool,
    failing: AtomicBool,
    remote_calls: AtomicUsize,
    init_calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topics: Vec::new(),
            content: HashMap::new(),
            latency: None,
            initialized: false,
            available: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            remote_calls: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seed a topic. Higher `relevance` ranks first; equal relevance keeps
    /// seeding order.
    pub fn with_topic(mut self, topic: Topic, relevance: f64) -> Self {
        self.topics.push(SeededTopic { topic, relevance, tags: Vec::new(), embedding: None });
        self
    }

    pub fn with_tagged_topic<I, S>(mut self, topic: Topic, relevance: f64, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags.into_iter().map(|t| Into::<String>::into(t).to_lowercase()).collect();
        self.topics.push(SeededTopic { topic, relevance, tags, embedding: None });
        self
    }

    /// Seed a topic that embedding-only searches can reach.
    pub fn with_embedded_topic(mut self, topic: Topic, relevance: f64, embedding: Vec<f64>) -> Self {
        self.topics.push(SeededTopic { topic, relevance, tags: Vec::new(), embedding: Some(embedding) });
        self
    }

    /// Attach a content item to `topic_id`, ranked by `score` (votes, relevance).
    pub fn with_content(mut self, topic_id: TopicId, item: DataItem, score: f64) -> Self {
        self.content.entry(topic_id).or_default().push((item, score));
        self
    }

    /// Delay every search and fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// While set, searches and fetches fail with [`Error::Transient`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Searches and fetches that got past validation.
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn remote_call(&self) -> Result<()> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Transient(format!("{}: upstream unavailable", self.name)));
        }
        Ok(())
    }

    fn text_matches(seeded: &SeededTopic, terms: &[String], tags: &[String]) -> bool {
        let text = seeded.topic.topic.to_lowercase();
        let site = seeded.topic.site.as_deref().unwrap_or_default().to_lowercase();
        terms.iter().any(|t| text.contains(t.as_str()) || (!site.is_empty() && site == *t))
            || tags.iter().any(|t| seeded.tags.contains(t))
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a * norm_b) }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn initialize(&mut self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.name.trim().is_empty() {
            return Err(Error::Initialization("name is required".to_string()));
        }
        self.initialized = true;
        debug!(source = %self.name, topics = self.topics.len(), "static source initialized");
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn search_topics(&self, count: usize, context: &SearchContext) -> Result<Vec<Topic>> {
        validate::search_context(context)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        if let Some(query) = context.embedding_vector() {
            for embedding in self.topics.iter().filter_map(|t| t.embedding.as_ref()) {
                validate::embedding_dimension(query, embedding.len())?;
            }
        }
        self.remote_call().await?;

        let scored: Vec<(Topic, f64)> = if context.has_query_text() {
            let terms: Vec<String> = context.question_text.split_whitespace().map(str::to_lowercase).collect();
            let tags: Vec<String> = context.tags.iter().map(|t| t.to_lowercase()).collect();
            self.topics
                .iter()
                .filter(|t| Self::text_matches(t, &terms, &tags))
                .map(|t| (t.topic.clone(), t.relevance))
                .collect()
        } else {
            // Embedding-only query: rank by similarity instead of seeded relevance.
            let query = context.embedding_vector().unwrap_or_default();
            self.topics
                .iter()
                .filter_map(|t| t.embedding.as_ref().map(|e| (t.topic.clone(), cosine_similarity(query, e))))
                .collect()
        };
        debug!(source = %self.name, count, matched = scored.len(), "static search");
        Ok(validate::rank(scored, count))
    }

    async fn fetch_content(&self, count: usize, topic_id: TopicId) -> Result<Vec<DataItem>> {
        validate::topic_id(topic_id)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        self.remote_call().await?;
        let items = self.content.get(&topic_id).cloned().unwrap_or_default();
        Ok(validate::rank(items, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_parallel_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn blank_name_fails_initialization() {
        let mut source = StaticSource::new("  ");
        let err = source.initialize().await.unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
        assert!(!source.is_initialized());
        assert_eq!(source.init_calls(), 1);
    }

    #[tokio::test]
    async fn every_seeded_embedding_must_match_query_dimension() {
        let mut source = StaticSource::new("vectors")
            .with_embedded_topic(Topic::new("a", "https://v.example/a", 1), 0.5, vec![1.0, 0.0])
            .with_embedded_topic(Topic::new("b", "https://v.example/b", 2), 0.5, vec![1.0, 0.0, 0.0]);
        source.initialize().await.expect("init");
        assert_eq!(source.name(), "vectors");

        let ctx = SearchContext::new("").with_embedding(vec![1.0, 0.0]);
        let err = source.search_topics(5, &ctx).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(source.remote_calls(), 0);
    }
}
