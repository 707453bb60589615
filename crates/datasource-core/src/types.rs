//! Records exchanged across the [`DataSource`](crate::DataSource) boundary.
//!
//! All of them are plain owned values. The serde tags are the interchange
//! names hosts use when they ship these records to a UI or another service.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a [`Topic`] inside its originating source.
pub type TopicId = i64;

/// Identifier of a [`DataItem`] inside its originating source.
pub type ItemId = i64;

/// A discoverable item (question, article, video) returned by a search.
///
/// - `topic`: display text, usually the title
/// - `source_url`: canonical URL where the topic can be viewed
/// - `site`: sub-site label for multi-site sources (e.g. "serverfault")
/// - `topic_id`: stable id, the only key used to fetch associated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "site_is_blank", deserialize_with = "blank_as_none")]
    pub site: Option<String>,
    pub topic_id: TopicId,
}

impl Topic {
    pub fn new(topic: impl Into<String>, source_url: impl Into<String>, topic_id: TopicId) -> Self {
        Self { topic: topic.into(), source_url: source_url.into(), site: None, topic_id }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = non_blank(site.into());
        self
    }
}

/// A unit of content tied to one [`Topic`]: an answer, an excerpt, a
/// transcript segment. `data_text` may carry HTML or markdown.
///
/// `item_id` travels as `answer_id` on the wire; the name is historical and
/// covers any kind of content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub data_text: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "site_is_blank", deserialize_with = "blank_as_none")]
    pub site: Option<String>,
    #[serde(rename = "answer_id")]
    pub item_id: ItemId,
}

impl DataItem {
    pub fn new(data_text: impl Into<String>, source_url: impl Into<String>, item_id: ItemId) -> Self {
        Self { data_text: data_text.into(), source_url: source_url.into(), site: None, item_id }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = non_blank(site.into());
        self
    }
}

/// Query descriptor handed to [`DataSource::search_topics`](crate::DataSource::search_topics).
///
/// `asked_by` is `None` for anonymous queries. `embedding` is a precomputed
/// vector in whatever space the source expects; when it is absent or empty
/// the source falls back to text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchContext {
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f64>>,
}

impl SearchContext {
    pub fn new(question_text: impl Into<String>) -> Self {
        Self { question_text: question_text.into(), ..Self::default() }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_asker(mut self, user_id: i64) -> Self {
        self.asked_by = Some(user_id);
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn has_query_text(&self) -> bool {
        !self.question_text.trim().is_empty()
    }

    /// The embedding if one was supplied and it is non-empty.
    pub fn embedding_vector(&self) -> Option<&[f64]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        self.asked_by.is_none()
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn site_is_blank(site: &Option<String>) -> bool {
    site.as_deref().map_or(true, str::is_empty)
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let site = Option::<String>::deserialize(deserializer)?;
    Ok(site.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_site_is_stored_as_none() {
        let topic = Topic::new("t", "https://example.com/t/1", 1).with_site("");
        assert_eq!(topic.site, None);
        let item = DataItem::new("d", "https://example.com/t/1#a", 7).with_site("serverfault");
        assert_eq!(item.site.as_deref(), Some("serverfault"));
    }

    #[test]
    fn empty_embedding_counts_as_absent() {
        let ctx = SearchContext::new("q").with_embedding(vec![]);
        assert!(ctx.embedding_vector().is_none());
        let ctx = SearchContext::new("q").with_embedding(vec![0.5, 0.5]);
        assert_eq!(ctx.embedding_vector(), Some(&[0.5, 0.5][..]));
    }

    #[test]
    fn whitespace_question_has_no_query_text() {
        assert!(!SearchContext::new(" \t\n").has_query_text());
        assert!(SearchContext::new("why").is_anonymous());
        assert!(!SearchContext::new("why").with_asker(42).is_anonymous());
    }
}
