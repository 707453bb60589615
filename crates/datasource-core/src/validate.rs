//! Precondition checks and ordering shared by `DataSource` implementations.
//!
//! Call the checks at the top of `search_topics` / `fetch_content` so bad
//! input fails fast, before a request leaves the process.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{SearchContext, TopicId};

/// Reject contexts that give the source nothing to search with.
///
/// Blank question text is fine when a non-empty embedding is supplied.
/// Embeddings must hold finite values only.
pub fn search_context(context: &SearchContext) -> Result<()> {
    let embedding = context.embedding_vector();
    if !context.has_query_text() && embedding.is_none() {
        debug!("rejecting search context without query text or embedding");
        return Err(Error::Validation("question text is required when no embedding is supplied".to_string()));
    }
    if let Some(v) = embedding {
        if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
            return Err(Error::Validation(format!("embedding value at index {} is not finite", pos)));
        }
    }
    Ok(())
}

pub fn topic_id(id: TopicId) -> Result<()> {
    if id <= 0 {
        debug!(topic_id = id, "rejecting non-positive topic id");
        return Err(Error::Validation(format!("invalid topic id {}", id)));
    }
    Ok(())
}

/// Check a query embedding against the dimensionality the source indexes with.
pub fn embedding_dimension(embedding: &[f64], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        return Err(Error::Validation(format!(
            "embedding has {} dimensions, source expects {}",
            embedding.len(),
            expected
        )));
    }
    Ok(())
}

/// Order by descending score and keep the first `count`.
///
/// The sort is stable, so equal scores keep their incoming (source-native)
/// order. NaN scores go last.
pub fn rank<T>(mut scored: Vec<(T, f64)>, count: usize) -> Vec<T> {
    scored.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
    scored.truncate(count);
    scored.into_iter().map(|(item, _)| item).collect()
}
