//! Registry that owns data sources and drives their lifecycle.
//!
//! Sources are registered by name, initialized exactly once by
//! [`SourceRegistry::initialize_all`], and only reachable afterwards if that
//! succeeded. Every call into a source is bounded by the configured timeout.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use datasource_core::{DataItem, DataSource, SearchContext, Topic, TopicId};
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::{HostError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceState {
    /// Registered, `initialize_all` has not run for it yet.
    Pending,
    Ready,
    Failed(String),
    /// Turned off in configuration; never initialized.
    Disabled,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceState::Pending => write!(f, "pending initialization"),
            SourceState::Ready => write!(f, "ready"),
            SourceState::Failed(reason) => write!(f, "initialization failed: {}", reason),
            SourceState::Disabled => write!(f, "disabled"),
        }
    }
}

enum Slot {
    Pending(Box<dyn DataSource>),
    Ready(Arc<dyn DataSource>),
    Failed(String),
    Disabled,
}

impl Slot {
    fn state(&self) -> SourceState {
        match self {
            Slot::Pending(_) => SourceState::Pending,
            Slot::Ready(_) => SourceState::Ready,
            Slot::Failed(reason) => SourceState::Failed(reason.clone()),
            Slot::Disabled => SourceState::Disabled,
        }
    }
}

/// Outcome of one [`SourceRegistry::initialize_all`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub ready: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl InitReport {
    pub fn all_ready(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SourceRegistry {
    config: HostConfig,
    slots: BTreeMap<String, Slot>,
}

impl SourceRegistry {
    pub fn new(config: HostConfig) -> Self {
        Self { config, slots: BTreeMap::new() }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Add an uninitialized source under `name`.
    pub fn register(&mut self, name: impl Into<String>, source: Box<dyn DataSource>) -> Result<()> {
        let name = name.into();
        if self.slots.contains_key(&name) {
            return Err(HostError::DuplicateSource(name));
        }
        let slot = if self.config.settings_for(&name).enabled {
            Slot::Pending(source)
        } else {
            info!(source = %name, "source disabled by configuration");
            Slot::Disabled
        };
        self.slots.insert(name, slot);
        Ok(())
    }

    /// Initialize every pending source, concurrently, each one exactly once.
    ///
    /// Sources registered after this returns are picked up by the next call.
    pub async fn initialize_all(&mut self) -> InitReport {
        let names: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Pending(_)))
            .map(|(name, _)| name.clone())
            .collect();
        let mut pending = Vec::with_capacity(names.len());
        for name in names {
            if let Some(Slot::Pending(source)) = self.slots.remove(&name) {
                pending.push((name, source));
            }
        }

        let limit = self.config.init_timeout();
        let outcomes = join_all(pending.into_iter().map(|(name, mut source)| async move {
            let started = Instant::now();
            let outcome = match timeout(limit, source.initialize()).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {} ms", limit.as_millis())),
            };
            (name, source, outcome, started.elapsed())
        }))
        .await;

        let mut report = InitReport::default();
        for (name, source, outcome, elapsed) in outcomes {
            match outcome {
                Ok(()) => {
                    info!(source = %name, elapsed_ms = millis(elapsed), "source ready");
                    self.slots.insert(name.clone(), Slot::Ready(Arc::from(source)));
                    report.ready.push(name);
                }
                Err(reason) => {
                    warn!(source = %name, %reason, "source unusable");
                    self.slots.insert(name.clone(), Slot::Failed(reason.clone()));
                    report.failed.push((name, reason));
                }
            }
        }
        report
    }

    pub fn state(&self, name: &str) -> Option<SourceState> {
        self.slots.get(name).map(Slot::state)
    }

    pub fn ready_sources(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Handle to an initialized source, for hosts that drive it directly.
    pub fn source(&self, name: &str) -> Result<Arc<dyn DataSource>> {
        match self.slots.get(name) {
            None => Err(HostError::UnknownSource(name.to_string())),
            Some(Slot::Ready(source)) => Ok(Arc::clone(source)),
            Some(slot) => Err(HostError::NotReady { name: name.to_string(), state: slot.state() }),
        }
    }

    /// Check one source. Sources that are not ready, or that do not answer
    /// within the availability timeout, count as unavailable.
    pub async fn check_availability(&self, name: &str) -> bool {
        let Ok(source) = self.source(name) else {
            return false;
        };
        let limit = self.config.availability_timeout();
        match timeout(limit, source.check_availability()).await {
            Ok(available) => available,
            Err(_) => {
                warn!(source = %name, timeout_ms = millis(limit), "availability check timed out");
                false
            }
        }
    }

    /// Check every registered source concurrently.
    pub async fn availability(&self) -> BTreeMap<String, bool> {
        let checks = self.slots.keys().map(|name| async move { (name.clone(), self.check_availability(name).await) });
        join_all(checks).await.into_iter().collect()
    }

    /// Search one source. `count` is capped by the source's `max_count`.
    pub async fn search(&self, name: &str, count: usize, context: &SearchContext) -> Result<Vec<Topic>> {
        let source = self.source(name)?;
        let count = self.effective_count(name, count);
        let mut topics = self.bounded(name, "search", source.search_topics(count, context)).await?;
        cap_results(name, "search", &mut topics, count);
        Ok(topics)
    }

    /// Fetch content for a topic previously returned by the same source.
    pub async fn fetch(&self, name: &str, count: usize, topic_id: TopicId) -> Result<Vec<DataItem>> {
        let source = self.source(name)?;
        let count = self.effective_count(name, count);
        let mut items = self.bounded(name, "fetch", source.fetch_content(count, topic_id)).await?;
        cap_results(name, "fetch", &mut items, count);
        Ok(items)
    }

    /// Issue the same search to every ready source at once. Each source's
    /// result is returned under its name as-is; nothing is merged.
    pub async fn search_each(&self, count: usize, context: &SearchContext) -> BTreeMap<String, Result<Vec<Topic>>> {
        let names = self.ready_sources();
        let searches = names.into_iter().map(|name| async move {
            let result = self.search(&name, count, context).await;
            (name, result)
        });
        join_all(searches).await.into_iter().collect()
    }

    fn effective_count(&self, name: &str, count: usize) -> usize {
        match self.config.settings_for(name).max_count {
            Some(max) => count.min(max),
            None => count,
        }
    }

    async fn bounded<T, F>(&self, name: &str, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = datasource_core::Result<T>>,
    {
        let limit: Duration = self.config.operation_timeout();
        let started = Instant::now();
        let outcome = timeout(limit, call).await;
        let elapsed_ms = millis(started.elapsed());
        match outcome {
            Ok(Ok(value)) => {
                debug!(source = %name, operation, elapsed_ms, "call completed");
                Ok(value)
            }
            Ok(Err(e)) => {
                if e.is_validation() {
                    debug!(source = %name, operation, error = %e, "call rejected");
                } else {
                    warn!(source = %name, operation, error = %e, elapsed_ms, "call failed");
                }
                Err(HostError::Source { name: name.to_string(), source: e })
            }
            Err(_) => {
                warn!(source = %name, operation, timeout_ms = millis(limit), "call timed out");
                Err(HostError::Timeout { name: name.to_string(), operation })
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Sources must not return more than asked for; drop the excess if one does.
fn cap_results<T>(name: &str, operation: &'static str, results: &mut Vec<T>, count: usize) {
    if results.len() > count {
        warn!(source = %name, operation, returned = results.len(), count, "source exceeded count, truncating");
        results.truncate(count);
    }
}
