//! # Feature: Component Lifecycle
//!
//! Dynamic component registration with per-entry metadata, usage statistics and soft
//! timeouts. A background sweep unregisters entries older than their timeout. Uses DashMap
//! so dispatch, registration and the sweep can run concurrently.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::component::Component;
use super::context::ComponentContext;
use super::custom_id::namespace_of;
use super::handler::{ComponentHandler, DispatchOutcome};
use crate::core::config::{DEFAULT_COMPONENT_TIMEOUT_SECS, DEFAULT_SWEEP_INTERVAL_SECS};

pub const DEFAULT_COMPONENT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_COMPONENT_TIMEOUT_SECS);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS);

/// Bookkeeping attached to a dynamic registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentMetadata {
    /// Only the user who caused the component to be posted may use it
    OriginalUser { user_id: String },
    /// Position in a paginated view
    Pagination { page: u32, total_pages: u32 },
    /// Free-form labels for callers without a dedicated shape
    Labels { labels: BTreeMap<String, String> },
}

impl ComponentMetadata {
    pub fn is_empty(&self) -> bool {
        matches!(self, ComponentMetadata::Labels { labels } if labels.is_empty())
    }

    pub fn original_user(&self) -> Option<&str> {
        match self {
            ComponentMetadata::OriginalUser { user_id } => Some(user_id),
            _ => None,
        }
    }
}

/// Options for [`ComponentManager::register_component`]
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub timeout: Option<Duration>,
    pub metadata: Option<ComponentMetadata>,
}

impl RegisterOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Cache record for one dynamic registration
pub struct ComponentCacheEntry {
    pub component: Arc<dyn Component>,
    pub registered_at: Instant,
    /// Wall-clock registration time, for reporting
    pub registered_on: DateTime<Utc>,
    pub timeout: Duration,
    pub metadata: Option<ComponentMetadata>,
    pub usage_count: u64,
    pub last_used: Instant,
}

impl ComponentCacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.registered_at) > self.timeout
    }
}

/// Usage report for one dynamic component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStats {
    pub custom_id: String,
    pub usage_count: u64,
    pub age: Duration,
    pub time_since_last_use: Duration,
    pub expired: bool,
    pub registered_on: DateTime<Utc>,
    pub metadata: Option<ComponentMetadata>,
}

/// Manager for dynamic components and their lifetimes
pub struct ComponentManager {
    handler: Arc<ComponentHandler>,
    cache: DashMap<String, ComponentCacheEntry>,
    default_timeout: Duration,
    sweep_task: Mutex<Option<JoinHandle<()>>>,
}

impl ComponentManager {
    pub fn new(handler: Arc<ComponentHandler>) -> Self {
        Self::with_default_timeout(handler, DEFAULT_COMPONENT_TIMEOUT)
    }

    pub fn with_default_timeout(handler: Arc<ComponentHandler>, default_timeout: Duration) -> Self {
        Self {
            handler,
            cache: DashMap::new(),
            default_timeout,
            sweep_task: Mutex::new(None),
        }
    }

    pub fn handler(&self) -> &Arc<ComponentHandler> {
        &self.handler
    }

    /// Register a dynamic component and start tracking it
    ///
    /// Timeout precedence: explicit option, the component's own preference, the manager
    /// default. Returns the component's custom id.
    pub fn register_component(
        &self,
        component: Arc<dyn Component>,
        options: RegisterOptions,
    ) -> String {
        let custom_id = component.custom_id().to_string();
        let timeout = options
            .timeout
            .or_else(|| component.timeout())
            .unwrap_or(self.default_timeout);

        if self.handler.registry().has(&custom_id) {
            warn!("Dynamic component {custom_id} is shadowed by a persistent registration");
        }

        self.handler.register(Arc::clone(&component));

        let now = Instant::now();
        self.cache.insert(
            custom_id.clone(),
            ComponentCacheEntry {
                component,
                registered_at: now,
                registered_on: Utc::now(),
                timeout,
                metadata: options.metadata,
                usage_count: 0,
                last_used: now,
            },
        );

        debug!("Tracking dynamic component {custom_id} (timeout {timeout:?})");
        custom_id
    }

    /// Remove a dynamic component from the handler and the cache
    pub fn unregister_component(&self, custom_id: &str) -> bool {
        let from_handler = self.handler.unregister(custom_id).is_some();
        let from_cache = self.cache.remove(custom_id).is_some();
        from_handler || from_cache
    }

    /// Whether the entry outlived its timeout; unknown ids count as expired
    pub fn is_component_expired(&self, custom_id: &str) -> bool {
        let now = Instant::now();
        self.cache
            .get(custom_id)
            .is_none_or(|entry| entry.is_expired(now))
    }

    /// Tracked components whose first custom id segment is `namespace`
    pub fn components_by_namespace(&self, namespace: &str) -> Vec<Arc<dyn Component>> {
        let mut seen = HashSet::new();
        self.cache
            .iter()
            .filter(|entry| namespace_of(entry.key()) == namespace)
            .filter(|entry| seen.insert(entry.key().clone()))
            .map(|entry| Arc::clone(&entry.component))
            .collect()
    }

    pub fn metadata(&self, custom_id: &str) -> Option<ComponentMetadata> {
        self.cache
            .get(custom_id)
            .and_then(|entry| entry.metadata.clone())
    }

    pub fn component_stats(&self, custom_id: &str) -> Option<ComponentStats> {
        let now = Instant::now();
        self.cache
            .get(custom_id)
            .map(|entry| Self::stats_for(entry.key(), &entry, now))
    }

    pub fn all_component_stats(&self) -> HashMap<String, ComponentStats> {
        let now = Instant::now();
        self.cache
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    Self::stats_for(entry.key(), &entry, now),
                )
            })
            .collect()
    }

    fn stats_for(custom_id: &str, entry: &ComponentCacheEntry, now: Instant) -> ComponentStats {
        ComponentStats {
            custom_id: custom_id.to_string(),
            usage_count: entry.usage_count,
            age: now.duration_since(entry.registered_at),
            time_since_last_use: now.duration_since(entry.last_used),
            expired: entry.is_expired(now),
            registered_on: entry.registered_on,
            metadata: entry.metadata.clone(),
        }
    }

    /// Dispatch through the handler and record usage of dynamic components
    pub async fn dispatch(&self, custom_id: &str, ctx: &ComponentContext) -> DispatchOutcome {
        let (outcome, component) = self.handler.dispatch_resolved(custom_id, ctx).await;

        // Only touch the entry of the instance that ran; the id may have been re-registered
        if let (
            DispatchOutcome::Executed {
                dynamic: true,
                once,
            },
            Some(component),
        ) = (outcome, component.as_ref())
        {
            if once {
                // The handler already removed the registration
                self.cache
                    .remove_if(custom_id, |_, entry| Arc::ptr_eq(&entry.component, component));
            } else if let Some(mut entry) = self.cache.get_mut(custom_id) {
                if Arc::ptr_eq(&entry.component, component) {
                    entry.usage_count += 1;
                    entry.last_used = Instant::now();
                }
            }
        }

        outcome
    }

    /// Unregister every expired entry, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for custom_id in expired {
            // Re-check: the id may have been re-registered since the scan
            if let Some((_, entry)) = self
                .cache
                .remove_if(&custom_id, |_, entry| entry.is_expired(now))
            {
                self.handler.unregister_instance(&custom_id, &entry.component);
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Expired {removed} dynamic components");
        } else {
            debug!("Component sweep found nothing to expire");
        }
        removed
    }

    /// Start the periodic expiry sweep, replacing any running one
    ///
    /// The task holds only a weak reference, so it also ends once the manager is dropped.
    pub fn start_sweep(self: &Arc<Self>, every: Duration) {
        let manager = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match manager.upgrade() {
                    Some(manager) => {
                        manager.sweep_expired();
                    }
                    None => break,
                }
            }
        });

        if let Some(previous) = self.sweep_task.lock().replace(handle) {
            previous.abort();
        }
        info!("Component sweep started (interval: {every:?})");
    }

    /// Stop the periodic sweep; returns false if none was running
    pub fn stop_sweep(&self) -> bool {
        match self.sweep_task.lock().take() {
            Some(handle) => {
                handle.abort();
                info!("Component sweep stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep_task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ComponentManager {
    fn drop(&mut self) {
        if let Some(handle) = self.sweep_task.get_mut().take() {
            handle.abort();
        }
    }
}
