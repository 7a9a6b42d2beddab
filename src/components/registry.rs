//! Persistent component registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Direct registrations plus ordered factory fallback

use dashmap::DashMap;
use log::{debug, error, warn};
use parking_lot::RwLock;
use std::sync::Arc;

use super::component::Component;
use super::context::ComponentContext;
use super::factory::ComponentFactory;

/// Registry of components that are re-registered on every startup
///
/// Components are keyed by full custom id. Factories are kept in registration order and
/// consulted only when no direct registration matches; the first factory that can handle
/// an id wins.
///
/// # Example
///
/// ```ignore
/// let registry = ComponentRegistry::new();
/// registry.register(Arc::new(DismissButton::new()));
/// registry.register_factory(Arc::new(ConfirmButtonFactory::new("util")?));
///
/// if let Some(component) = registry.get("util:confirm:delete-message", None) {
///     component.execute_with_validation(&ctx).await?;
/// }
/// ```
pub struct ComponentRegistry {
    components: DashMap<String, Arc<dyn Component>>,
    factories: RwLock<Vec<Arc<dyn ComponentFactory>>>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            components: DashMap::new(),
            factories: RwLock::new(Vec::new()),
        }
    }

    /// Register a component under its custom id
    ///
    /// An existing registration under the same id is replaced with a warning and returned.
    pub fn register(&self, component: Arc<dyn Component>) -> Option<Arc<dyn Component>> {
        let custom_id = component.custom_id().to_string();
        let previous = self.components.insert(custom_id.clone(), component);
        if previous.is_some() {
            warn!("Component {custom_id} already registered, overwriting");
        } else {
            debug!("Registered persistent component {custom_id}");
        }
        previous
    }

    /// Register a factory under its pattern
    ///
    /// Re-registering a pattern replaces the old factory in place, keeping its position in
    /// the lookup order.
    pub fn register_factory(
        &self,
        factory: Arc<dyn ComponentFactory>,
    ) -> Option<Arc<dyn ComponentFactory>> {
        let mut factories = self.factories.write();
        let pattern = factory.pattern().to_string();

        if let Some(slot) = factories.iter_mut().find(|f| f.pattern() == pattern) {
            warn!("Component factory {pattern} already registered, overwriting");
            return Some(std::mem::replace(slot, factory));
        }

        factories.push(factory);
        debug!("Registered component factory {pattern}");
        None
    }

    /// Resolve a custom id to a component
    ///
    /// Direct registrations win over factories. A factory that claims the id but fails to
    /// build it is logged and treated as a miss.
    pub fn get(
        &self,
        custom_id: &str,
        ctx: Option<&ComponentContext>,
    ) -> Option<Arc<dyn Component>> {
        if let Some(component) = self.components.get(custom_id) {
            return Some(Arc::clone(component.value()));
        }

        let factory = self.find_factory(custom_id)?;
        match factory.create(custom_id, ctx) {
            Ok(component) => {
                debug!(
                    "Factory {} constructed component {custom_id}",
                    factory.pattern()
                );
                Some(component)
            }
            Err(e) => {
                error!("Factory {} failed for {custom_id}: {e}", factory.pattern());
                None
            }
        }
    }

    /// Check whether `get` would find a component, without constructing one
    pub fn has(&self, custom_id: &str) -> bool {
        self.components.contains_key(custom_id) || self.find_factory(custom_id).is_some()
    }

    /// First factory, in registration order, that claims the id
    fn find_factory(&self, custom_id: &str) -> Option<Arc<dyn ComponentFactory>> {
        self.factories
            .read()
            .iter()
            .find(|f| f.can_handle(custom_id))
            .cloned()
    }

    /// All directly registered components
    pub fn all(&self) -> Vec<Arc<dyn Component>> {
        self.components.iter().map(|e| Arc::clone(e.value())).collect()
    }

    /// All factories in lookup order
    pub fn all_factories(&self) -> Vec<Arc<dyn ComponentFactory>> {
        self.factories.read().clone()
    }

    /// Number of directly registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if registry is empty (no components and no factories)
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.factories.read().is_empty()
    }

    /// Drop every component and factory
    pub fn clear(&self) {
        self.components.clear();
        self.factories.write().clear();
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::component::testing::CountingComponent;
    use crate::components::factory::testing::PrefixFactory;

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let registry = ComponentRegistry::new();
        registry.register(Arc::new(CountingComponent::new("ns:one")));

        assert!(registry.has("ns:one"));
        assert_eq!(registry.get("ns:one", None).unwrap().custom_id(), "ns:one");
        assert!(registry.get("ns:two", None).is_none());
        assert!(!registry.has("ns:two"));
    }

    #[test]
    fn test_overwrite_keeps_second() {
        let registry = ComponentRegistry::new();
        let first: Arc<dyn Component> = Arc::new(CountingComponent::new("ns:dup"));
        let second: Arc<dyn Component> = Arc::new(CountingComponent::new("ns:dup"));

        assert!(registry.register(Arc::clone(&first)).is_none());
        let replaced = registry.register(Arc::clone(&second));

        // Exactly one overwrite, and it displaced the first registration
        assert!(Arc::ptr_eq(&replaced.unwrap(), &first));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("ns:dup", None).unwrap(), &second));
    }

    #[test]
    fn test_direct_match_beats_factory() {
        let registry = ComponentRegistry::new();
        let factory = Arc::new(PrefixFactory::new("ns:"));
        registry.register_factory(factory.clone());
        let direct: Arc<dyn Component> = Arc::new(CountingComponent::new("ns:direct"));
        registry.register(Arc::clone(&direct));

        let resolved = registry.get("ns:direct", None).unwrap();
        assert!(Arc::ptr_eq(&resolved, &direct));
        assert_eq!(factory.created(), 0);
    }

    #[test]
    fn test_first_registered_factory_wins() {
        let registry = ComponentRegistry::new();
        let broad = Arc::new(PrefixFactory::new("ns:"));
        let narrow = Arc::new(PrefixFactory::new("ns:item"));
        registry.register_factory(broad.clone());
        registry.register_factory(narrow.clone());

        assert!(registry.get("ns:item:7", None).is_some());
        assert_eq!(broad.created(), 1);
        assert_eq!(narrow.created(), 0);
    }

    #[test]
    fn test_factory_overwrite_keeps_position() {
        let registry = ComponentRegistry::new();
        registry.register_factory(Arc::new(PrefixFactory::new("a:")));
        registry.register_factory(Arc::new(PrefixFactory::new("b:")));
        let replaced = registry.register_factory(Arc::new(PrefixFactory::new("a:")));

        assert!(replaced.is_some());
        let patterns: Vec<String> = registry
            .all_factories()
            .iter()
            .map(|f| f.pattern().to_string())
            .collect();
        assert_eq!(patterns, vec!["a:", "b:"]);
    }

    #[test]
    fn test_construction_failure_is_a_miss() {
        let registry = ComponentRegistry::new();
        registry.register_factory(Arc::new(PrefixFactory::broken("ns:")));

        // has() never constructs, so it still reports a match
        assert!(registry.has("ns:anything"));
        assert!(registry.get("ns:anything", None).is_none());
    }

    #[test]
    fn test_has_implies_get() {
        let registry = ComponentRegistry::new();
        registry.register(Arc::new(CountingComponent::new("ns:direct")));
        registry.register_factory(Arc::new(PrefixFactory::new("fx:")));

        for id in ["ns:direct", "fx:built:1", "zz:missing"] {
            if registry.has(id) {
                assert!(registry.get(id, None).is_some(), "{id} resolved by has() only");
            }
        }
    }

    #[test]
    fn test_clear() {
        let registry = ComponentRegistry::new();
        registry.register(Arc::new(CountingComponent::new("ns:one")));
        registry.register_factory(Arc::new(PrefixFactory::new("ns:")));
        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.has("ns:one"));
    }
}
