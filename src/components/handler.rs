//! Component dispatch
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: In-place claims that unregistration can cancel; `Busy` outcome
//! - 1.0.0: Registry-first resolution, dynamic fallback, exactly-once claims

use dashmap::DashMap;
use log::{debug, error, warn};
use std::sync::Arc;

use super::component::{Component, Execution};
use super::context::ComponentContext;
use super::registry::ComponentRegistry;

/// Ephemeral notice sent when a component fails
pub const ERROR_NOTICE: &str =
    "❌ Sorry, I encountered an error processing your interaction. Please try again.";

/// Result of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The component executed successfully
    Executed {
        /// Resolved from the dynamic map rather than the registry
        dynamic: bool,
        once: bool,
    },
    /// Validation declined the interaction
    Rejected,
    /// Nothing is registered for the custom id
    Unresolved,
    /// A single-use component is already executing for another dispatch
    Busy,
    /// Execution returned an error; the user was notified if possible
    Failed,
}

/// One dynamic registration
struct DynamicSlot {
    component: Arc<dyn Component>,
    /// Held by the single-use dispatch currently executing this instance
    claimed: bool,
}

enum Claim {
    Acquired,
    Busy,
    Gone,
}

/// Routes interactions to components
///
/// Persistent components come from the shared [`ComponentRegistry`]; dynamic components
/// live in this handler's own map and are only consulted when the registry has no match,
/// so a dynamic registration can never shadow a persistent one.
///
/// Dynamic single-use components are claimed in place before they execute, so two racing
/// dispatches of the same id run it at most once; the loser gets [`DispatchOutcome::Busy`].
/// A successful run removes the registration. When validation rejects or execution fails
/// the claim is dropped and the component is usable again, unless it was unregistered or
/// swept while executing, in which case it stays gone.
pub struct ComponentHandler {
    registry: Arc<ComponentRegistry>,
    dynamic: DashMap<String, DynamicSlot>,
}

impl ComponentHandler {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            registry,
            dynamic: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Register a dynamic component, replacing any previous one with the same id
    pub fn register(&self, component: Arc<dyn Component>) -> Option<Arc<dyn Component>> {
        let custom_id = component.custom_id().to_string();
        let previous = self
            .dynamic
            .insert(
                custom_id.clone(),
                DynamicSlot {
                    component,
                    claimed: false,
                },
            )
            .map(|slot| slot.component);
        if previous.is_some() {
            warn!("Dynamic component {custom_id} already registered, overwriting");
        } else {
            debug!("Registered dynamic component {custom_id}");
        }
        previous
    }

    /// Remove a dynamic component, cancelling any claim an executing dispatch holds on it
    pub fn unregister(&self, custom_id: &str) -> Option<Arc<dyn Component>> {
        let removed = self
            .dynamic
            .remove(custom_id)
            .map(|(_, slot)| slot.component);
        if removed.is_some() {
            debug!("Unregistered dynamic component {custom_id}");
        }
        removed
    }

    /// Unregister only if the id still maps to this exact instance
    pub(crate) fn unregister_instance(&self, custom_id: &str, component: &Arc<dyn Component>) -> bool {
        self.dynamic
            .remove_if(custom_id, |_, slot| Arc::ptr_eq(&slot.component, component))
            .is_some()
    }

    /// Whether a dynamic component is registered under the id
    pub fn is_registered(&self, custom_id: &str) -> bool {
        self.dynamic.contains_key(custom_id)
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamic.len()
    }

    /// Resolve and run the component for `custom_id`
    ///
    /// Never fails: every component-level error ends here, logged and, for execution
    /// errors, reported to the user with an ephemeral notice.
    pub async fn dispatch(&self, custom_id: &str, ctx: &ComponentContext) -> DispatchOutcome {
        self.dispatch_resolved(custom_id, ctx).await.0
    }

    /// [`dispatch`](Self::dispatch), also handing back the instance that ran
    pub(crate) async fn dispatch_resolved(
        &self,
        custom_id: &str,
        ctx: &ComponentContext,
    ) -> (DispatchOutcome, Option<Arc<dyn Component>>) {
        let (component, dynamic) = match self.resolve(custom_id, ctx) {
            Some(resolved) => resolved,
            None => {
                warn!(
                    "No component registered for {custom_id} (user {})",
                    ctx.user_id
                );
                return (DispatchOutcome::Unresolved, None);
            }
        };

        let claimed = dynamic && component.once();
        if claimed {
            match self.claim(custom_id, &component) {
                Claim::Acquired => {}
                Claim::Busy => {
                    debug!("Single-use component {custom_id} is already executing");
                    return (DispatchOutcome::Busy, None);
                }
                Claim::Gone => {
                    debug!("Single-use component {custom_id} was removed before it could run");
                    return (DispatchOutcome::Unresolved, None);
                }
            }
        }

        let outcome = match component.execute_with_validation(ctx).await {
            Ok(Execution::Completed) => {
                if claimed {
                    self.unregister_instance(custom_id, &component);
                }
                debug!(
                    "Component {custom_id} executed for user {}",
                    ctx.user_id
                );
                DispatchOutcome::Executed {
                    dynamic,
                    once: component.once(),
                }
            }
            Ok(Execution::Rejected) => {
                if claimed {
                    self.release(custom_id, &component);
                }
                DispatchOutcome::Rejected
            }
            Err(e) => {
                error!("Error executing component {custom_id}: {e:#}");
                if claimed {
                    self.release(custom_id, &component);
                }
                self.notify_failure(custom_id, ctx).await;
                DispatchOutcome::Failed
            }
        };

        (outcome, Some(component))
    }

    /// Registry first, dynamic map second
    fn resolve(
        &self,
        custom_id: &str,
        ctx: &ComponentContext,
    ) -> Option<(Arc<dyn Component>, bool)> {
        if let Some(component) = self.registry.get(custom_id, Some(ctx)) {
            return Some((component, false));
        }
        self.dynamic
            .get(custom_id)
            .map(|slot| (Arc::clone(&slot.component), true))
    }

    fn claim(&self, custom_id: &str, component: &Arc<dyn Component>) -> Claim {
        match self.dynamic.get_mut(custom_id) {
            Some(mut slot) if Arc::ptr_eq(&slot.component, component) => {
                if slot.claimed {
                    Claim::Busy
                } else {
                    slot.claimed = true;
                    Claim::Acquired
                }
            }
            _ => Claim::Gone,
        }
    }

    /// Drop a claim so the component can be used again
    ///
    /// Does nothing if the registration was removed or replaced while executing.
    fn release(&self, custom_id: &str, component: &Arc<dyn Component>) {
        match self.dynamic.get_mut(custom_id) {
            Some(mut slot) if Arc::ptr_eq(&slot.component, component) => slot.claimed = false,
            _ => debug!("Component {custom_id} was unregistered while executing, not restoring it"),
        }
    }

    async fn notify_failure(&self, custom_id: &str, ctx: &ComponentContext) {
        if let Err(e) = ctx.responder.send_ephemeral(ERROR_NOTICE).await {
            error!("Failed to send error notice for component {custom_id}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::component::testing::CountingComponent;
    use crate::components::context::testing::{context, MockResponder, Reply};
    use crate::components::definition::ComponentType;
    use crate::components::factory::testing::PrefixFactory;
    use std::time::Duration;

    fn setup() -> (Arc<ComponentRegistry>, ComponentHandler, Arc<MockResponder>) {
        let registry = Arc::new(ComponentRegistry::new());
        let handler = ComponentHandler::new(Arc::clone(&registry));
        (registry, handler, Arc::new(MockResponder::default()))
    }

    #[tokio::test]
    async fn test_persistent_beats_dynamic() {
        let (registry, handler, responder) = setup();
        let persistent = Arc::new(CountingComponent::new("ns:same"));
        let dynamic = Arc::new(CountingComponent::new("ns:same"));
        registry.register(persistent.clone());
        handler.register(dynamic.clone());

        let ctx = context("ns:same", "1", ComponentType::Button, &responder);
        for _ in 0..3 {
            let outcome = handler.dispatch("ns:same", &ctx).await;
            assert_eq!(
                outcome,
                DispatchOutcome::Executed {
                    dynamic: false,
                    once: false
                }
            );
        }

        assert_eq!(persistent.executions(), 3);
        assert_eq!(dynamic.executions(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_fallback() {
        let (_registry, handler, responder) = setup();
        let dynamic = Arc::new(CountingComponent::new("ns:dyn"));
        handler.register(dynamic.clone());

        let ctx = context("ns:dyn", "1", ComponentType::Button, &responder);
        let outcome = handler.dispatch("ns:dyn", &ctx).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Executed {
                dynamic: true,
                once: false
            }
        );
        assert_eq!(dynamic.executions(), 1);
        assert!(handler.is_registered("ns:dyn"));
    }

    #[tokio::test]
    async fn test_unresolved_sends_nothing() {
        let (_registry, handler, responder) = setup();
        let ctx = context("ns:ghost", "1", ComponentType::Button, &responder);

        assert_eq!(
            handler.dispatch("ns:ghost", &ctx).await,
            DispatchOutcome::Unresolved
        );
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_factory_construction_failure_is_unresolved() {
        let (registry, handler, responder) = setup();
        registry.register_factory(Arc::new(PrefixFactory::broken("ns:")));
        let ctx = context("ns:broken", "1", ComponentType::Button, &responder);

        assert_eq!(
            handler.dispatch("ns:broken", &ctx).await,
            DispatchOutcome::Unresolved
        );
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_execution_error_sends_one_notice() {
        let (registry, handler, responder) = setup();
        let component = Arc::new(CountingComponent::new("ns:fail").failing());
        registry.register(component.clone());

        let ctx = context("ns:fail", "1", ComponentType::Button, &responder);
        assert_eq!(handler.dispatch("ns:fail", &ctx).await, DispatchOutcome::Failed);
        assert_eq!(
            responder.replies(),
            vec![Reply::Ephemeral(ERROR_NOTICE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_notice_is_swallowed() {
        let (registry, handler, _) = setup();
        registry.register(Arc::new(CountingComponent::new("ns:fail").failing()));
        let responder = Arc::new(MockResponder::failing());

        let ctx = context("ns:fail", "1", ComponentType::Button, &responder);
        assert_eq!(handler.dispatch("ns:fail", &ctx).await, DispatchOutcome::Failed);
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_is_silent() {
        let (registry, handler, responder) = setup();
        let component = Arc::new(CountingComponent::new("ns:guarded").rejecting());
        registry.register(component.clone());

        let ctx = context("ns:guarded", "1", ComponentType::Button, &responder);
        assert_eq!(
            handler.dispatch("ns:guarded", &ctx).await,
            DispatchOutcome::Rejected
        );
        assert_eq!(component.executions(), 0);
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_once_dynamic_removed_after_success() {
        let (_registry, handler, responder) = setup();
        let component = Arc::new(CountingComponent::new("ns:once").once());
        handler.register(component.clone());

        let ctx = context("ns:once", "1", ComponentType::Button, &responder);
        assert_eq!(
            handler.dispatch("ns:once", &ctx).await,
            DispatchOutcome::Executed {
                dynamic: true,
                once: true
            }
        );
        assert!(!handler.is_registered("ns:once"));
        assert_eq!(component.cleanups(), 1);

        assert_eq!(
            handler.dispatch("ns:once", &ctx).await,
            DispatchOutcome::Unresolved
        );
        assert_eq!(component.executions(), 1);
    }

    #[tokio::test]
    async fn test_once_dynamic_kept_after_rejection_and_failure() {
        let (_registry, handler, responder) = setup();
        let rejecting = Arc::new(CountingComponent::new("ns:reject").once().rejecting());
        let failing = Arc::new(CountingComponent::new("ns:fail").once().failing());
        handler.register(rejecting.clone());
        handler.register(failing.clone());

        let ctx = context("ns:reject", "1", ComponentType::Button, &responder);
        handler.dispatch("ns:reject", &ctx).await;
        let ctx = context("ns:fail", "1", ComponentType::Button, &responder);
        handler.dispatch("ns:fail", &ctx).await;

        assert!(handler.is_registered("ns:reject"));
        assert!(handler.is_registered("ns:fail"));
    }

    #[tokio::test]
    async fn test_once_dynamic_runs_once_under_race() {
        let (_registry, handler, responder) = setup();
        let component = Arc::new(
            CountingComponent::new("ns:race")
                .once()
                .slow(Duration::from_millis(50)),
        );
        handler.register(component.clone());
        let handler = Arc::new(handler);

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let handler = Arc::clone(&handler);
            let ctx = context("ns:race", "1", ComponentType::Button, &responder);
            tasks.push(tokio::spawn(async move {
                handler.dispatch("ns:race", &ctx).await
            }));
        }

        let mut executed = 0;
        let mut busy = 0;
        for task in tasks {
            match task.await.unwrap() {
                DispatchOutcome::Executed { .. } => executed += 1,
                DispatchOutcome::Busy => busy += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(executed, 1);
        assert_eq!(busy, 3);
        assert_eq!(component.executions(), 1);
        assert!(!handler.is_registered("ns:race"));
    }

    #[tokio::test]
    async fn test_busy_while_another_dispatch_holds_claim() {
        let (_registry, handler, responder) = setup();
        let component = Arc::new(
            CountingComponent::new("ns:held")
                .once()
                .failing()
                .slow(Duration::from_millis(50)),
        );
        handler.register(component.clone());
        let handler = Arc::new(handler);

        let first = {
            let handler = Arc::clone(&handler);
            let ctx = context("ns:held", "1", ComponentType::Button, &responder);
            tokio::spawn(async move { handler.dispatch("ns:held", &ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let ctx = context("ns:held", "2", ComponentType::Button, &responder);
        assert_eq!(handler.dispatch("ns:held", &ctx).await, DispatchOutcome::Busy);

        assert_eq!(first.await.unwrap(), DispatchOutcome::Failed);
        // The claim was dropped, so the component answers again
        assert!(handler.is_registered("ns:held"));
        assert_eq!(handler.dispatch("ns:held", &ctx).await, DispatchOutcome::Failed);
        assert_eq!(component.executions(), 2);
    }

    #[tokio::test]
    async fn test_unregister_during_execution_is_not_undone() {
        let (_registry, handler, responder) = setup();
        let component = Arc::new(
            CountingComponent::new("ns:cancel")
                .once()
                .failing()
                .slow(Duration::from_millis(50)),
        );
        handler.register(component.clone());
        let handler = Arc::new(handler);

        let running = {
            let handler = Arc::clone(&handler);
            let ctx = context("ns:cancel", "1", ComponentType::Button, &responder);
            tokio::spawn(async move { handler.dispatch("ns:cancel", &ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handler.unregister("ns:cancel").is_some());
        assert_eq!(running.await.unwrap(), DispatchOutcome::Failed);
        assert!(!handler.is_registered("ns:cancel"));

        let ctx = context("ns:cancel", "1", ComponentType::Button, &responder);
        assert_eq!(
            handler.dispatch("ns:cancel", &ctx).await,
            DispatchOutcome::Unresolved
        );
    }

    #[tokio::test]
    async fn test_replacement_during_execution_survives_release() {
        let (_registry, handler, responder) = setup();
        let original = Arc::new(
            CountingComponent::new("ns:swap")
                .once()
                .failing()
                .slow(Duration::from_millis(50)),
        );
        handler.register(original.clone());
        let handler = Arc::new(handler);

        let running = {
            let handler = Arc::clone(&handler);
            let ctx = context("ns:swap", "1", ComponentType::Button, &responder);
            tokio::spawn(async move { handler.dispatch("ns:swap", &ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let replacement: Arc<dyn Component> = Arc::new(CountingComponent::new("ns:swap").once());
        handler.register(Arc::clone(&replacement));
        assert_eq!(running.await.unwrap(), DispatchOutcome::Failed);

        let ctx = context("ns:swap", "1", ComponentType::Button, &responder);
        assert_eq!(
            handler.dispatch("ns:swap", &ctx).await,
            DispatchOutcome::Executed {
                dynamic: true,
                once: true
            }
        );
        assert_eq!(original.executions(), 1);
    }

    #[tokio::test]
    async fn test_persistent_once_stays_registered() {
        let (registry, handler, responder) = setup();
        let component = Arc::new(CountingComponent::new("ns:persist").once());
        registry.register(component.clone());

        let ctx = context("ns:persist", "1", ComponentType::Button, &responder);
        handler.dispatch("ns:persist", &ctx).await;
        handler.dispatch("ns:persist", &ctx).await;

        assert_eq!(component.executions(), 2);
        assert_eq!(component.cleanups(), 2);
        assert!(registry.has("ns:persist"));
    }

    #[test]
    fn test_unregister() {
        let (_registry, handler, _) = setup();
        handler.register(Arc::new(CountingComponent::new("ns:dyn")));

        assert!(handler.unregister("ns:dyn").is_some());
        assert!(handler.unregister("ns:dyn").is_none());
        assert_eq!(handler.dynamic_count(), 0);
    }
}
