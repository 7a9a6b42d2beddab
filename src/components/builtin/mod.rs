//! # Built-in Components
//!
//! Utility components every deployment gets: confirmations, dismissal, feedback, and the
//! owner-guarded choice menu used by `/components`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod choice;
pub mod confirm;
pub mod dismiss;
pub mod feedback;

use anyhow::{Context, Result};
use serenity::builder::CreateComponents;
use std::sync::Arc;

use super::component::Component;
use super::custom_id::generate_custom_id;
use super::definition::render_rows;
use super::manager::{ComponentManager, ComponentMetadata, RegisterOptions};
use super::registry::ComponentRegistry;

pub use choice::ChoiceMenu;
pub use confirm::{ConfirmButton, ConfirmButtonFactory, ConfirmStyle};
pub use dismiss::{DismissButton, DISMISS_ID};
pub use feedback::{FeedbackButton, FeedbackModal, FEEDBACK_BUTTON_ID, FEEDBACK_MODAL_ID};

/// Namespace of the built-in utility components
pub const UTIL_NAMESPACE: &str = "util";
/// Namespace of per-invocation demo components
pub const DEMO_NAMESPACE: &str = "demo";

/// Register the persistent built-ins
pub fn register_builtins(registry: &ComponentRegistry) -> Result<()> {
    registry.register(Arc::new(DismissButton::new()));
    registry.register(Arc::new(FeedbackButton::new()));
    registry.register(Arc::new(FeedbackModal::new()));
    registry.register_factory(Arc::new(
        ConfirmButtonFactory::new(UTIL_NAMESPACE).context("Invalid confirm button pattern")?,
    ));
    Ok(())
}

/// Components for the `/components` demo message posted for `user_id`
///
/// Registers a fresh single-use choice menu owned by the user; the buttons resolve through
/// the registry like any inbound interaction would.
pub fn demo_components(manager: &ComponentManager, user_id: &str) -> Result<CreateComponents> {
    let registry = manager.handler().registry();

    let token = uuid::Uuid::new_v4().simple().to_string();
    let choice_id = generate_custom_id(
        DEMO_NAMESPACE,
        &format!("choice-{}", &token[..8]),
        Some(&ComponentMetadata::OriginalUser {
            user_id: user_id.to_string(),
        }),
    )?;
    let choice: Arc<dyn Component> = Arc::new(ChoiceMenu::new(
        choice_id,
        user_id.to_string(),
        "Pick a colour",
        &[("Red", "red"), ("Green", "green"), ("Blue", "blue")],
    ));
    manager.register_component(
        Arc::clone(&choice),
        RegisterOptions::default().metadata(ComponentMetadata::OriginalUser {
            user_id: user_id.to_string(),
        }),
    );

    let button_ids = [
        ConfirmButtonFactory::custom_id(UTIL_NAMESPACE, "demo-confirm", None),
        ConfirmButtonFactory::custom_id(UTIL_NAMESPACE, "demo-cancel", None),
        FEEDBACK_BUTTON_ID.to_string(),
        DISMISS_ID.to_string(),
    ];
    let mut components: Vec<Arc<dyn Component>> = Vec::with_capacity(button_ids.len() + 1);
    for id in &button_ids {
        let component = registry
            .get(id, None)
            .with_context(|| format!("Built-in component {id} is not registered"))?;
        components.push(component);
    }
    components.push(choice);

    let rows = render_rows(
        components
            .iter()
            .map(|c| (c.custom_id(), c.definition())),
    )?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::custom_id::parse_custom_id;
    use crate::components::handler::ComponentHandler;

    fn manager() -> ComponentManager {
        let registry = Arc::new(ComponentRegistry::new());
        register_builtins(&registry).unwrap();
        ComponentManager::new(Arc::new(ComponentHandler::new(registry)))
    }

    #[test]
    fn test_register_builtins() {
        let manager = manager();
        let registry = manager.handler().registry();
        assert!(registry.has(DISMISS_ID));
        assert!(registry.has(FEEDBACK_BUTTON_ID));
        assert!(registry.has(FEEDBACK_MODAL_ID));
        assert!(registry.has("util:confirm:anything"));
        assert_eq!(registry.all_factories().len(), 1);
    }

    #[test]
    fn test_demo_components_layout() {
        let manager = manager();
        let rows = demo_components(&manager, "42").unwrap();

        // Four buttons on one row, the select menu on its own
        assert_eq!(rows.0.len(), 2);
        assert_eq!(rows.0[0]["components"].as_array().unwrap().len(), 4);
        assert_eq!(rows.0[1]["components"][0]["type"], 3);

        let demo = manager.components_by_namespace(DEMO_NAMESPACE);
        assert_eq!(demo.len(), 1);
        let parsed = parse_custom_id(demo[0].custom_id()).unwrap();
        assert!(parsed.metadata_hash.is_some());
        assert_eq!(
            manager
                .metadata(demo[0].custom_id())
                .unwrap()
                .original_user(),
            Some("42")
        );
    }

    #[test]
    fn test_demo_components_are_unique_per_call() {
        let manager = manager();
        demo_components(&manager, "42").unwrap();
        demo_components(&manager, "42").unwrap();
        assert_eq!(manager.components_by_namespace(DEMO_NAMESPACE).len(), 2);
    }
}
