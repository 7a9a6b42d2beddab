//! Button that retires the message it sits on

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateComponents;

use crate::components::component::Component;
use crate::components::context::ComponentContext;
use crate::components::definition::{Button, ButtonStyle, ComponentDefinition};

pub const DISMISS_ID: &str = "util:dismiss";

pub struct DismissButton {
    definition: ComponentDefinition,
}

impl DismissButton {
    pub fn new() -> Self {
        Self {
            definition: ComponentDefinition::Button(
                Button::new(ButtonStyle::Secondary, "Dismiss").emoji("✖️"),
            ),
        }
    }
}

impl Default for DismissButton {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for DismissButton {
    fn custom_id(&self) -> &str {
        DISMISS_ID
    }

    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
        ctx.responder
            .update_message("*Dismissed.*", Some(CreateComponents::default()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::context::testing::{context, MockResponder, Reply};
    use crate::components::definition::ComponentType;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dismiss_updates_message() {
        let responder = Arc::new(MockResponder::default());
        let ctx = context(DISMISS_ID, "1", ComponentType::Button, &responder);

        DismissButton::new().execute(&ctx).await.unwrap();
        assert_eq!(
            responder.replies(),
            vec![Reply::Update("*Dismissed.*".to_string())]
        );
    }
}
