//! Feedback form: a button that opens a modal, and the modal that receives it

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use crate::components::component::Component;
use crate::components::context::ComponentContext;
use crate::components::definition::{
    Button, ButtonStyle, ComponentDefinition, Modal, TextInput, TextInputStyle,
};
use crate::core::response::truncate_for_message;

pub const FEEDBACK_BUTTON_ID: &str = "util:feedback";
pub const FEEDBACK_MODAL_ID: &str = "util:feedback-modal";

const TOPIC_INPUT: &str = "topic";
const DETAILS_INPUT: &str = "details";

const BLANK_TOPIC_NOTICE: &str = "⚠️ The topic cannot be blank. Please try again.";

pub struct FeedbackButton {
    definition: ComponentDefinition,
    modal: Modal,
}

impl FeedbackButton {
    pub fn new() -> Self {
        Self {
            definition: ComponentDefinition::Button(
                Button::new(ButtonStyle::Primary, "Send Feedback").emoji("📝"),
            ),
            modal: feedback_modal(),
        }
    }
}

impl Default for FeedbackButton {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for FeedbackButton {
    fn custom_id(&self) -> &str {
        FEEDBACK_BUTTON_ID
    }

    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
        ctx.responder.show_modal(FEEDBACK_MODAL_ID, &self.modal).await
    }
}

fn feedback_modal() -> Modal {
    Modal::new(
        "Help & Feedback",
        vec![
            TextInput::new(TOPIC_INPUT, "What is this about?", TextInputStyle::Short)
                .placeholder("Enter a short topic...")
                .length(Some(1), Some(100)),
            TextInput::new(
                DETAILS_INPUT,
                "Additional Details (Optional)",
                TextInputStyle::Paragraph,
            )
            .placeholder("Provide more context if needed...")
            .required(false)
            .length(None, Some(1000)),
        ],
    )
}

/// Receives the feedback modal submission
pub struct FeedbackModal {
    definition: ComponentDefinition,
}

impl FeedbackModal {
    pub fn new() -> Self {
        Self {
            definition: ComponentDefinition::Modal(feedback_modal()),
        }
    }
}

impl Default for FeedbackModal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for FeedbackModal {
    fn custom_id(&self) -> &str {
        FEEDBACK_MODAL_ID
    }

    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    async fn validate(&self, ctx: &ComponentContext) -> bool {
        if ctx
            .modal_field(TOPIC_INPUT)
            .is_some_and(|topic| !topic.trim().is_empty())
        {
            return true;
        }
        if let Err(e) = ctx.responder.send_ephemeral(BLANK_TOPIC_NOTICE).await {
            debug!("Could not tell user {} the topic was blank: {e}", ctx.user_id);
        }
        false
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
        let topic = ctx.modal_field(TOPIC_INPUT).unwrap_or_default().trim();
        let details = ctx.modal_field(DETAILS_INPUT).unwrap_or_default().trim();

        info!("Feedback from user {}: {topic}", ctx.user_id);

        let reply = if details.is_empty() {
            format!("📝 Thanks for the feedback on **{topic}**!")
        } else {
            format!("📝 Thanks for the feedback on **{topic}**!\n\n> {details}")
        };
        ctx.responder
            .send_ephemeral(&truncate_for_message(&reply))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::context::testing::{context, MockResponder, Reply};
    use crate::components::definition::ComponentType;
    use crate::components::handler::{ComponentHandler, DispatchOutcome};
    use crate::components::registry::ComponentRegistry;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_modal_definition_is_valid() {
        FeedbackModal::new()
            .definition()
            .check(FEEDBACK_MODAL_ID)
            .unwrap();
    }

    #[tokio::test]
    async fn test_button_opens_modal() {
        let responder = Arc::new(MockResponder::default());
        let ctx = context(FEEDBACK_BUTTON_ID, "1", ComponentType::Button, &responder);

        FeedbackButton::new().execute(&ctx).await.unwrap();
        assert_eq!(
            responder.replies(),
            vec![Reply::Modal(FEEDBACK_MODAL_ID.to_string())]
        );
    }

    #[tokio::test]
    async fn test_modal_requires_topic() {
        let responder = Arc::new(MockResponder::default());
        let mut fields = HashMap::new();
        fields.insert(TOPIC_INPUT.to_string(), "   ".to_string());
        let ctx = context(FEEDBACK_MODAL_ID, "1", ComponentType::Modal, &responder)
            .with_modal_fields(fields);

        assert!(!FeedbackModal::new().validate(&ctx).await);
        assert_eq!(
            responder.replies(),
            vec![Reply::Ephemeral(BLANK_TOPIC_NOTICE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_blank_topic_dispatch_replies_once() {
        let registry = Arc::new(ComponentRegistry::new());
        registry.register(Arc::new(FeedbackModal::new()));
        let handler = ComponentHandler::new(registry);
        let responder = Arc::new(MockResponder::default());
        let ctx = context(FEEDBACK_MODAL_ID, "1", ComponentType::Modal, &responder)
            .with_modal_fields(HashMap::new());

        assert_eq!(
            handler.dispatch(FEEDBACK_MODAL_ID, &ctx).await,
            DispatchOutcome::Rejected
        );
        assert_eq!(responder.ephemeral_count(), 1);
    }

    #[tokio::test]
    async fn test_modal_replies_with_fields() {
        let responder = Arc::new(MockResponder::default());
        let mut fields = HashMap::new();
        fields.insert(TOPIC_INPUT.to_string(), "Buttons".to_string());
        fields.insert(DETAILS_INPUT.to_string(), "They work".to_string());
        let ctx = context(FEEDBACK_MODAL_ID, "1", ComponentType::Modal, &responder)
            .with_modal_fields(fields);

        FeedbackModal::new()
            .execute_with_validation(&ctx)
            .await
            .unwrap();
        assert_eq!(
            responder.replies(),
            vec![Reply::Ephemeral(
                "📝 Thanks for the feedback on **Buttons**!\n\n> They work".to_string()
            )]
        );
    }
}
