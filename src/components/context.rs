//! Interaction context handed to components, and the responder capability they reply through

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateComponents;
use serenity::model::application::interaction::Interaction;
use std::collections::HashMap;
use std::sync::Arc;

use super::definition::{ComponentType, Modal};

/// Capability for acknowledging and replying to one interaction
///
/// The transport provides an implementation per inbound interaction. Components use it for
/// their own replies and the dispatcher uses it for best-effort failure notices.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Reply visible only to the invoking user
    ///
    /// Delivered as a follow-up when the interaction was already acknowledged.
    async fn send_ephemeral(&self, content: &str) -> Result<()>;

    /// Reply with a public message in the channel
    async fn send_message(&self, content: &str, components: Option<CreateComponents>)
        -> Result<()>;

    /// Edit the message the component is attached to
    ///
    /// `Some(CreateComponents::default())` clears its components.
    async fn update_message(
        &self,
        content: &str,
        components: Option<CreateComponents>,
    ) -> Result<()>;

    /// Open a modal form; only valid as the first response to a component interaction
    async fn show_modal(&self, custom_id: &str, modal: &Modal) -> Result<()>;

    /// Whether an initial response has already been sent
    fn is_acknowledged(&self) -> bool;
}

/// Everything a component knows about the interaction that triggered it
#[derive(Clone)]
pub struct ComponentContext {
    /// Raw interaction, when the transport has one
    pub interaction: Option<Arc<Interaction>>,
    pub responder: Arc<dyn Responder>,
    pub guild_id: Option<String>,
    pub user_id: String,
    pub channel_id: Option<String>,
    /// Message the component was attached to
    pub message_id: Option<String>,
    pub custom_id: String,
    /// Selected values in submission order (select menus only)
    pub selected_values: Option<Vec<String>>,
    pub component_type: ComponentType,
    /// Submitted text input values keyed by input custom id (modals only)
    pub modal_fields: Option<HashMap<String, String>>,
}

impl ComponentContext {
    pub fn new(
        custom_id: impl Into<String>,
        user_id: impl Into<String>,
        component_type: ComponentType,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            interaction: None,
            responder,
            guild_id: None,
            user_id: user_id.into(),
            channel_id: None,
            message_id: None,
            custom_id: custom_id.into(),
            selected_values: None,
            component_type,
            modal_fields: None,
        }
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(Arc::new(interaction));
        self
    }

    pub fn with_guild(mut self, guild_id: Option<String>) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn with_channel(mut self, channel_id: Option<String>) -> Self {
        self.channel_id = channel_id;
        self
    }

    pub fn with_message(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn with_selected_values(mut self, values: Vec<String>) -> Self {
        self.selected_values = Some(values);
        self
    }

    pub fn with_modal_fields(mut self, fields: HashMap<String, String>) -> Self {
        self.modal_fields = Some(fields);
        self
    }

    /// Value of a submitted modal text input
    pub fn modal_field(&self, input_id: &str) -> Option<&str> {
        self.modal_fields
            .as_ref()
            .and_then(|fields| fields.get(input_id))
            .map(String::as_str)
    }

    /// Selected values, empty for non-select interactions
    pub fn values(&self) -> &[String] {
        self.selected_values.as_deref().unwrap_or_default()
    }
}
