//! Serenity-backed responder and context construction
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::components::context::{ComponentContext, Responder};
use crate::components::definition::{ComponentType, Modal};
use crate::components::error::ComponentError;
use crate::core::response::truncate_for_message;

enum Target {
    Component(MessageComponentInteraction),
    Modal(ModalSubmitInteraction),
}

/// Run the same body against whichever interaction kind the target holds
macro_rules! on_target {
    ($target:expr, $interaction:ident => $body:expr) => {
        match $target {
            Target::Component($interaction) => $body,
            Target::Modal($interaction) => $body,
        }
    };
}

/// Responder for one component or modal-submit interaction
pub struct SerenityResponder {
    http: Arc<Http>,
    target: Target,
    acknowledged: AtomicBool,
}

impl SerenityResponder {
    pub fn for_component(http: Arc<Http>, interaction: MessageComponentInteraction) -> Self {
        Self {
            http,
            target: Target::Component(interaction),
            acknowledged: AtomicBool::new(false),
        }
    }

    pub fn for_modal(http: Arc<Http>, interaction: ModalSubmitInteraction) -> Self {
        Self {
            http,
            target: Target::Modal(interaction),
            acknowledged: AtomicBool::new(false),
        }
    }

    fn mark_acknowledged(&self) {
        self.acknowledged.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Responder for SerenityResponder {
    async fn send_ephemeral(&self, content: &str) -> Result<()> {
        let content = truncate_for_message(content);

        if self.is_acknowledged() {
            on_target!(&self.target, interaction => {
                interaction
                    .create_followup_message(&self.http, |followup| {
                        followup.content(&content).ephemeral(true)
                    })
                    .await?;
            });
            return Ok(());
        }

        on_target!(&self.target, interaction => {
            interaction
                .create_interaction_response(&self.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content(&content).ephemeral(true)
                        })
                })
                .await?;
        });
        self.mark_acknowledged();
        Ok(())
    }

    async fn send_message(
        &self,
        content: &str,
        components: Option<CreateComponents>,
    ) -> Result<()> {
        let content = truncate_for_message(content);
        let components = components.unwrap_or_default();

        if self.is_acknowledged() {
            on_target!(&self.target, interaction => {
                let rows = components.clone();
                interaction
                    .create_followup_message(&self.http, move |followup| {
                        followup.content(&content).components(move |c| {
                            *c = rows;
                            c
                        })
                    })
                    .await?;
            });
            return Ok(());
        }

        on_target!(&self.target, interaction => {
            let rows = components.clone();
            interaction
                .create_interaction_response(&self.http, move |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(move |message| {
                            message.content(&content).set_components(rows)
                        })
                })
                .await?;
        });
        self.mark_acknowledged();
        Ok(())
    }

    async fn update_message(
        &self,
        content: &str,
        components: Option<CreateComponents>,
    ) -> Result<()> {
        let content = truncate_for_message(content);

        if self.is_acknowledged() {
            on_target!(&self.target, interaction => {
                let rows = components.clone();
                interaction
                    .edit_original_interaction_response(&self.http, move |response| {
                        response.content(&content);
                        if let Some(rows) = rows {
                            response.components(move |c| {
                                *c = rows;
                                c
                            });
                        }
                        response
                    })
                    .await?;
            });
            return Ok(());
        }

        on_target!(&self.target, interaction => {
            let rows = components.clone();
            interaction
                .create_interaction_response(&self.http, move |response| {
                    response
                        .kind(InteractionResponseType::UpdateMessage)
                        .interaction_response_data(move |message| {
                            message.content(&content);
                            if let Some(rows) = rows {
                                message.set_components(rows);
                            }
                            message
                        })
                })
                .await?;
        });
        self.mark_acknowledged();
        Ok(())
    }

    async fn show_modal(&self, custom_id: &str, modal: &Modal) -> Result<()> {
        let interaction = match &self.target {
            Target::Component(interaction) => interaction,
            Target::Modal(_) => return Err(ComponentError::ModalFromModal.into()),
        };
        if self.is_acknowledged() {
            anyhow::bail!("Cannot open modal {custom_id}: interaction already acknowledged");
        }

        let title = modal.title.clone();
        let rows = modal.render_inputs();
        interaction
            .create_interaction_response(&self.http, move |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(move |data| {
                        data.custom_id(custom_id).title(title).set_components(rows)
                    })
            })
            .await?;
        self.mark_acknowledged();
        Ok(())
    }

    fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }
}

/// Tag for a Discord component type number; unknown numbers fall back to a button
fn component_type_of(kind: u8, custom_id: &str) -> ComponentType {
    ComponentType::from_discord(kind).unwrap_or_else(|| {
        debug!("Unknown component type {kind} on {custom_id}, treating it as a button");
        ComponentType::Button
    })
}

/// Build the dispatch context for a button or select menu interaction
pub fn component_context(http: Arc<Http>, interaction: MessageComponentInteraction) -> ComponentContext {
    let component_type = component_type_of(
        interaction.data.component_type as u8,
        &interaction.data.custom_id,
    );
    let values = interaction.data.values.clone();
    let responder = Arc::new(SerenityResponder::for_component(http, interaction.clone()));

    let ctx = ComponentContext::new(
        interaction.data.custom_id.clone(),
        interaction.user.id.to_string(),
        component_type,
        responder,
    )
    .with_guild(interaction.guild_id.map(|id| id.to_string()))
    .with_channel(Some(interaction.channel_id.to_string()))
    .with_message(Some(interaction.message.id.to_string()))
    .with_interaction(Interaction::MessageComponent(interaction));

    if component_type.is_select() {
        ctx.with_selected_values(values)
    } else {
        ctx
    }
}

/// Build the dispatch context for a modal submission
pub fn modal_context(http: Arc<Http>, interaction: ModalSubmitInteraction) -> ComponentContext {
    let fields: HashMap<String, String> = interaction
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => {
                Some((input.custom_id.clone(), input.value.clone()))
            }
            _ => None,
        })
        .collect();
    let responder = Arc::new(SerenityResponder::for_modal(http, interaction.clone()));

    ComponentContext::new(
        interaction.data.custom_id.clone(),
        interaction.user.id.to_string(),
        ComponentType::Modal,
        responder,
    )
    .with_guild(interaction.guild_id.map(|id| id.to_string()))
    .with_channel(Some(interaction.channel_id.to_string()))
    .with_message(interaction.message.as_ref().map(|m| m.id.to_string()))
    .with_modal_fields(fields)
    .with_interaction(Interaction::ModalSubmit(interaction))
}
