//! Single-use select menu owned by the user it was posted for

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::builder::CreateComponents;
use std::time::Duration;

use crate::components::component::Component;
use crate::components::context::ComponentContext;
use crate::components::definition::{ComponentDefinition, SelectMenu, SelectOption};
use crate::core::response::{truncate_chars, OPTION_TEXT_LIMIT};

/// How long an unanswered choice stays live
pub const CHOICE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub struct ChoiceMenu {
    custom_id: String,
    owner_id: String,
    definition: ComponentDefinition,
}

impl ChoiceMenu {
    /// `choices` are (label, value) pairs; labels are cut to fit Discord's option limit
    pub fn new(custom_id: String, owner_id: String, prompt: &str, choices: &[(&str, &str)]) -> Self {
        let options = choices
            .iter()
            .map(|(label, value)| SelectOption::new(truncate_chars(label, OPTION_TEXT_LIMIT), *value))
            .collect();
        Self {
            custom_id,
            owner_id,
            definition: ComponentDefinition::SelectMenu(SelectMenu::string(options).placeholder(prompt)),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[async_trait]
impl Component for ChoiceMenu {
    fn custom_id(&self) -> &str {
        &self.custom_id
    }

    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn once(&self) -> bool {
        true
    }

    fn timeout(&self) -> Option<Duration> {
        Some(CHOICE_TIMEOUT)
    }

    async fn validate(&self, ctx: &ComponentContext) -> bool {
        if ctx.user_id == self.owner_id {
            return true;
        }
        if let Err(e) = ctx
            .responder
            .send_ephemeral("🚫 This menu belongs to someone else.")
            .await
        {
            debug!("Could not tell user {} the menu is not theirs: {e}", ctx.user_id);
        }
        false
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
        let picked = ctx.values().join(", ");
        ctx.responder
            .update_message(
                &format!("You picked **{picked}**."),
                Some(CreateComponents::default()),
            )
            .await
    }
}
