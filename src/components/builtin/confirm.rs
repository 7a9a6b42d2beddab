//! Confirmation buttons built from their custom id
//!
//! `util:confirm:<action>[:success|danger]`: one factory covers every action. Without an
//! explicit style the action's own suffix decides it.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

use crate::components::component::Component;
use crate::components::context::ComponentContext;
use crate::components::definition::{Button, ButtonStyle, ComponentDefinition};
use crate::components::error::{ComponentError, Result as ComponentResult};
use crate::components::factory::ComponentFactory;
use crate::core::response::{truncate_chars, BUTTON_LABEL_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStyle {
    Success,
    Danger,
}

impl ConfirmStyle {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "success" => Some(ConfirmStyle::Success),
            "danger" => Some(ConfirmStyle::Danger),
            _ => None,
        }
    }

    /// Infer the style from how the action name ends
    pub fn infer(action: &str) -> Self {
        if action.ends_with("-danger") || action.ends_with("-cancel") {
            ConfirmStyle::Danger
        } else {
            // "-success", "-confirm" and everything else
            ConfirmStyle::Success
        }
    }

    fn button_style(&self) -> ButtonStyle {
        match self {
            ConfirmStyle::Success => ButtonStyle::Success,
            ConfirmStyle::Danger => ButtonStyle::Danger,
        }
    }
}

/// A confirm button for one action
pub struct ConfirmButton {
    custom_id: String,
    action: String,
    style: ConfirmStyle,
    definition: ComponentDefinition,
}

impl ConfirmButton {
    pub fn new(custom_id: String, action: String, style: ConfirmStyle) -> Self {
        let label = truncate_chars(&format!("Confirm {action}"), BUTTON_LABEL_LIMIT);
        let definition =
            ComponentDefinition::Button(Button::new(style.button_style(), label).emoji(match style {
                ConfirmStyle::Success => "✅",
                ConfirmStyle::Danger => "⚠️",
            }));
        Self {
            custom_id,
            action,
            style,
            definition,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn style(&self) -> ConfirmStyle {
        self.style
    }
}

#[async_trait]
impl Component for ConfirmButton {
    fn custom_id(&self) -> &str {
        &self.custom_id
    }

    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
        let content = match self.style {
            ConfirmStyle::Success => format!("✅ Action confirmed: {}", self.action),
            ConfirmStyle::Danger => format!("⚠️ Action confirmed: {}", self.action),
        };
        ctx.responder.send_ephemeral(&content).await
    }
}

/// Factory for `<namespace>:confirm:<action>[:success|danger]`
pub struct ConfirmButtonFactory {
    pattern: Regex,
}

impl ConfirmButtonFactory {
    pub fn new(namespace: &str) -> std::result::Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^{}:confirm:(.+?)(?::(success|danger))?$",
            regex::escape(namespace)
        ))?;
        Ok(Self { pattern })
    }

    /// Custom id for a confirm button; `style` None lets the action name decide
    pub fn custom_id(namespace: &str, action: &str, style: Option<ConfirmStyle>) -> String {
        match style {
            Some(ConfirmStyle::Success) => format!("{namespace}:confirm:{action}:success"),
            Some(ConfirmStyle::Danger) => format!("{namespace}:confirm:{action}:danger"),
            None => format!("{namespace}:confirm:{action}"),
        }
    }

    /// Action and style encoded in a matching custom id
    pub fn parse(&self, custom_id: &str) -> Option<(String, ConfirmStyle)> {
        let captures = self.pattern.captures(custom_id)?;
        let action = captures.get(1)?.as_str().to_string();
        let style = captures
            .get(2)
            .and_then(|m| ConfirmStyle::from_suffix(m.as_str()))
            .unwrap_or_else(|| ConfirmStyle::infer(&action));
        Some((action, style))
    }
}

impl ComponentFactory for ConfirmButtonFactory {
    fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn can_handle(&self, custom_id: &str) -> bool {
        self.pattern.is_match(custom_id)
    }

    fn create(
        &self,
        custom_id: &str,
        _ctx: Option<&ComponentContext>,
    ) -> ComponentResult<Arc<dyn Component>> {
        let (action, style) = self
            .parse(custom_id)
            .ok_or_else(|| ComponentError::Construction {
                pattern: self.pattern.as_str().to_string(),
                custom_id: custom_id.to_string(),
                reason: "custom id does not match the confirm pattern".to_string(),
            })?;
        Ok(Arc::new(ConfirmButton::new(
            custom_id.to_string(),
            action,
            style,
        )))
    }
}
