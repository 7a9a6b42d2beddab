//! # Component Definitions
//!
//! The closed set of interactive element variants, their Discord limits, and the single
//! boundary where they turn into outbound payloads.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use serenity::builder::CreateComponents;

use super::error::{ComponentError, Result};
use crate::core::response::{
    BUTTON_LABEL_LIMIT, CUSTOM_ID_LIMIT, MODAL_TEXT_LIMIT, OPTION_TEXT_LIMIT, PLACEHOLDER_LIMIT,
};

/// Max values a select menu may require or allow
pub const SELECT_VALUES_LIMIT: u8 = 25;
/// Max options in a string select
pub const SELECT_OPTIONS_LIMIT: usize = 25;
/// Max text inputs in one modal
pub const MODAL_INPUTS_LIMIT: usize = 5;
/// Max length bound of a text input
pub const TEXT_INPUT_LENGTH_LIMIT: u16 = 4000;
/// Max action rows on a message
pub const ACTION_ROWS_LIMIT: usize = 5;
/// Max buttons in one action row
pub const BUTTONS_PER_ROW: usize = 5;

/// Variant tag of an interactive component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Button,
    StringSelect,
    UserSelect,
    RoleSelect,
    ChannelSelect,
    MentionableSelect,
    Modal,
}

impl ComponentType {
    /// Map a Discord component type number to a tag
    ///
    /// Modals have no component number; modal submissions are tagged by the transport.
    pub fn from_discord(kind: u8) -> Option<Self> {
        match kind {
            2 => Some(ComponentType::Button),
            3 => Some(ComponentType::StringSelect),
            5 => Some(ComponentType::UserSelect),
            6 => Some(ComponentType::RoleSelect),
            7 => Some(ComponentType::MentionableSelect),
            8 => Some(ComponentType::ChannelSelect),
            _ => None,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(
            self,
            ComponentType::StringSelect
                | ComponentType::UserSelect
                | ComponentType::RoleSelect
                | ComponentType::ChannelSelect
                | ComponentType::MentionableSelect
        )
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentType::Button => write!(f, "button"),
            ComponentType::StringSelect => write!(f, "string_select"),
            ComponentType::UserSelect => write!(f, "user_select"),
            ComponentType::RoleSelect => write!(f, "role_select"),
            ComponentType::ChannelSelect => write!(f, "channel_select"),
            ComponentType::MentionableSelect => write!(f, "mentionable_select"),
            ComponentType::Modal => write!(f, "modal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

impl ButtonStyle {
    fn discord_value(&self) -> u8 {
        match self {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub style: ButtonStyle,
    pub label: String,
    /// Unicode emoji, or a custom emoji in `<:name:id>` / `<a:name:id>` form
    pub emoji: Option<String>,
    pub disabled: bool,
}

impl Button {
    pub fn new(style: ButtonStyle, label: impl Into<String>) -> Self {
        Self {
            style,
            label: label.into(),
            emoji: None,
            disabled: false,
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            default: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Which entities a select menu picks from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectKind {
    String { options: Vec<SelectOption> },
    User,
    Role,
    Channel,
    Mentionable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    pub kind: SelectKind,
    pub placeholder: Option<String>,
    pub min_values: u8,
    pub max_values: u8,
    pub disabled: bool,
}

impl SelectMenu {
    pub fn new(kind: SelectKind) -> Self {
        Self {
            kind,
            placeholder: None,
            min_values: 1,
            max_values: 1,
            disabled: false,
        }
    }

    pub fn string(options: Vec<SelectOption>) -> Self {
        Self::new(SelectKind::String { options })
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn values(mut self, min_values: u8, max_values: u8) -> Self {
        self.min_values = min_values;
        self.max_values = max_values;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextInputStyle {
    Short,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInput {
    pub custom_id: String,
    pub label: String,
    pub style: TextInputStyle,
    pub required: bool,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub placeholder: Option<String>,
}

impl TextInput {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: TextInputStyle) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
            style,
            required: true,
            min_length: None,
            max_length: None,
            placeholder: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn length(mut self, min_length: Option<u16>, max_length: Option<u16>) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modal {
    pub title: String,
    pub inputs: Vec<TextInput>,
}

impl Modal {
    pub fn new(title: impl Into<String>, inputs: Vec<TextInput>) -> Self {
        Self {
            title: title.into(),
            inputs,
        }
    }

    /// Action rows holding one text input each
    pub fn render_inputs(&self) -> CreateComponents {
        let rows = self
            .inputs
            .iter()
            .map(|input| action_row(vec![text_input_payload(input)]))
            .collect();
        CreateComponents(rows)
    }
}

/// Shape of one interactive element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentDefinition {
    Button(Button),
    SelectMenu(SelectMenu),
    Modal(Modal),
}

impl ComponentDefinition {
    pub fn type_tag(&self) -> ComponentType {
        match self {
            ComponentDefinition::Button(_) => ComponentType::Button,
            ComponentDefinition::SelectMenu(menu) => match menu.kind {
                SelectKind::String { .. } => ComponentType::StringSelect,
                SelectKind::User => ComponentType::UserSelect,
                SelectKind::Role => ComponentType::RoleSelect,
                SelectKind::Channel => ComponentType::ChannelSelect,
                SelectKind::Mentionable => ComponentType::MentionableSelect,
            },
            ComponentDefinition::Modal(_) => ComponentType::Modal,
        }
    }

    /// Check the definition against Discord's limits for the given custom id
    pub fn check(&self, custom_id: &str) -> Result<()> {
        check_custom_id(custom_id)?;

        match self {
            ComponentDefinition::Button(button) => {
                let len = button.label.chars().count();
                if len == 0 && button.emoji.is_none() {
                    return Err(ComponentError::definition(
                        "button",
                        custom_id,
                        "needs a label or an emoji",
                    ));
                }
                if len > BUTTON_LABEL_LIMIT {
                    return Err(ComponentError::definition(
                        "button",
                        custom_id,
                        format!("label is {len} characters, limit is {BUTTON_LABEL_LIMIT}"),
                    ));
                }
            }
            ComponentDefinition::SelectMenu(menu) => check_select(custom_id, menu)?,
            ComponentDefinition::Modal(modal) => check_modal(custom_id, modal)?,
        }

        Ok(())
    }

    /// Discord JSON payload for a message component
    ///
    /// Modals are not message components and yield `None`; they are opened through a
    /// responder with [`Modal::render_inputs`].
    pub fn to_payload(&self, custom_id: &str) -> Option<Value> {
        match self {
            ComponentDefinition::Button(button) => {
                let mut payload = json!({
                    "type": 2,
                    "style": button.style.discord_value(),
                    "custom_id": custom_id,
                    "disabled": button.disabled,
                });
                if !button.label.is_empty() {
                    payload["label"] = json!(button.label);
                }
                if let Some(emoji) = &button.emoji {
                    payload["emoji"] = emoji_payload(emoji);
                }
                Some(payload)
            }
            ComponentDefinition::SelectMenu(menu) => {
                let kind = match menu.kind {
                    SelectKind::String { .. } => 3,
                    SelectKind::User => 5,
                    SelectKind::Role => 6,
                    SelectKind::Mentionable => 7,
                    SelectKind::Channel => 8,
                };
                let mut payload = json!({
                    "type": kind,
                    "custom_id": custom_id,
                    "min_values": menu.min_values,
                    "max_values": menu.max_values,
                    "disabled": menu.disabled,
                });
                if let Some(placeholder) = &menu.placeholder {
                    payload["placeholder"] = json!(placeholder);
                }
                if let SelectKind::String { options } = &menu.kind {
                    payload["options"] = Value::Array(options.iter().map(option_payload).collect());
                }
                Some(payload)
            }
            ComponentDefinition::Modal(_) => None,
        }
    }
}

fn check_custom_id(custom_id: &str) -> Result<()> {
    if custom_id.is_empty() {
        return Err(ComponentError::invalid_id(custom_id, "must not be empty"));
    }
    if !custom_id.is_ascii() {
        return Err(ComponentError::invalid_id(custom_id, "must be ASCII"));
    }
    if custom_id.len() > CUSTOM_ID_LIMIT {
        return Err(ComponentError::invalid_id(
            custom_id,
            format!("is {} characters, limit is {CUSTOM_ID_LIMIT}", custom_id.len()),
        ));
    }
    Ok(())
}

fn check_select(custom_id: &str, menu: &SelectMenu) -> Result<()> {
    let fail = |reason: String| Err(ComponentError::definition("select menu", custom_id, reason));

    let values = 1..=SELECT_VALUES_LIMIT;
    if !values.contains(&menu.min_values) || !values.contains(&menu.max_values) {
        return fail(format!(
            "min/max values must be within 1..={SELECT_VALUES_LIMIT}, got {}/{}",
            menu.min_values, menu.max_values
        ));
    }
    if menu.min_values > menu.max_values {
        return fail(format!(
            "min values {} exceeds max values {}",
            menu.min_values, menu.max_values
        ));
    }
    if let Some(placeholder) = &menu.placeholder {
        if placeholder.chars().count() > PLACEHOLDER_LIMIT {
            return fail(format!("placeholder exceeds {PLACEHOLDER_LIMIT} characters"));
        }
    }
    if let SelectKind::String { options } = &menu.kind {
        if options.is_empty() || options.len() > SELECT_OPTIONS_LIMIT {
            return fail(format!(
                "needs 1..={SELECT_OPTIONS_LIMIT} options, got {}",
                options.len()
            ));
        }
        if usize::from(menu.max_values) > options.len() {
            return fail(format!(
                "max values {} exceeds the {} available options",
                menu.max_values,
                options.len()
            ));
        }
        for option in options {
            let too_long = |text: &str| text.chars().count() > OPTION_TEXT_LIMIT;
            if option.label.is_empty()
                || too_long(&option.label)
                || option.value.is_empty()
                || too_long(&option.value)
                || option.description.as_deref().is_some_and(too_long)
            {
                return fail(format!(
                    "option '{}' must have label and value of 1..={OPTION_TEXT_LIMIT} characters",
                    option.value
                ));
            }
        }
    }
    Ok(())
}

fn check_modal(custom_id: &str, modal: &Modal) -> Result<()> {
    let fail = |reason: String| Err(ComponentError::definition("modal", custom_id, reason));

    let title_len = modal.title.chars().count();
    if title_len == 0 || title_len > MODAL_TEXT_LIMIT {
        return fail(format!("title must be 1..={MODAL_TEXT_LIMIT} characters"));
    }
    if modal.inputs.is_empty() || modal.inputs.len() > MODAL_INPUTS_LIMIT {
        return fail(format!(
            "needs 1..={MODAL_INPUTS_LIMIT} text inputs, got {}",
            modal.inputs.len()
        ));
    }
    for input in &modal.inputs {
        check_custom_id(&input.custom_id)?;
        let label_len = input.label.chars().count();
        if label_len == 0 || label_len > MODAL_TEXT_LIMIT {
            return fail(format!(
                "input '{}' label must be 1..={MODAL_TEXT_LIMIT} characters",
                input.custom_id
            ));
        }
        let min = input.min_length.unwrap_or(0);
        let max = input.max_length.unwrap_or(TEXT_INPUT_LENGTH_LIMIT);
        if min > TEXT_INPUT_LENGTH_LIMIT || max > TEXT_INPUT_LENGTH_LIMIT || min > max {
            return fail(format!(
                "input '{}' lengths must satisfy 0 <= min <= max <= {TEXT_INPUT_LENGTH_LIMIT}",
                input.custom_id
            ));
        }
    }
    Ok(())
}

fn action_row(components: Vec<Value>) -> Value {
    json!({ "type": 1, "components": components })
}

fn option_payload(option: &SelectOption) -> Value {
    let mut payload = json!({
        "label": option.label,
        "value": option.value,
        "default": option.default,
    });
    if let Some(description) = &option.description {
        payload["description"] = json!(description);
    }
    payload
}

fn text_input_payload(input: &TextInput) -> Value {
    let mut payload = Map::new();
    payload.insert("type".into(), json!(4));
    payload.insert("custom_id".into(), json!(input.custom_id));
    payload.insert("label".into(), json!(input.label));
    let style = match input.style {
        TextInputStyle::Short => 1,
        TextInputStyle::Paragraph => 2,
    };
    payload.insert("style".into(), json!(style));
    payload.insert("required".into(), json!(input.required));
    if let Some(min) = input.min_length {
        payload.insert("min_length".into(), json!(min));
    }
    if let Some(max) = input.max_length {
        payload.insert("max_length".into(), json!(max));
    }
    if let Some(placeholder) = &input.placeholder {
        payload.insert("placeholder".into(), json!(placeholder));
    }
    Value::Object(payload)
}

/// `<:name:id>` and `<a:name:id>` become custom emoji references, anything else is unicode
fn emoji_payload(emoji: &str) -> Value {
    let custom = emoji
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|inner| inner.split(':').collect::<Vec<_>>());

    match custom.as_deref() {
        Some([animated, name, id]) if *animated == "a" || animated.is_empty() => {
            json!({ "name": name, "id": id, "animated": *animated == "a" })
        }
        _ => json!({ "name": emoji }),
    }
}

/// Lay out message components as Discord action rows
///
/// Consecutive buttons share a row (five per row); each select menu takes a row of its own.
/// Modals cannot appear on a message.
pub fn render_rows<'a, I>(items: I) -> Result<CreateComponents>
where
    I: IntoIterator<Item = (&'a str, &'a ComponentDefinition)>,
{
    let mut rows: Vec<Value> = Vec::new();
    let mut buttons: Vec<Value> = Vec::new();

    for (custom_id, definition) in items {
        definition.check(custom_id)?;
        let payload = definition.to_payload(custom_id).ok_or_else(|| {
            ComponentError::definition("modal", custom_id, "cannot be attached to a message")
        })?;

        match definition {
            ComponentDefinition::Button(_) => {
                buttons.push(payload);
                if buttons.len() == BUTTONS_PER_ROW {
                    rows.push(action_row(std::mem::take(&mut buttons)));
                }
            }
            _ => {
                if !buttons.is_empty() {
                    rows.push(action_row(std::mem::take(&mut buttons)));
                }
                rows.push(action_row(vec![payload]));
            }
        }
    }
    if !buttons.is_empty() {
        rows.push(action_row(buttons));
    }

    if rows.len() > ACTION_ROWS_LIMIT {
        return Err(ComponentError::definition(
            "message",
            "",
            format!("needs {} action rows, limit is {ACTION_ROWS_LIMIT}", rows.len()),
        ));
    }

    Ok(CreateComponents(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(label: &str) -> ComponentDefinition {
        ComponentDefinition::Button(Button::new(ButtonStyle::Primary, label))
    }

    #[test]
    fn test_type_tag_covers_select_kinds() {
        let user = ComponentDefinition::SelectMenu(SelectMenu::new(SelectKind::User));
        assert_eq!(user.type_tag(), ComponentType::UserSelect);
        let string = ComponentDefinition::SelectMenu(SelectMenu::string(vec![SelectOption::new(
            "A", "a",
        )]));
        assert_eq!(string.type_tag(), ComponentType::StringSelect);
        assert!(string.type_tag().is_select());
        assert_eq!(button("x").type_tag(), ComponentType::Button);
    }

    #[test]
    fn test_from_discord_numbers() {
        assert_eq!(ComponentType::from_discord(2), Some(ComponentType::Button));
        assert_eq!(ComponentType::from_discord(8), Some(ComponentType::ChannelSelect));
        assert_eq!(ComponentType::from_discord(4), None);
    }

    #[test]
    fn test_check_rejects_long_custom_id() {
        let id = format!("ns:{}", "x".repeat(120));
        assert!(matches!(
            button("ok").check(&id),
            Err(ComponentError::InvalidCustomId { .. })
        ));
    }

    #[test]
    fn test_check_select_value_bounds() {
        let options = vec![SelectOption::new("A", "a"), SelectOption::new("B", "b")];
        let ok = ComponentDefinition::SelectMenu(SelectMenu::string(options.clone()).values(1, 2));
        assert!(ok.check("ns:pick").is_ok());

        let too_many = ComponentDefinition::SelectMenu(SelectMenu::string(options).values(1, 3));
        assert!(too_many.check("ns:pick").is_err());

        let zero = ComponentDefinition::SelectMenu(SelectMenu::new(SelectKind::Role).values(0, 1));
        assert!(zero.check("ns:roles").is_err());

        let inverted =
            ComponentDefinition::SelectMenu(SelectMenu::new(SelectKind::Role).values(5, 2));
        assert!(inverted.check("ns:roles").is_err());
    }

    #[test]
    fn test_check_modal_limits() {
        let input = TextInput::new("topic", "Topic", TextInputStyle::Short);
        let ok = ComponentDefinition::Modal(Modal::new("Feedback", vec![input.clone()]));
        assert!(ok.check("ns:modal").is_ok());

        let long_title = ComponentDefinition::Modal(Modal::new("t".repeat(46), vec![input.clone()]));
        assert!(long_title.check("ns:modal").is_err());

        let no_inputs = ComponentDefinition::Modal(Modal::new("Feedback", vec![]));
        assert!(no_inputs.check("ns:modal").is_err());

        let six = ComponentDefinition::Modal(Modal::new("Feedback", vec![input; 6]));
        assert!(six.check("ns:modal").is_err());

        let bad_length = ComponentDefinition::Modal(Modal::new(
            "Feedback",
            vec![TextInput::new("t", "T", TextInputStyle::Paragraph).length(Some(10), Some(4001))],
        ));
        assert!(bad_length.check("ns:modal").is_err());
    }

    #[test]
    fn test_button_payload() {
        let definition = ComponentDefinition::Button(
            Button::new(ButtonStyle::Danger, "Delete").emoji("<:trash:123>"),
        );
        let payload = definition.to_payload("ns:delete").unwrap();
        assert_eq!(payload["type"], 2);
        assert_eq!(payload["style"], 4);
        assert_eq!(payload["custom_id"], "ns:delete");
        assert_eq!(payload["emoji"]["id"], "123");
        assert_eq!(payload["emoji"]["name"], "trash");
    }

    #[test]
    fn test_unicode_emoji_payload() {
        assert_eq!(emoji_payload("✅"), json!({ "name": "✅" }));
    }

    #[test]
    fn test_render_rows_packs_buttons() {
        let defs: Vec<(String, ComponentDefinition)> = (0..7)
            .map(|i| (format!("ns:b{i}"), button("b")))
            .collect();
        let rows = render_rows(defs.iter().map(|(id, d)| (id.as_str(), d))).unwrap();
        assert_eq!(rows.0.len(), 2);
        assert_eq!(rows.0[0]["components"].as_array().unwrap().len(), 5);
        assert_eq!(rows.0[1]["components"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_rows_select_gets_own_row() {
        let select =
            ComponentDefinition::SelectMenu(SelectMenu::string(vec![SelectOption::new("A", "a")]));
        let first = button("one");
        let rows = render_rows(vec![("ns:one", &first), ("ns:pick", &select)]).unwrap();
        assert_eq!(rows.0.len(), 2);
        assert_eq!(rows.0[1]["components"][0]["type"], 3);
    }

    #[test]
    fn test_render_rows_rejects_modal() {
        let modal = ComponentDefinition::Modal(Modal::new(
            "Feedback",
            vec![TextInput::new("topic", "Topic", TextInputStyle::Short)],
        ));
        assert!(render_rows(vec![("ns:modal", &modal)]).is_err());
    }

    #[test]
    fn test_modal_render_inputs() {
        let modal = Modal::new(
            "Feedback",
            vec![
                TextInput::new("topic", "Topic", TextInputStyle::Short),
                TextInput::new("details", "Details", TextInputStyle::Paragraph).required(false),
            ],
        );
        let rows = modal.render_inputs();
        assert_eq!(rows.0.len(), 2);
        assert_eq!(rows.0[1]["components"][0]["style"], 2);
        assert_eq!(rows.0[1]["components"][0]["required"], false);
    }
}
