//! Whitelist form components
//!
//! The prompt message carries a single button; pressing it opens a modal
//! with four short text inputs whose values become a [`WhitelistForm`].

use rankboard::WhitelistForm;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, CreateModal,
};
use serenity::model::application::{ActionRow, ActionRowComponent, ButtonStyle, InputTextStyle};

/// Custom id of the "start whitelist" button
pub const START_BUTTON_ID: &str = "start_wl";
/// Custom id of the whitelist modal
pub const FORM_MODAL_ID: &str = "wl_form";

pub const FIELD_NAME: &str = "nome";
pub const FIELD_GAME_ID: &str = "id";
pub const FIELD_RECRUITER_NAME: &str = "recrutadorNome";
pub const FIELD_RECRUITER_ID: &str = "recrutadorId";

/// Text of the prompt message; also how an existing prompt is recognised
pub const PROMPT_CONTENT: &str = "**Clique no botão abaixo para iniciar a Whitelist!**";

/// Message with the button that opens the form
pub fn prompt_message() -> CreateMessage {
    let button = CreateButton::new(START_BUTTON_ID)
        .label("📋 Iniciar Whitelist")
        .style(ButtonStyle::Primary);

    CreateMessage::new()
        .content(PROMPT_CONTENT)
        .components(vec![CreateActionRow::Buttons(vec![button])])
}

/// Modal opened by the button
pub fn form_modal() -> CreateInteractionResponse {
    let input = |custom_id: &str, label: &str| {
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, label, custom_id)
                .required(true)
                .max_length(100),
        )
    };

    CreateInteractionResponse::Modal(CreateModal::new(FORM_MODAL_ID, "Whitelist").components(
        vec![
            input(FIELD_NAME, "Nome"),
            input(FIELD_GAME_ID, "ID"),
            input(FIELD_RECRUITER_NAME, "Nome do Recrutador"),
            input(FIELD_RECRUITER_ID, "ID do Recrutador"),
        ],
    ))
}

/// Ephemeral reply to the submitter
pub fn ephemeral_reply(content: impl Into<String>) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

/// Collect the submitted text inputs of a modal
pub fn form_from_components(rows: &[ActionRow]) -> WhitelistForm {
    form_from_fields(rows.iter().flat_map(|row| &row.components).filter_map(|c| match c {
        ActionRowComponent::InputText(input) => Some((
            input.custom_id.as_str(),
            input.value.as_deref().unwrap_or_default(),
        )),
        _ => None,
    }))
}

/// Build a form from `(custom_id, value)` pairs. Unknown ids are ignored.
pub fn form_from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> WhitelistForm {
    let mut form = WhitelistForm::default();
    for (custom_id, value) in fields {
        let slot = match custom_id {
            FIELD_NAME => &mut form.name,
            FIELD_GAME_ID => &mut form.game_id,
            FIELD_RECRUITER_NAME => &mut form.recruiter_name,
            FIELD_RECRUITER_ID => &mut form.recruiter_id,
            _ => continue,
        };
        *slot = value.to_string();
    }
    form
}
