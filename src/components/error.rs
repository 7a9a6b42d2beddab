//! Error types for component definition, routing and construction

use thiserror::Error;

/// Failures owned by the component subsystem itself.
///
/// Business logic inside `Component::execute` reports through `anyhow`; these variants cover
/// what the routing layer can get wrong on its own.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("Invalid custom id '{custom_id}': {reason}")]
    InvalidCustomId { custom_id: String, reason: String },

    #[error("Invalid {kind} definition for '{custom_id}': {reason}")]
    InvalidDefinition {
        kind: &'static str,
        custom_id: String,
        reason: String,
    },

    #[error("Factory '{pattern}' failed to construct '{custom_id}': {reason}")]
    Construction {
        pattern: String,
        custom_id: String,
        reason: String,
    },

    #[error("A modal cannot be opened in response to a modal submission")]
    ModalFromModal,

    #[error("Failed to encode component metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl ComponentError {
    pub(crate) fn invalid_id(custom_id: &str, reason: impl Into<String>) -> Self {
        ComponentError::InvalidCustomId {
            custom_id: custom_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn definition(
        kind: &'static str,
        custom_id: &str,
        reason: impl Into<String>,
    ) -> Self {
        ComponentError::InvalidDefinition {
            kind,
            custom_id: custom_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ComponentError>;
