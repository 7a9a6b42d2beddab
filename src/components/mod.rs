//! # Component System
//!
//! Routing and lifecycle for interactive message components (buttons, select menus, modals).
//! Persistent components and factories live in the [`ComponentRegistry`]; dynamic,
//! time-limited components are tracked by the [`ComponentManager`] and dispatched by the
//! [`ComponentHandler`], which always consults the registry first.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod builtin;
pub mod component;
pub mod context;
pub mod custom_id;
pub mod definition;
pub mod error;
pub mod factory;
pub mod handler;
pub mod manager;
pub mod registry;

pub use component::{Component, Execution};
pub use context::{ComponentContext, Responder};
pub use custom_id::{generate_custom_id, namespace_of, parse_custom_id, ParsedCustomId};
pub use definition::{
    render_rows, Button, ButtonStyle, ComponentDefinition, ComponentType, Modal, SelectKind,
    SelectMenu, SelectOption, TextInput, TextInputStyle,
};
pub use error::ComponentError;
pub use factory::ComponentFactory;
pub use handler::{ComponentHandler, DispatchOutcome, ERROR_NOTICE};
pub use manager::{
    ComponentCacheEntry, ComponentManager, ComponentMetadata, ComponentStats, RegisterOptions,
    DEFAULT_COMPONENT_TIMEOUT, DEFAULT_SWEEP_INTERVAL,
};
pub use registry::ComponentRegistry;
