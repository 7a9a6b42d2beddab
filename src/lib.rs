// Core layer - configuration and response helpers
pub mod core;

// Component layer - registry, dispatch, and lifecycle of interactive components
pub mod components;

// Transport layer - serenity interactions in, Discord responses out
pub mod transport;

pub use core::Config;

pub use components::{
    builtin::{demo_components, register_builtins},
    Component, ComponentContext, ComponentDefinition, ComponentError, ComponentFactory,
    ComponentHandler, ComponentManager, ComponentMetadata, ComponentRegistry, DispatchOutcome,
    RegisterOptions, Responder,
};

pub use transport::{component_context, modal_context, SerenityResponder};
