//! # Transport
//!
//! Turns serenity interactions into [`ComponentContext`](crate::components::ComponentContext)s
//! and replies through the Discord HTTP API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod serenity;

pub use self::serenity::{component_context, modal_context, SerenityResponder};
