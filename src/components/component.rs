//! Component behavior contract
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use super::context::ComponentContext;
use super::definition::{ComponentDefinition, ComponentType};

/// What happened when a component was run through [`Component::execute_with_validation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// `execute` ran and returned successfully
    Completed,
    /// `validate` returned false, `execute` was skipped
    Rejected,
}

/// An interactive element bound to a custom id
///
/// Implementors supply identity, shape and `execute`; the remaining hooks have defaults.
///
/// # Example
///
/// ```ignore
/// struct Ping {
///     definition: ComponentDefinition,
/// }
///
/// #[async_trait]
/// impl Component for Ping {
///     fn custom_id(&self) -> &str {
///         "util:ping"
///     }
///
///     fn definition(&self) -> &ComponentDefinition {
///         &self.definition
///     }
///
///     async fn execute(&self, ctx: &ComponentContext) -> Result<()> {
///         ctx.responder.send_ephemeral("Pong!").await
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync {
    /// Routing key, `namespace:id[:param...]`
    fn custom_id(&self) -> &str;

    fn definition(&self) -> &ComponentDefinition;

    /// Single-use: cleaned up after the first successful execution
    fn once(&self) -> bool {
        false
    }

    /// Preferred lifetime when registered dynamically
    fn timeout(&self) -> Option<Duration> {
        None
    }

    fn component_type(&self) -> ComponentType {
        self.definition().type_tag()
    }

    /// Guard run before `execute`
    ///
    /// Returning false skips execution silently. A component that wants the user to know
    /// why must reply itself before returning.
    async fn validate(&self, _ctx: &ComponentContext) -> bool {
        true
    }

    async fn execute(&self, ctx: &ComponentContext) -> Result<()>;

    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    /// Validate, execute, and clean up single-use components
    ///
    /// Errors from `execute` propagate to the caller. A failing `cleanup` is logged but does
    /// not turn a completed execution into a failure.
    async fn execute_with_validation(&self, ctx: &ComponentContext) -> Result<Execution> {
        if !self.validate(ctx).await {
            debug!(
                "Validation rejected component {} for user {}",
                self.custom_id(),
                ctx.user_id
            );
            return Ok(Execution::Rejected);
        }

        self.execute(ctx).await?;

        if self.once() {
            if let Err(e) = self.cleanup().await {
                warn!("Cleanup failed for component {}: {e}", self.custom_id());
            }
        }

        Ok(Execution::Completed)
    }
}
