//! Pattern-based component construction

use std::sync::Arc;

use super::component::Component;
use super::context::ComponentContext;
use super::error::Result;

/// Builds components on demand for a family of custom ids
///
/// One factory stands in for every parameterized instance of a scheme such as
/// `util:confirm:<action>[:success|danger]`. `can_handle(id)` returning true means `create(id)`
/// must succeed for well-formed ids; a failure there is reported as a construction error.
pub trait ComponentFactory: Send + Sync {
    /// Registration key, usually the regex the factory matches
    fn pattern(&self) -> &str;

    fn can_handle(&self, custom_id: &str) -> bool;

    /// Construct the component for `custom_id`
    ///
    /// `ctx` is present when construction happens during dispatch.
    fn create(
        &self,
        custom_id: &str,
        ctx: Option<&ComponentContext>,
    ) -> Result<Arc<dyn Component>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::components::component::testing::CountingComponent;
    use crate::components::error::ComponentError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Handles every id starting with `prefix`
    pub struct PrefixFactory {
        pub prefix: String,
        pub broken: bool,
        pub created: AtomicUsize,
    }

    impl PrefixFactory {
        pub fn new(prefix: &str) -> Self {
            Self {
                prefix: prefix.to_string(),
                broken: false,
                created: AtomicUsize::new(0),
            }
        }

        pub fn broken(prefix: &str) -> Self {
            Self {
                broken: true,
                ..Self::new(prefix)
            }
        }

        pub fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl ComponentFactory for PrefixFactory {
        fn pattern(&self) -> &str {
            &self.prefix
        }

        fn can_handle(&self, custom_id: &str) -> bool {
            custom_id.starts_with(&self.prefix)
        }

        fn create(
            &self,
            custom_id: &str,
            _ctx: Option<&ComponentContext>,
        ) -> Result<Arc<dyn Component>> {
            if self.broken {
                return Err(ComponentError::Construction {
                    pattern: self.prefix.clone(),
                    custom_id: custom_id.to_string(),
                    reason: "broken on purpose".to_string(),
                });
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(CountingComponent::new(custom_id)))
        }
    }
}
