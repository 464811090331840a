//! Mock dispatcher that intercepts outgoing operations.
//!
//! The dispatcher owns the raw transport it forwards to and is itself only a
//! [`Transport`]. Handlers receive the raw transport as their bypass path, so a
//! forwarded request can never come back through the dispatcher.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    Operation, ResponseEnvelope, Result,
    augmentation::{Augmentation, ResultCount},
    transport::{RawFetch, Transport},
};

#[async_trait]
pub trait Handler {
    fn matches(&self, operation: &Operation) -> bool;

    async fn handle(
        &self,
        operation: &Operation,
        bypass: &(dyn RawFetch + Send + Sync),
    ) -> Result<ResponseEnvelope>;
}

/// Matches every GraphQL operation, forwards it through the bypass path and
/// merges the derived extensions into the real response.
pub struct AugmentingHandler<A = ResultCount> {
    augmentation: A,
}

impl<A> AugmentingHandler<A> {
    pub fn new(augmentation: A) -> Self {
        AugmentingHandler { augmentation }
    }
}

impl Default for AugmentingHandler {
    fn default() -> Self {
        AugmentingHandler::new(ResultCount::default())
    }
}

#[async_trait]
impl<A> Handler for AugmentingHandler<A>
where
    A: Augmentation + Send + Sync,
{
    fn matches(&self, _operation: &Operation) -> bool {
        true
    }

    async fn handle(
        &self,
        operation: &Operation,
        bypass: &(dyn RawFetch + Send + Sync),
    ) -> Result<ResponseEnvelope> {
        // Failures propagate as-is and skip augmentation.
        let original = bypass.raw_fetch(operation).await?;

        let extensions = self
            .augmentation
            .augment(operation.name(), original.data.as_ref());
        debug!(
            operation = operation.name().unwrap_or("<anonymous>"),
            ?extensions,
            "augmenting response"
        );

        Ok(original.merge_extensions(extensions))
    }
}

pub type BoxedHandler = Box<dyn Handler + Send + Sync>;

pub struct MockDispatcher<B> {
    bypass: B,
    handlers: Vec<BoxedHandler>,
}

impl<B> MockDispatcher<B>
where
    B: RawFetch + Send + Sync,
{
    /// A dispatcher with no handlers installed. Every operation is forwarded
    /// unchanged until [`install`](Self::install) is called.
    pub fn new(bypass: B) -> Self {
        MockDispatcher {
            bypass,
            handlers: Vec::new(),
        }
    }

    /// A dispatcher with the default augmenting handler installed.
    pub fn with_default_handlers(bypass: B) -> Self {
        let mut dispatcher = MockDispatcher::new(bypass);
        dispatcher.install(vec![Box::new(AugmentingHandler::default()) as BoxedHandler]);
        dispatcher
    }

    pub fn install(&mut self, handlers: impl IntoIterator<Item = BoxedHandler>) {
        self.handlers.extend(handlers);
        info!(handlers = self.handlers.len(), "mock dispatcher installed");
    }

    pub fn uninstall(&mut self) {
        self.handlers.clear();
        info!("mock dispatcher uninstalled");
    }

    pub fn is_installed(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// The first matching handler answers; unhandled operations take the
    /// bypass path untouched.
    pub async fn intercepted_fetch(&self, operation: &Operation) -> Result<ResponseEnvelope> {
        match self.handlers.iter().find(|h| h.matches(operation)) {
            Some(handler) => {
                debug!(
                    operation = operation.name().unwrap_or("<anonymous>"),
                    "intercepting operation"
                );
                handler.handle(operation, &self.bypass).await
            }
            None => self.bypass.raw_fetch(operation).await,
        }
    }
}

#[async_trait]
impl<B> Transport for MockDispatcher<B>
where
    B: RawFetch + Send + Sync,
{
    async fn fetch(&self, operation: &Operation) -> Result<ResponseEnvelope> {
        self.intercepted_fetch(operation).await
    }
}
