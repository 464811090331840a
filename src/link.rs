//! Client request chain.
//!
//! A chain is an ordered list of [`Link`]s ending in a [`Transport`]. Each
//! stage hands the operation on through [`Forward::call`], which runs the rest
//! of the chain and delivers its single terminal outcome over a one-shot
//! channel. A link then returns its own, transformed, outcome upstream.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use crate::{Error, Operation, ResponseEnvelope, Result, transport::Transport};

pub type Outcome = Result<ResponseEnvelope>;

pub type BoxedLink = Arc<dyn Link + Send + Sync>;

pub type BoxedTransport = Arc<dyn Transport + Send + Sync>;

#[async_trait]
pub trait Link {
    async fn request(&self, operation: Operation, forward: Forward) -> Outcome;
}

struct Stages {
    links: Vec<BoxedLink>,
    terminal: BoxedTransport,
}

/// The part of the chain downstream of the current link.
pub struct Forward {
    stages: Arc<Stages>,
    position: usize,
}

impl Forward {
    /// Starts the downstream stages for `operation` and returns the channel
    /// its outcome will arrive on.
    pub fn call(self, operation: Operation) -> ResultChannel {
        let (sender, receiver) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = self.run(operation).await;
            if sender.send(outcome).is_err() {
                debug!("upstream stage dropped before the result arrived");
            }
        });
        ResultChannel { receiver }
    }

    async fn run(self, operation: Operation) -> Outcome {
        let Forward { stages, position } = self;
        let next = stages.links.get(position).cloned();

        match next {
            Some(link) => {
                let forward = Forward {
                    stages,
                    position: position + 1,
                };
                link.request(operation, forward).await
            }
            None => stages.terminal.fetch(&operation).await,
        }
    }
}

/// Receiving end for the one outcome of an operation.
pub struct ResultChannel {
    receiver: oneshot::Receiver<Outcome>,
}

impl ResultChannel {
    pub async fn recv(self) -> Outcome {
        self.receiver.await.unwrap_or(Err(Error::ChannelClosed))
    }
}

#[derive(Clone)]
pub struct LinkChain {
    stages: Arc<Stages>,
}

impl LinkChain {
    /// `links` run in order, outermost first; `terminal` performs the request.
    pub fn new(links: Vec<BoxedLink>, terminal: BoxedTransport) -> Self {
        LinkChain {
            stages: Arc::new(Stages { links, terminal }),
        }
    }

    pub fn execute(&self, operation: Operation) -> ResultChannel {
        Forward {
            stages: Arc::clone(&self.stages),
            position: 0,
        }
        .call(operation)
    }
}

/// Copies response extensions onto the response data so data consumers can
/// read them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionsLink;

#[async_trait]
impl Link for ExtensionsLink {
    async fn request(&self, operation: Operation, forward: Forward) -> Outcome {
        let name = operation.name().map(str::to_owned);
        let outcome = forward.call(operation).recv().await;

        match outcome {
            Ok(envelope) => {
                debug!(
                    operation = name.as_deref().unwrap_or("<anonymous>"),
                    extensions = ?envelope.extensions,
                    has_data = envelope.data.is_some(),
                    "extensions link received result"
                );
                Ok(propagate_extensions(envelope))
            }
            Err(error) => {
                debug!(
                    operation = name.as_deref().unwrap_or("<anonymous>"),
                    %error,
                    "request chain failed"
                );
                Err(error)
            }
        }
    }
}

/// Returns `envelope` with its extensions attached to its data. Envelopes
/// without data or without extensions come back unchanged.
pub fn propagate_extensions(envelope: ResponseEnvelope) -> ResponseEnvelope {
    match envelope {
        ResponseEnvelope {
            data: Some(data),
            errors,
            extensions,
        } if !extensions.is_empty() => ResponseEnvelope {
            data: Some(data.with_extensions(extensions.clone())),
            errors,
            extensions,
        },
        envelope => envelope,
    }
}
