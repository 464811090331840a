use async_trait::async_trait;
use tracing::debug;

use crate::{Error, Operation, ResponseEnvelope, Result};

/// Something that turns an operation into a response envelope.
///
/// [`HttpTransport`] talks to the network. The mock dispatcher implements the
/// same trait on top of a raw transport, so the terminal link of a chain does
/// not know whether responses are being intercepted.
#[async_trait]
pub trait Transport {
    async fn fetch(&self, operation: &Operation) -> Result<ResponseEnvelope>;
}

/// The bypass path: a fetch that never goes through interception.
///
/// Only network transports implement this. The dispatcher is a [`Transport`]
/// but not a `RawFetch`, so it can never be handed to itself as its own
/// forwarding path.
#[async_trait]
pub trait RawFetch {
    async fn raw_fetch(&self, operation: &Operation) -> Result<ResponseEnvelope>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RawFetch for HttpTransport {
    async fn raw_fetch(&self, operation: &Operation) -> Result<ResponseEnvelope> {
        debug!(
            operation = operation.name().unwrap_or("<anonymous>"),
            endpoint = %self.endpoint,
            "sending operation"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&operation.to_request())
            .send()
            .await
            .map_err(|source| Error::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.bytes().await.map_err(|source| Error::Transport {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        serde_json::from_slice::<ResponseEnvelope>(&body)
            .map_err(|e| Error::MalformedPayload(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, operation: &Operation) -> Result<ResponseEnvelope> {
        self.raw_fetch(operation).await
    }
}
