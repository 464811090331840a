use reqwest::StatusCode;

use crate::GraphQLError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the request chain and the query executor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connection refused, DNS, TLS...)
    #[error("Failed to send request to {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status
    #[error("Response not successful: received status code {0}")]
    Status(StatusCode),
    /// The body was not a GraphQL response envelope
    #[error("Failed to parse response: {0}")]
    MalformedPayload(String),
    #[error("Failed to parse query: {0}")]
    InvalidOperation(String),
    #[error("Failed to decode data: {0}")]
    Decode(#[source] serde_json::Error),
    /// The envelope carried a non-empty `errors` array
    #[error("{}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),
    /// A stage of the link chain went away before delivering its result
    #[error("request chain closed before a result was delivered")]
    ChannelClosed,
    #[error("Failed to load config: {0}")]
    Config(String),
}

impl Error {
    /// The message shown to users in error states.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
