use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    ClientConfig, Data, Error, GraphQLError, Operation, Result,
    augmentation::ResultCount,
    dispatcher::{AugmentingHandler, BoxedHandler, MockDispatcher},
    link::{BoxedLink, BoxedTransport, ExtensionsLink, LinkChain},
    transport::HttpTransport,
};

/// Executes operations through a link chain. There is no result cache: every
/// query is a fresh round trip and nothing is kept afterwards.
#[derive(Clone)]
pub struct Client {
    chain: LinkChain,
}

impl Client {
    pub fn new(chain: LinkChain) -> Self {
        Client { chain }
    }

    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Client::builder(&config.endpoint);
        if config.mock {
            builder
                .with_handlers(vec![Box::new(AugmentingHandler::new(ResultCount::new(
                    &config.list_field,
                ))) as BoxedHandler])
                .build()
        } else {
            builder.build()
        }
    }

    /// Runs one operation. Transport failures come back as `Err`; GraphQL
    /// errors are left in the response for the caller to judge.
    pub async fn query(&self, operation: Operation) -> Result<QueryResponse> {
        let name = operation.name().unwrap_or("<anonymous>").to_string();
        info!(operation = %name, "executing query");

        let envelope = self.chain.execute(operation).recv().await?;
        debug!(
            operation = %name,
            errors = envelope.errors.len(),
            no_of_results = ?envelope.data.as_ref().and_then(Data::no_of_results),
            "query completed"
        );

        Ok(QueryResponse {
            data: envelope.data,
            errors: envelope.errors,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryResponse {
    /// The data with any response extensions attached.
    pub data: Option<Data>,
    pub errors: Vec<GraphQLError>,
}

impl QueryResponse {
    /// Any GraphQL error fails the response, even when partial data came back.
    pub fn into_data(self) -> Result<Data> {
        if !self.errors.is_empty() {
            return Err(Error::GraphQL(self.errors));
        }

        self.data
            .ok_or_else(|| Error::MalformedPayload("response has neither data nor errors".into()))
    }
}

pub struct ClientBuilder {
    endpoint: String,
    handlers: Option<Vec<BoxedHandler>>,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ClientBuilder {
            endpoint: endpoint.into(),
            handlers: None,
        }
    }

    /// Routes requests through a mock dispatcher with the default augmenting
    /// handler.
    pub fn with_mock_dispatcher(self) -> Self {
        self.with_handlers(vec![Box::new(AugmentingHandler::default()) as BoxedHandler])
    }

    pub fn with_handlers(mut self, handlers: Vec<BoxedHandler>) -> Self {
        self.handlers.get_or_insert_with(Vec::new).extend(handlers);
        self
    }

    pub fn build(self) -> Client {
        let transport = HttpTransport::new(self.endpoint);

        let terminal: BoxedTransport = match self.handlers {
            Some(handlers) => {
                let mut dispatcher = MockDispatcher::new(transport);
                dispatcher.install(handlers);
                Arc::new(dispatcher)
            }
            None => Arc::new(transport),
        };

        let links: Vec<BoxedLink> = vec![Arc::new(ExtensionsLink)];
        Client::new(LinkChain::new(links, terminal))
    }
}
