pub mod augmentation;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod link;
pub mod presentation;
pub mod queries;
pub mod transport;

pub use augmentation::{Augmentation, ResultCount};
pub use client::{Client, ClientBuilder, QueryResponse};
pub use config::ClientConfig;
pub use dispatcher::{AugmentingHandler, Handler, MockDispatcher};
pub use error::{Error, Result};
pub use link::{ExtensionsLink, Link, LinkChain};
pub use transport::{HttpTransport, RawFetch, Transport};

use graphql_parser::query::{Definition, OperationDefinition, parse_query};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

/// Side-channel metadata of a response, orthogonal to the queried data.
pub type Extensions = Map<String, Value>;

/// A named GraphQL request. Two operations are the same when their name and
/// variables match.
#[derive(Clone, Debug)]
pub struct Operation {
    name: Option<String>,
    query: String,
    variables: Value,
}

impl Operation {
    /// Parses `query` and takes the operation name from its first operation
    /// definition.
    pub fn new(query: impl Into<String>, variables: Value) -> Result<Self> {
        let query = query.into();
        let document =
            parse_query::<String>(&query).map_err(|e| Error::InvalidOperation(e.to_string()))?;

        let name = document
            .definitions
            .iter()
            .find_map(|definition| match definition {
                Definition::Operation(op) => Some(match op {
                    OperationDefinition::Query(q) => q.name.clone(),
                    OperationDefinition::Mutation(m) => m.name.clone(),
                    OperationDefinition::Subscription(s) => s.name.clone(),
                    OperationDefinition::SelectionSet(_) => None,
                }),
                Definition::Fragment(_) => None,
            })
            .ok_or_else(|| Error::InvalidOperation("document has no operation".to_string()))?;

        Ok(Operation {
            name,
            query,
            variables,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn variables(&self) -> &Value {
        &self.variables
    }

    pub fn to_request(&self) -> GraphQLRequest {
        GraphQLRequest {
            query: self.query.clone(),
            variables: match &self.variables {
                Value::Null => None,
                variables => Some(variables.clone()),
            },
            operation_name: self.name.clone(),
        }
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.variables == other.variables
    }
}

impl Eq for Operation {}

/// POST body sent to the GraphQL endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphQLError {
            message: message.into(),
            details: Map::new(),
        }
    }
}

/// The `{data, errors, extensions}` triple returned for one operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub data: Option<Data>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<GraphQLError>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub extensions: Extensions,
}

impl ResponseEnvelope {
    /// Returns a new envelope whose extensions are the current ones extended
    /// (and overwritten where keys collide) by `extensions`.
    pub fn merge_extensions(self, extensions: Extensions) -> Self {
        let mut merged = self.extensions;
        merged.extend(extensions);
        ResponseEnvelope {
            extensions: merged,
            ..self
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `data` object of a response together with the extensions copied onto it
/// by [`ExtensionsLink`].
///
/// On the wire this is a plain object; serializing it writes the payload fields
/// followed by an `extensions` field when one was attached.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Data {
    payload: Map<String, Value>,
    extensions: Option<Extensions>,
}

impl Data {
    pub fn new(payload: Map<String, Value>) -> Self {
        Data {
            payload,
            extensions: None,
        }
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    pub fn with_extensions(self, extensions: Extensions) -> Self {
        Data {
            extensions: Some(extensions),
            ..self
        }
    }

    /// `noOfResults` as attached by the augmenting dispatcher, if any.
    pub fn no_of_results(&self) -> Option<u64> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.get(augmentation::NO_OF_RESULTS))
            .and_then(Value::as_u64)
    }

    /// Decodes the payload into a typed query result. Attached extensions are
    /// not part of the payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.payload.clone())).map_err(Error::Decode)
    }
}

impl From<Map<String, Value>> for Data {
    fn from(payload: Map<String, Value>) -> Self {
        Data::new(payload)
    }
}

impl From<Data> for Map<String, Value> {
    fn from(data: Data) -> Self {
        let mut object = data.payload;
        if let Some(extensions) = data.extensions {
            if let Some(replaced) =
                object.insert("extensions".to_string(), Value::Object(extensions))
            {
                debug!(?replaced, "attached extensions replace payload field `extensions`");
            }
        }
        object
    }
}
