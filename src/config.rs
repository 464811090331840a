use std::{fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result, augmentation::DEFAULT_LIST_FIELD};

pub const DEFAULT_ENDPOINT: &str = "https://countries.trevorblades.com/graphql";

pub const DEFAULT_DISPLAY_LIMIT: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Route requests through the augmenting mock dispatcher. Demo only.
    pub mock: bool,
    /// List field counted into `noOfResults`.
    pub list_field: String,
    pub display_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            mock: true,
            list_field: DEFAULT_LIST_FIELD.to_string(),
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }
}
