use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Operation, Result};

pub const GET_COUNTRIES: &str = r#"
  query GetCountries {
    countries {
      code
      name
      capital
      currency
      emoji
    }
  }
"#;

pub const GET_COUNTRY: &str = r#"
  query GetCountry($code: ID!) {
    country(code: $code) {
      code
      name
      capital
      currency
      emoji
      languages {
        code
        name
      }
    }
  }
"#;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub capital: Option<String>,
    pub currency: Option<String>,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<Language>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CountriesQuery {
    pub countries: Vec<Country>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CountryQuery {
    pub country: Option<Country>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CountryVariables {
    pub code: String,
}

pub fn get_countries() -> Result<Operation> {
    Operation::new(GET_COUNTRIES, Value::Null)
}

pub fn get_country(code: &str) -> Result<Operation> {
    let variables = serde_json::to_value(CountryVariables {
        code: code.to_string(),
    })
    .map_err(Error::Decode)?;
    Operation::new(GET_COUNTRY, variables)
}
