//! Derived response metadata.
//!
//! An [`Augmentation`] looks at the `data` of a raw response and returns the
//! extensions to merge into the envelope. Implementations must be pure: the
//! same input always yields the same extensions and the input is only read.

use serde_json::Value;

use crate::{Data, Extensions};

pub const NO_OF_RESULTS: &str = "noOfResults";

/// List field counted by [`ResultCount::default`].
pub const DEFAULT_LIST_FIELD: &str = "countries";

pub trait Augmentation {
    fn augment(&self, operation_name: Option<&str>, data: Option<&Data>) -> Extensions;
}

/// Counts the elements of one list field of the payload into `noOfResults`.
#[derive(Clone, Debug)]
pub struct ResultCount {
    list_field: String,
}

impl ResultCount {
    pub fn new(list_field: impl Into<String>) -> Self {
        ResultCount {
            list_field: list_field.into(),
        }
    }
}

impl Default for ResultCount {
    fn default() -> Self {
        ResultCount::new(DEFAULT_LIST_FIELD)
    }
}

impl Augmentation for ResultCount {
    fn augment(&self, _operation_name: Option<&str>, data: Option<&Data>) -> Extensions {
        let count = data
            .and_then(|data| data.get(&self.list_field))
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        let mut extensions = Extensions::new();
        extensions.insert(NO_OF_RESULTS.to_string(), Value::from(count));
        extensions
    }
}

/// Extensions for `data` using the default `countries` count.
pub fn augment(data: Option<&Data>) -> Extensions {
    ResultCount::default().augment(None, data)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> Data {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn counts_countries() {
        for n in [0, 1, 3, 250] {
            let countries: Vec<_> = (0..n).map(|i| json!({ "code": format!("C{i}") })).collect();
            let data = data(json!({ "countries": countries }));

            assert_eq!(augment(Some(&data))[NO_OF_RESULTS], json!(n));
        }
    }

    #[test]
    fn missing_list_counts_zero() {
        let detail = data(json!({ "country": { "code": "FR", "languages": [{ "code": "fr" }] } }));

        assert_eq!(augment(Some(&detail))[NO_OF_RESULTS], json!(0));
        assert_eq!(augment(None)[NO_OF_RESULTS], json!(0));
    }

    #[test]
    fn non_list_field_counts_zero() {
        let data = data(json!({ "countries": "not a list" }));

        assert_eq!(augment(Some(&data))[NO_OF_RESULTS], json!(0));
    }

    #[test]
    fn augmenting_twice_is_stable() {
        let data = data(json!({ "countries": [{ "code": "AD" }, { "code": "AE" }] }));
        let before = data.clone();

        let first = augment(Some(&data));
        let second = augment(Some(&data));

        assert_eq!(first, second);
        assert_eq!(data, before);
    }

    #[test]
    fn counts_configured_field() {
        let data = data(json!({ "languages": [{ "code": "en" }, { "code": "fr" }] }));

        let extensions = ResultCount::new("languages").augment(Some("GetLanguages"), Some(&data));

        assert_eq!(extensions[NO_OF_RESULTS], json!(2));
    }
}
