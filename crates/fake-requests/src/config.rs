//! Declarative expectation fixtures.
//!
//! A fixture lists expectations in match order, each with an optional canned
//! response, and can be written in YAML or JSON:
//!
//! ```yaml
//! allowUnexpectedCalls: false
//! expectations:
//!   - method: get
//!     uri: /users/1
//!     response:
//!       status: 200
//!       headers:
//!         content-type: application/json
//!       body: { id: 1, name: ada }
//!   - method: delete
//!     uri: https://api.example.com/users/1
//!     response:
//!       status: 204
//! ```

use crate::expectation::{normalize_method, parse_expected_uri};
use crate::response::ResponseBuilder;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockConfig {
    /// Answer unmatched requests with an empty 200 instead of failing.
    #[serde(default)]
    pub allow_unexpected_calls: bool,

    #[serde(default)]
    pub expectations: Vec<ExpectationConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpectationConfig {
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderValues>,

    /// Strings are sent verbatim, any other value is JSON encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// A header given either as a single value or a list of values.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

fn default_status() -> u16 {
    200
}

impl Default for ResponseConfig {
    fn default() -> Self {
        ResponseConfig {
            status: default_status(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl HeaderValues {
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValues::One(value) => std::slice::from_ref(value),
            HeaderValues::Many(values) => values,
        }
    }
}

impl ResponseConfig {
    pub fn to_builder(&self) -> ResponseBuilder {
        let headers = self
            .headers
            .iter()
            .flat_map(|(name, values)| values.values().iter().map(move |v| (name, v)));

        let builder = ResponseBuilder::new().status(self.status).headers(headers);

        match &self.body {
            None => builder,
            Some(Value::String(raw)) => builder.body(raw.as_str()),
            Some(other) => builder.body(other),
        }
    }
}

impl MockConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: MockConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: MockConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (index, expectation) in self.expectations.iter().enumerate() {
            if let Err(e) = normalize_method(&expectation.method) {
                anyhow::bail!(
                    "Expectation #{}: invalid method '{}': {}",
                    index,
                    expectation.method,
                    e
                );
            }

            if let Err(e) = parse_expected_uri(&expectation.uri) {
                anyhow::bail!(
                    "Expectation #{}: invalid uri '{}': {}",
                    index,
                    expectation.uri,
                    e
                );
            }

            if StatusCode::from_u16(expectation.response.status).is_err() {
                anyhow::bail!(
                    "Expectation #{}: status {} is outside 100..=999",
                    index,
                    expectation.response.status
                );
            }
        }
        Ok(())
    }
}
