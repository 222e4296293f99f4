//! GraphQL wire types shared by every backend call.

pub mod documents;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// Response envelope. Either side may be present; AppSync can return
/// partial `data` next to `errors`.
#[derive(Debug)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<GraphQlErrors>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub locations: Option<Vec<Location>>,
    #[serde(default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Non-empty list of errors reported by the service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "Vec<GraphQlError>")]
pub struct GraphQlErrors(Vec<GraphQlError>);

impl GraphQlErrors {
    pub fn first_message(&self) -> &str {
        &self.0[0].message
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphQlError> {
        self.0.iter()
    }

    // Never empty, so there is no is_empty.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<GraphQlError>> for GraphQlErrors {
    type Error = &'static str;

    fn try_from(errors: Vec<GraphQlError>) -> Result<Self, Self::Error> {
        if errors.is_empty() {
            return Err("errors list must not be empty");
        }
        Ok(Self(errors))
    }
}

impl fmt::Display for GraphQlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message())?;
        if self.0.len() > 1 {
            write!(f, " (and {} more)", self.0.len() - 1)?;
        }
        Ok(())
    }
}

/// Decodes an envelope, dropping an `errors: []` list instead of failing.
pub fn decode_response<T>(body: &[u8]) -> Result<GraphQlResponse<T>, serde_json::Error>
where
    T: for<'de> Deserialize<'de>,
{
    #[derive(Deserialize)]
    struct Raw<T> {
        data: Option<T>,
        #[serde(default)]
        errors: Option<Vec<GraphQlError>>,
    }

    let raw: Raw<T> = serde_json::from_slice(body)?;
    Ok(GraphQlResponse {
        data: raw.data,
        errors: raw.errors.and_then(|e| GraphQlErrors::try_from(e).ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Data {
        value: u32,
    }

    #[test]
    fn test_decode_errors() {
        let body = br#"{"data":null,"errors":[{"message":"Invalid input","errorType":"ValidationError"},{"message":"second"}]}"#;
        let response: GraphQlResponse<Data> = decode_response(body).unwrap();
        let errors = response.errors.unwrap();
        assert_eq!(errors.first_message(), "Invalid input");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "Invalid input (and 1 more)");
        assert_eq!(
            errors.iter().next().unwrap().error_type.as_deref(),
            Some("ValidationError")
        );
    }

    #[test]
    fn test_decode_error_without_message_is_rejected() {
        let body = br#"{"data":null,"errors":[{"errorType":"Unknown"}]}"#;
        assert!(decode_response::<Data>(body).is_err());
    }

    #[test]
    fn test_decode_empty_errors_list() {
        let body = br#"{"data":{"value":3},"errors":[]}"#;
        let response: GraphQlResponse<Data> = decode_response(body).unwrap();
        assert!(response.errors.is_none());
        assert_eq!(response.data.unwrap().value, 3);
    }

    #[test]
    fn test_empty_error_list_type_rejected() {
        assert!(serde_json::from_str::<GraphQlErrors>("[]").is_err());
    }
}
