use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
///
/// The default admits every origin, method, and header with credentials,
/// which is what browser front-ends of the chat endpoint expect.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Headers to expose to the browser
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// Allow credentials
    #[serde(default = "default_credentials")]
    pub credentials: bool,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: AnyOrArray::Any,
            methods: AnyOrArray::Any,
            headers: AnyOrArray::Any,
            expose_headers: Vec::new(),
            credentials: default_credentials(),
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_credentials() -> bool {
    true
}

/// Either a wildcard "*" or explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnyOrArray")]
pub enum AnyOrArray {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

/// Accepted TOML spellings: `"*"`, `"value"`, or `["a", "b"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnyOrArray {
    One(String),
    Many(Vec<String>),
}

impl From<RawAnyOrArray> for AnyOrArray {
    fn from(raw: RawAnyOrArray) -> Self {
        let values = match raw {
            RawAnyOrArray::One(value) => vec![value],
            RawAnyOrArray::Many(values) => values,
        };

        // A "*" anywhere in the list widens it to everything
        if values.iter().any(|v| v == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        cors: CorsConfig,
    }

    fn parse(toml: &str) -> CorsConfig {
        toml::from_str::<Wrapper>(toml).unwrap().cors
    }

    #[test]
    fn empty_table_is_fully_permissive() {
        let cors = parse("[cors]");
        assert_eq!(cors.origins, AnyOrArray::Any);
        assert_eq!(cors.methods, AnyOrArray::Any);
        assert_eq!(cors.headers, AnyOrArray::Any);
        assert!(cors.credentials);
    }

    #[test]
    fn single_origin_string() {
        let cors = parse("[cors]\norigins = \"https://app.example\"");
        assert_eq!(cors.origins, AnyOrArray::List(vec!["https://app.example".to_owned()]));
    }

    #[test]
    fn wildcard_inside_list_means_any() {
        let cors = parse("[cors]\nmethods = [\"GET\", \"*\"]");
        assert_eq!(cors.methods, AnyOrArray::Any);
    }

    #[test]
    fn credentials_can_be_disabled() {
        let cors = parse("[cors]\ncredentials = false\nmax_age = 600");
        assert!(!cors.credentials);
        assert_eq!(cors.max_age_duration(), Some(Duration::from_secs(600)));
    }
}
