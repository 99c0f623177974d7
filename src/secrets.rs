use std::fmt;

/// An API credential read from the environment.
///
/// `Debug` and `Display` are redacted so keys never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Reads `var`, treating unset and blank values as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(format!("{}", key), "***");
        assert_eq!(key.expose(), "sk-secret-value");
    }

    #[test]
    fn test_blank_env_value_is_absent() {
        std::env::set_var("FED_ANALYSIS_TEST_BLANK_KEY", "   ");
        assert!(ApiKey::from_env("FED_ANALYSIS_TEST_BLANK_KEY").is_none());
        assert!(ApiKey::from_env("FED_ANALYSIS_TEST_UNSET_KEY").is_none());
    }
}
