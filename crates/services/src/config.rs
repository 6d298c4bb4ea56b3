use std::env;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Where the practice REST API lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }

    /// Read `ELEARN_API_URL` and `ELEARN_TOKEN`, falling back to a local backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("ELEARN_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        Self::new(base_url).with_token(env::var("ELEARN_TOKEN").ok())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
