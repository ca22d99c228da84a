//! Configuration for forge platform connections.
use secrecy::SecretString;

/// Default REST API base for github.com.
pub const DEFAULT_GITHUB_API_BASE_URI: &str = "https://api.github.com";
/// Default page size for paginated list and search queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Default number of pull request details fetched concurrently.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Remote connection configuration for authenticating against the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// REST API base URI, e.g. "https://api.github.com".
    pub api_base_uri: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Connect and read timeout for each HTTP request.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_uri: DEFAULT_GITHUB_API_BASE_URI.to_string(),
            token: SecretString::from("".to_string()),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.api_base_uri, DEFAULT_GITHUB_API_BASE_URI);
        assert_eq!(remote.timeout_secs, 30);
    }
}
