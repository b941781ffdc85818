//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for remote access.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Team (subdomain) name.
    pub team: String,
    /// Access token sent as a bearer token.
    pub token: String,
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// User agent header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Creates a configuration pointing at the team's default endpoint.
    pub fn new(team: impl Into<String>, token: impl Into<String>) -> Self {
        let team = team.into();
        Self {
            endpoint: format!("https://{team}.kibe.la/api/v1"),
            team,
            token: token.into(),
            user_agent: format!("kibelasync/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the GraphQL endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        let config = SyncConfig::new("acme", "secret");
        assert_eq!(config.endpoint, "https://acme.kibe.la/api/v1");
        assert_eq!(config.team, "acme");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("kibelasync/"));
    }

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new("acme", "secret")
            .with_endpoint("http://localhost:8080/graphql")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.endpoint, "http://localhost:8080/graphql");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
