use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub broker_base_url: String,
    pub broker_tenant_id: String,
    pub broker_user_agent: String,
    pub broker_connect_timeout_secs: u64,
    pub broker_request_timeout_secs: u64,
    pub broker_max_concurrent_branches: usize,
    pub default_city: String,
    pub upstream_calls_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("broker_base_url", &self.broker_base_url)
            .field("broker_tenant_id", &"[redacted]")
            .field("broker_user_agent", &self.broker_user_agent)
            .field(
                "broker_connect_timeout_secs",
                &self.broker_connect_timeout_secs,
            )
            .field(
                "broker_request_timeout_secs",
                &self.broker_request_timeout_secs,
            )
            .field(
                "broker_max_concurrent_branches",
                &self.broker_max_concurrent_branches,
            )
            .field("default_city", &self.default_city)
            .field("upstream_calls_per_minute", &self.upstream_calls_per_minute)
            .finish()
    }
}
