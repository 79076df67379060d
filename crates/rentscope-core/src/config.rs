use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_BROKER_BASE_URL: &str = "https://apigw.garenta.com.tr/";
const DEFAULT_BROKER_TENANT_ID: &str = "4cdb69b2-f39b-4f2f-8302-b6198501bcc9";
const DEFAULT_BROKER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Core parsing/validation, decoupled from the process environment so it can
/// be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("RENTSCOPE_ENV", "development"));
    let bind_addr = parse_addr("RENTSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RENTSCOPE_LOG_LEVEL", "info");

    let broker_base_url = or_default("RENTSCOPE_BROKER_BASE_URL", DEFAULT_BROKER_BASE_URL);
    let broker_tenant_id = or_default("RENTSCOPE_BROKER_TENANT_ID", DEFAULT_BROKER_TENANT_ID);
    let broker_user_agent = or_default("RENTSCOPE_BROKER_USER_AGENT", DEFAULT_BROKER_USER_AGENT);
    let broker_connect_timeout_secs = parse_u64("RENTSCOPE_BROKER_CONNECT_TIMEOUT_SECS", "10")?;
    let broker_request_timeout_secs = parse_u64("RENTSCOPE_BROKER_REQUEST_TIMEOUT_SECS", "30")?;
    let broker_max_concurrent_branches =
        parse_positive_usize("RENTSCOPE_BROKER_MAX_CONCURRENT_BRANCHES", "1")?;

    let default_city = or_default("RENTSCOPE_DEFAULT_CITY", "istanbul")
        .trim()
        .to_lowercase();
    if default_city.is_empty() {
        return Err(invalid(
            "RENTSCOPE_DEFAULT_CITY",
            "must not be empty".to_string(),
        ));
    }
    let upstream_calls_per_minute =
        parse_positive_usize("RENTSCOPE_UPSTREAM_CALLS_PER_MINUTE", "300")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        broker_base_url,
        broker_tenant_id,
        broker_user_agent,
        broker_connect_timeout_secs,
        broker_request_timeout_secs,
        broker_max_concurrent_branches,
        default_city,
        upstream_calls_per_minute,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_test() {
        assert_eq!(parse_environment("test"), Environment::Test);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_uses_defaults_for_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.broker_base_url, "https://apigw.garenta.com.tr/");
        assert_eq!(cfg.broker_tenant_id, DEFAULT_BROKER_TENANT_ID);
        assert!(cfg.broker_user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(cfg.broker_connect_timeout_secs, 10);
        assert_eq!(cfg.broker_request_timeout_secs, 30);
        assert_eq!(cfg.broker_max_concurrent_branches, 1);
        assert_eq!(cfg.default_city, "istanbul");
        assert_eq!(cfg.upstream_calls_per_minute, 300);
    }

    #[test]
    fn build_app_config_applies_overrides() {
        let mut map = HashMap::new();
        map.insert("RENTSCOPE_BROKER_BASE_URL", "http://127.0.0.1:9000");
        map.insert("RENTSCOPE_BROKER_MAX_CONCURRENT_BRANCHES", "4");
        map.insert("RENTSCOPE_DEFAULT_CITY", " Ankara ");
        map.insert("RENTSCOPE_BROKER_REQUEST_TIMEOUT_SECS", "5");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.broker_base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.broker_max_concurrent_branches, 4);
        assert_eq!(cfg.default_city, "ankara");
        assert_eq!(cfg.broker_request_timeout_secs, 5);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = HashMap::new();
        map.insert("RENTSCOPE_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTSCOPE_BIND_ADDR"),
            "expected InvalidEnvVar(RENTSCOPE_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map = HashMap::new();
        map.insert("RENTSCOPE_BROKER_CONNECT_TIMEOUT_SECS", "ten");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTSCOPE_BROKER_CONNECT_TIMEOUT_SECS"),
            "expected InvalidEnvVar(RENTSCOPE_BROKER_CONNECT_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map = HashMap::new();
        map.insert("RENTSCOPE_BROKER_MAX_CONCURRENT_BRANCHES", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTSCOPE_BROKER_MAX_CONCURRENT_BRANCHES"),
            "expected InvalidEnvVar(RENTSCOPE_BROKER_MAX_CONCURRENT_BRANCHES), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_blank_default_city() {
        let mut map = HashMap::new();
        map.insert("RENTSCOPE_DEFAULT_CITY", "   ");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTSCOPE_DEFAULT_CITY"),
            "expected InvalidEnvVar(RENTSCOPE_DEFAULT_CITY), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_tenant_id() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains(DEFAULT_BROKER_TENANT_ID));
        assert!(rendered.contains("[redacted]"));
    }
}
