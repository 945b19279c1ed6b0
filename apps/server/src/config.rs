use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use finbot_core::rate_limit::{
    RateLimitConfig, RateLimitTable, CHAT_OPERATION, INSIGHTS_OPERATION,
};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Raw `FB_JWT_SECRET`; decoded by [`crate::auth::decode_secret_key`].
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub rate_limits: RateLimitTable,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr: SocketAddr = var("FB_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid FB_LISTEN_ADDR")?;
        let db_path = var("FB_DB_PATH", "./db/finbot.db");
        let cors_allow = var("FB_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var(&lookup, "FB_REQUEST_TIMEOUT_MS", 30_000)?;
        let jwt_secret = lookup("FB_JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("FB_JWT_SECRET must be set"))?;
        let ttl_minutes: u64 = parse_var(&lookup, "FB_ACCESS_TOKEN_TTL_MINUTES", 60)?;

        let window_secs: u64 = parse_var(&lookup, "FB_RATE_LIMIT_WINDOW_SECS", 60)?;
        if window_secs == 0 {
            return Err(anyhow!("FB_RATE_LIMIT_WINDOW_SECS must be positive"));
        }
        let window = Duration::from_secs(window_secs);
        let class = |key: &str, default: u32| -> anyhow::Result<RateLimitConfig> {
            Ok(RateLimitConfig {
                window,
                max_requests: parse_var(&lookup, key, default)?,
            })
        };
        let rate_limits = RateLimitTable::new(class("FB_RATE_LIMIT_DEFAULT_MAX", 60)?)
            .with_class(CHAT_OPERATION, class("FB_RATE_LIMIT_CHAT_MAX", 15)?)
            .with_class(INSIGHTS_OPERATION, class("FB_RATE_LIMIT_INSIGHTS_MAX", 30)?);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            access_token_ttl: Duration::from_secs(ttl_minutes * 60),
            rate_limits,
            openrouter_api_key: lookup("OPENROUTER_API_KEY").filter(|s| !s.trim().is_empty()),
            openrouter_model: lookup("OPENROUTER_MODEL").filter(|s| !s.trim().is_empty()),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::rate_limit::DEFAULT_OPERATION;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("FB_JWT_SECRET", "x")])).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.db_path, "./db/finbot.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.rate_limits.config_for(CHAT_OPERATION).max_requests, 15);
        assert_eq!(config.rate_limits.config_for(INSIGHTS_OPERATION).max_requests, 30);
        assert_eq!(config.rate_limits.config_for("export").max_requests, 60);
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn rate_limits_are_overridable() {
        let config = Config::from_lookup(lookup(&[
            ("FB_JWT_SECRET", "x"),
            ("FB_RATE_LIMIT_WINDOW_SECS", "10"),
            ("FB_RATE_LIMIT_CHAT_MAX", "2"),
        ]))
        .unwrap();
        let chat = config.rate_limits.config_for(CHAT_OPERATION);
        assert_eq!(chat.window, Duration::from_secs(10));
        assert_eq!(chat.max_requests, 2);
        assert_eq!(
            config.rate_limits.config_for(DEFAULT_OPERATION).window,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn invalid_values_fail_with_the_variable_name() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        let err = Config::from_lookup(lookup(&[
            ("FB_JWT_SECRET", "x"),
            ("FB_RATE_LIMIT_CHAT_MAX", "lots"),
        ]))
        .err()
        .unwrap();
        assert!(err.to_string().contains("FB_RATE_LIMIT_CHAT_MAX"));
    }
}
