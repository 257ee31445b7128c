use std::{env, time::Duration};

use backend::{directions::DirectionsConfig, BackendConfig};
use model::user::Credentials;
use refresh::refresher::DEFAULT_TICK;
use tracking::RemainingPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub directions: Option<DirectionsConfig>,
    pub credentials: Credentials,
    pub poll_interval: Duration,
    pub policy: RemainingPolicy,
}

/// Poll period in milliseconds. Missing, zero or unreadable values fall back
/// to the default.
pub fn parse_poll_interval(value: Option<&str>) -> Duration {
    value
        .and_then(|ms| ms.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TICK)
}

pub fn parse_policy(value: Option<&str>) -> RemainingPolicy {
    match value.map(str::parse::<RemainingPolicy>) {
        Some(Ok(policy)) => policy,
        Some(Err(why)) => {
            log::warn!("{why}, using '{}'", RemainingPolicy::default());
            RemainingPolicy::default()
        }
        None => RemainingPolicy::default(),
    }
}

impl AppConfig {
    pub fn from_env() -> Option<Self> {
        let backend = BackendConfig::from_env()?;
        let phone = env::var("LOGIN_PHONE").ok()?;
        let password = env::var("LOGIN_PASSWORD").ok()?;
        Some(Self {
            backend,
            directions: DirectionsConfig::from_env(),
            credentials: Credentials::new(phone, password),
            poll_interval: parse_poll_interval(env::var("POLL_INTERVAL_MS").ok().as_deref()),
            policy: parse_policy(env::var("REMAINING_POLICY").ok().as_deref()),
        })
    }
}
