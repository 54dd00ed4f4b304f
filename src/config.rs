use log::warn;
use std::env;
use std::str::FromStr;

const DEFAULT_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

// Runtime settings, read from the environment (and .env via dotenv)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub address: String,
    pub latency_ms: u64,
    pub seed: bool,
    pub invitation_ttl_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            latency_ms: 0,
            seed: true,
            invitation_ttl_days: DEFAULT_INVITATION_TTL_DAYS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Self {
            address: lookup("MOCK_API_ADDRESS").unwrap_or(defaults.address),
            latency_ms: parse_or(&lookup, "MOCK_API_LATENCY_MS", defaults.latency_ms),
            seed: parse_or(&lookup, "MOCK_API_SEED", defaults.seed),
            invitation_ttl_days: parse_or(
                &lookup,
                "MOCK_API_INVITATION_TTL_DAYS",
                defaults.invitation_ttl_days,
            ),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MOCK_API_ADDRESS", "0.0.0.0:8080"),
            ("MOCK_API_LATENCY_MS", "250"),
            ("MOCK_API_SEED", "false"),
            ("MOCK_API_INVITATION_TTL_DAYS", "3"),
        ]));
        assert_eq!(config.address, "0.0.0.0:8080");
        assert_eq!(config.latency_ms, 250);
        assert!(!config.seed);
        assert_eq!(config.invitation_ttl_days, 3);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[("MOCK_API_LATENCY_MS", "soon")]));
        assert_eq!(config.latency_ms, 0);
    }
}
