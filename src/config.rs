use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::crypto::HashCost;
use crate::records::DEFAULT_RECENT_LIMIT;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub models_dir: PathBuf,
    pub audit_dir: PathBuf,
    pub db_pool_size: u32,
    pub hash_cost: HashCost,
    pub session_ttl: Duration,
    pub recent_records_limit: i64,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let defaults = HashCost::default();
        let ttl_minutes: u64 = parse(&lookup, "SESSION_TTL_MINUTES", 60)?;
        let recent_records_limit = parse(&lookup, "RECENT_RECORDS_LIMIT", DEFAULT_RECENT_LIMIT)?;
        if recent_records_limit < 1 {
            return Err(ConfigError::Invalid {
                key: "RECENT_RECORDS_LIMIT",
                value: recent_records_limit.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            bind_addr: text("BIND_ADDR", "127.0.0.1:8080"),
            models_dir: PathBuf::from(text("MODELS_DIR", "models")),
            audit_dir: PathBuf::from(text("AUDIT_DIR", ".")),
            db_pool_size: parse(&lookup, "DB_POOL_SIZE", 8)?,
            hash_cost: HashCost {
                memory_kib: parse(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            },
            session_ttl: Duration::from_secs(ttl_minutes * 60),
            recent_records_limit,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, None);
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
        assert_eq!(s.models_dir, PathBuf::from("models"));
        assert_eq!(s.db_pool_size, 8);
        assert_eq!(s.hash_cost, HashCost::default());
        assert_eq!(s.session_ttl, Duration::from_secs(3600));
        assert_eq!(s.recent_records_limit, 5);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://localhost/medirisk"),
            ("SESSION_TTL_MINUTES", "5"),
            ("PASSWORD_ITERATIONS", " 3 "),
        ])
        .unwrap();
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/medirisk"));
        assert_eq!(s.session_ttl, Duration::from_secs(300));
        assert_eq!(s.hash_cost.iterations, 3);
    }

    #[test]
    fn test_unparsable_value() {
        let err = settings(&[("DB_POOL_SIZE", "lots")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "DB_POOL_SIZE", value: "lots".to_string() });
        assert!(settings(&[("RECENT_RECORDS_LIMIT", "0")]).is_err());
    }
}
