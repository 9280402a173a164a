use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use compose_core::{ComposeConfig, ComposeConfigSnapshot};

pub const ENV_PREFIX: &str = "COMPOSE__";

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub posts_per_page: usize,
    /// Unset means in-memory stores.
    pub storage_dir: Option<PathBuf>,
    pub max_blob_bytes: u64,
    pub session_tokens: Vec<String>,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub bcrypt_cost: u32,
}

/// Defaults, overridden by `COMPOSE__*` environment variables.
pub fn load() -> ComposeConfig {
    let mut config = defaults();
    config.load_env(ENV_PREFIX);
    config
}

pub fn defaults() -> ComposeConfig {
    let mut config = ComposeConfig::new();
    config.set("http.host", "127.0.0.1");
    config.set("http.port", "8080");
    config.set("index.posts_per_page", "5");
    config.set("blob.max_bytes", (100u64 * 1024 * 1024).to_string());
    config.set("admin.email", "admin@example.com");
    config.set("auth.bcrypt_cost", bcrypt::DEFAULT_COST.to_string());
    config
}

fn parsed<T>(snap: &ComposeConfigSnapshot, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match snap.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value {raw:?} for config key '{key}'")),
        None => Ok(default),
    }
}

impl ServerConfig {
    pub fn from_snapshot(snap: &ComposeConfigSnapshot) -> Result<Self> {
        let posts_per_page = parsed(snap, "index.posts_per_page", 5usize)?;
        if posts_per_page == 0 {
            anyhow::bail!("config key 'index.posts_per_page' must be greater than zero");
        }

        let bcrypt_cost = parsed(snap, "auth.bcrypt_cost", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            anyhow::bail!("config key 'auth.bcrypt_cost' must be between 4 and 31");
        }

        Ok(Self {
            host: snap
                .get_string("http.host")
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(snap, "http.port", 8080u16)?,
            posts_per_page,
            storage_dir: snap
                .get("storage.dir")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            max_blob_bytes: parsed(snap, "blob.max_bytes", 100 * 1024 * 1024u64)?,
            session_tokens: snap.get_list("auth.tokens"),
            admin_email: snap
                .get_string("admin.email")
                .unwrap_or_else(|| "admin@example.com".to_string()),
            admin_password: snap.get_string("admin.password").filter(|s| !s.is_empty()),
            bcrypt_cost,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = ServerConfig::from_snapshot(&defaults().snapshot()).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.posts_per_page, 5);
        assert!(cfg.storage_dir.is_none());
        assert!(cfg.session_tokens.is_empty());
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn env_style_overrides_apply() {
        let mut config = defaults();
        config.load_vars(
            ENV_PREFIX,
            vec![
                ("COMPOSE__INDEX__POSTS_PER_PAGE".to_string(), "10".to_string()),
                ("COMPOSE__AUTH__TOKENS".to_string(), "a, b".to_string()),
                ("COMPOSE__STORAGE__DIR".to_string(), "/srv/compose".to_string()),
            ],
        );
        let cfg = ServerConfig::from_snapshot(&config.snapshot()).unwrap();
        assert_eq!(cfg.posts_per_page, 10);
        assert_eq!(cfg.session_tokens, vec!["a", "b"]);
        assert_eq!(cfg.storage_dir, Some(PathBuf::from("/srv/compose")));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = defaults();
        config.set("index.posts_per_page", "0");
        assert!(ServerConfig::from_snapshot(&config.snapshot()).is_err());
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let mut config = defaults();
        config.set("http.port", "eighty");
        let err = ServerConfig::from_snapshot(&config.snapshot()).unwrap_err();
        assert!(err.to_string().contains("http.port"));
    }
}
