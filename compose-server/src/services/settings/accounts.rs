use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use compose_core::ComposeError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::fs;
use tokio::sync::RwLock;

/// The administrator account that every accepted session acts as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password_hash: Option<String>,
}

/// Holds the admin account. With a `path` the account is persisted as JSON
/// and the stored copy wins over the configured defaults on startup.
pub struct AccountSettings {
    admin: RwLock<Account>,
    path: Option<PathBuf>,
    cost: u32,
}

impl AccountSettings {
    pub async fn new(email: String, password: Option<&str>, cost: u32) -> Result<Self> {
        Self::open(None, email, password, cost).await
    }

    pub async fn open(
        path: Option<PathBuf>,
        email: String,
        password: Option<&str>,
        cost: u32,
    ) -> Result<Self> {
        let stored = match &path {
            Some(path) => read_account(path).await?,
            None => None,
        };

        let admin = match stored {
            Some(account) => {
                tracing::info!(email = %account.email, "loaded stored admin account");
                account
            }
            None => {
                let password_hash = match password {
                    Some(p) => Some(hash_password(p.to_string(), cost).await?),
                    None => None,
                };
                let account = Account {
                    email,
                    password_hash,
                };
                if let Some(path) = &path {
                    write_account(path, &account).await?;
                }
                account
            }
        };

        Ok(Self {
            admin: RwLock::new(admin),
            path,
            cost,
        })
    }

    /// Account bound to the caller's session.
    pub async fn current(&self) -> Account {
        self.admin.read().await.clone()
    }

    /// Apply an email and/or password change as one unit. The password is
    /// hashed before anything is written; nothing changes if hashing or
    /// persisting fails.
    pub async fn update(&self, email: Option<String>, password: Option<String>) -> Result<Account> {
        let password_hash = match password {
            Some(p) => Some(hash_password(p, self.cost).await?),
            None => None,
        };

        let mut admin = self.admin.write().await;
        let mut next = admin.clone();
        if let Some(email) = email {
            next.email = email;
        }
        if password_hash.is_some() {
            next.password_hash = password_hash;
        }

        if let Some(path) = &self.path {
            write_account(path, &next).await?;
        }
        *admin = next.clone();
        Ok(next)
    }

    pub async fn verify_password(&self, password: &str) -> Result<bool> {
        let Some(hash) = self.admin.read().await.password_hash.clone() else {
            return Ok(false);
        };
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("password verification task failed")?
            .context("password verification failed")
    }
}

async fn read_account(path: &Path) -> Result<Option<Account>> {
    match fs::read(path).await {
        Ok(raw) => {
            let account = serde_json::from_slice(&raw)
                .with_context(|| format!("stored account {} is not valid", path.display()))?;
            Ok(Some(account))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

// Callers hold the account write lock, so one staging file is enough.
async fn write_account(path: &Path, account: &Account) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(account)?).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("writing {}", path.display()));
    }
    Ok(())
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::non_truncating_hash(password, cost))
        .await
        .context("password hashing task failed")?;
    match hashed {
        Ok(hash) => Ok(hash),
        Err(bcrypt::BcryptError::Truncation(len)) => Err(ComposeError::unprocessable("Invalid settings")
            .with_errors(json!({
                "password": [format!("must be at most 72 bytes, got {len}")]
            }))
            .into_anyhow()),
        Err(e) => Err(e).context("password hashing failed"),
    }
}
