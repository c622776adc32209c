// Credential storage
// Persists the bearer token and the user profile; both are written and
// cleared together.

use anyhow::{Context, Result};
use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::types::Profile;

pub const TOKEN_KEY: &str = "auth_token";
pub const PROFILE_KEY: &str = "auth_user";

/// Secure key-value storage for the session
pub trait CredentialStore: Send + Sync {
    /// Stored bearer token, if any
    fn token(&self) -> Result<Option<String>>;

    /// Stored user profile, if any
    fn profile(&self) -> Result<Option<Profile>>;

    /// Store token and profile as one unit
    fn save(&self, token: &str, profile: &Profile) -> Result<()>;

    /// Remove token and profile
    fn clear(&self) -> Result<()>;
}

/// SQLite-backed store, one row per key in `auth_kv`
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create credential directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        tracing::debug!("Opened credential store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to create auth_kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential store lock poisoned"))?;

        conn.query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("Failed to read {} from SQLite", key))
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn token(&self) -> Result<Option<String>> {
        self.read(TOKEN_KEY)
    }

    fn profile(&self) -> Result<Option<Profile>> {
        match self.read(PROFILE_KEY)? {
            Some(json) => {
                let profile = serde_json::from_str(&json)
                    .context("Failed to parse stored profile")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn save(&self, token: &str, profile: &Profile) -> Result<()> {
        let profile_json = serde_json::to_string(profile).context("Failed to serialize profile")?;

        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential store lock poisoned"))?;
        let tx = conn.transaction().context("Failed to start transaction")?;
        for (key, value) in [(TOKEN_KEY, token), (PROFILE_KEY, profile_json.as_str())] {
            tx.execute(
                "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write {} to SQLite", key))?;
        }
        tx.commit().context("Failed to commit credentials")?;

        tracing::debug!(login = %profile.login, "Credentials saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential store lock poisoned"))?;
        let tx = conn.transaction().context("Failed to start transaction")?;
        tx.execute(
            "DELETE FROM auth_kv WHERE key IN (?1, ?2)",
            params![TOKEN_KEY, PROFILE_KEY],
        )
        .context("Failed to delete credentials")?;
        tx.commit().context("Failed to commit credential removal")?;

        tracing::debug!("Credentials cleared");
        Ok(())
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<&'static str, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session
    pub fn with_session(token: &str, profile: &Profile) -> Result<Self> {
        let store = Self::new();
        store.save(token, profile)?;
        Ok(store)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.entries.get(TOKEN_KEY).map(|v| v.value().clone()))
    }

    fn profile(&self) -> Result<Option<Profile>> {
        match self.entries.get(PROFILE_KEY) {
            Some(json) => Ok(Some(
                serde_json::from_str(json.value()).context("Failed to parse stored profile")?,
            )),
            None => Ok(None),
        }
    }

    fn save(&self, token: &str, profile: &Profile) -> Result<()> {
        let profile_json = serde_json::to_string(profile).context("Failed to serialize profile")?;
        self.entries.insert(TOKEN_KEY, token.to_string());
        self.entries.insert(PROFILE_KEY, profile_json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.remove(TOKEN_KEY);
        self.entries.remove(PROFILE_KEY);
        Ok(())
    }
}
