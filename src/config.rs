//! Credential loading and persistence.
//!
//! Credentials are two key/value pairs kept in dotenv-style files. They are
//! resolved from the process environment first, then from a directory-level
//! override file, then from the per-user file in the home directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "CLICKUP_API_TOKEN";
pub const TEAM_KEY: &str = "CLICKUP_TEAM_ID";
pub const USER_FILE_NAME: &str = ".clup.env";
pub const LOCAL_FILE_NAME: &str = ".env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub team_id: String,
}

impl Credentials {
    pub fn new(api_token: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            team_id: team_id.into(),
        }
    }

    /// Both values are present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.api_token.is_empty() && !self.team_id.is_empty()
    }

    /// Fill empty fields from `other`, keeping values already set.
    fn fill_from(&mut self, other: Credentials) {
        if self.api_token.is_empty() {
            self.api_token = other.api_token;
        }
        if self.team_id.is_empty() {
            self.team_id = other.team_id;
        }
    }
}

/// Where credentials are read from and written to.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    user_file: PathBuf,
    override_file: PathBuf,
    save_file: PathBuf,
}

impl CredentialStore {
    /// Store rooted at the user's home directory. `env_file` replaces the
    /// local `./.env` override and also becomes the save target.
    pub fn new(env_file: Option<PathBuf>) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let user_file = home.join(USER_FILE_NAME);
        match env_file {
            Some(path) => Self {
                user_file,
                override_file: path.clone(),
                save_file: path,
            },
            None => Self {
                save_file: user_file.clone(),
                user_file,
                override_file: PathBuf::from(LOCAL_FILE_NAME),
            },
        }
    }

    pub fn with_paths(user_file: PathBuf, override_file: PathBuf) -> Self {
        Self {
            save_file: user_file.clone(),
            user_file,
            override_file,
        }
    }

    pub fn save_path(&self) -> &Path {
        &self.save_file
    }

    /// Resolve credentials from the process environment and the files.
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Resolve credentials using `env` in place of the process environment.
    pub fn load_with<F>(&self, env: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut creds = Credentials::new(
            env(TOKEN_KEY).unwrap_or_default(),
            env(TEAM_KEY).unwrap_or_default(),
        );
        // An override dotenvy cannot parse contributes nothing.
        let local = read_file(&self.override_file).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable override file");
            Credentials::default()
        });
        creds.fill_from(local);
        creds.fill_from(read_file(&self.user_file)?);
        debug!(complete = creds.is_complete(), "credentials resolved");
        Ok(creds)
    }

    /// Write credentials to the save file, readable by the owner only.
    pub fn save(&self, creds: &Credentials) -> Result<(), ConfigError> {
        let path = &self.save_file;
        let contents = format!(
            "{TOKEN_KEY}=\"{}\"\n{TEAM_KEY}=\"{}\"\n",
            quote(&creds.api_token),
            quote(&creds.team_id)
        );
        write_private(path, contents.as_bytes()).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "credentials saved");
        Ok(())
    }
}

/// Read both keys from a dotenv file without touching the process environment.
/// A missing file yields empty credentials.
fn read_file(path: &Path) -> Result<Credentials, ConfigError> {
    if !path.is_file() {
        return Ok(Credentials::default());
    }
    let read_err = |source: dotenvy::Error| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut creds = Credentials::default();
    for item in dotenvy::from_path_iter(path).map_err(read_err)? {
        let (key, value) = item.map_err(read_err)?;
        match key.as_str() {
            TOKEN_KEY => creds.api_token = value,
            TEAM_KEY => creds.team_id = value,
            _ => {}
        }
    }
    Ok(creds)
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(bytes)
    }
    #[cfg(not(unix))]
    {
        let mut file = options.open(path)?;
        file.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::with_paths(dir.path().join(USER_FILE_NAME), dir.path().join(LOCAL_FILE_NAME))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_files_give_empty_credentials() {
        let dir = TempDir::new().unwrap();
        let creds = store_in(&dir).load_with(no_env).unwrap();
        assert_eq!(creds, Credentials::default());
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("pk_123", "900")).unwrap();

        let written = fs::read_to_string(store.save_path()).unwrap();
        assert_eq!(written, "CLICKUP_API_TOKEN=\"pk_123\"\nCLICKUP_TEAM_ID=\"900\"\n");

        let creds = store.load_with(no_env).unwrap();
        assert_eq!(creds, Credentials::new("pk_123", "900"));
        assert!(creds.is_complete());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Credentials::new("a", "b")).unwrap();
        let mode = fs::metadata(store.save_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_precedence_env_then_local_then_user() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(USER_FILE_NAME),
            "CLICKUP_API_TOKEN=user_token\nCLICKUP_TEAM_ID=user_team\n",
        )
        .unwrap();
        fs::write(dir.path().join(LOCAL_FILE_NAME), "CLICKUP_TEAM_ID=local_team\n").unwrap();
        let store = store_in(&dir);

        let creds = store.load_with(no_env).unwrap();
        assert_eq!(creds, Credentials::new("user_token", "local_team"));

        let creds = store
            .load_with(|key| (key == TOKEN_KEY).then(|| "env_token".to_string()))
            .unwrap();
        assert_eq!(creds, Credentials::new("env_token", "local_team"));
    }

    #[test]
    fn test_empty_values_do_not_shadow() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(USER_FILE_NAME), "CLICKUP_API_TOKEN=kept\n").unwrap();
        fs::write(dir.path().join(LOCAL_FILE_NAME), "CLICKUP_API_TOKEN=\n").unwrap();

        let creds = store_in(&dir)
            .load_with(|_| Some(String::new()))
            .unwrap();
        assert_eq!(creds.api_token, "kept");
    }

    #[test]
    fn test_unparseable_override_falls_back_to_user_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(USER_FILE_NAME),
            "CLICKUP_API_TOKEN=pk_user\nCLICKUP_TEAM_ID=42\n",
        )
        .unwrap();
        fs::write(dir.path().join(LOCAL_FILE_NAME), "GREETING=hello world\n").unwrap();

        let creds = store_in(&dir).load_with(no_env).unwrap();
        assert_eq!(creds, Credentials::new("pk_user", "42"));
    }
}
