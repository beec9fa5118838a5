//! Access token persistence
//!
//! The OAuth access token is kept in a small TOML file in the platform
//! config directory, with owner-only permissions on Unix. An empty or
//! missing file reads as "not signed in".

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::storage;
use crate::errors::{TokenError, TokenResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    access_token: Option<String>,
}

/// File-backed credential store for the access token
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store reading and writing the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a store at the default platform location
    pub fn default_location() -> TokenResult<Self> {
        let dir = dirs::config_dir()
            .ok_or(TokenError::NoConfigDir)?
            .join(storage::APP_DIR_NAME);
        Ok(Self::new(dir.join(storage::TOKEN_FILE_NAME)))
    }

    /// Read the stored token. Absent files and empty tokens read as `None`.
    pub fn token(&self) -> TokenResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let file: TokenFile = toml::from_str(&contents)?;
        Ok(file.access_token.filter(|token| !token.is_empty()))
    }

    /// Persist a new token, replacing any existing one
    pub fn update(&self, token: &str) -> TokenResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(&TokenFile {
            access_token: Some(token.to_string()),
        })?;
        fs::write(&self.path, contents)?;

        // Restrict to the owner; the token grants account access.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(storage::TOKEN_FILE_PERMISSIONS);
            fs::set_permissions(&self.path, perms)?;
        }

        debug!("access token updated");
        Ok(())
    }

    /// Remove the stored token, signing the user out
    pub fn clear(&self) -> TokenResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("access token cleared");
        }
        Ok(())
    }
}
