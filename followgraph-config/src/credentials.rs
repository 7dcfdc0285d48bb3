//! Dotenv-style credential loading.
//!
//! Values already present in the process environment win over the file, matching how
//! dotenv files are conventionally applied. A missing file is not an error: the
//! environment alone may carry the credentials, and the client builder decides whether
//! what was found is enough.

use crate::ConfigError;
use followgraph_common::Credentials;
use std::path::Path;

/// Read `bearer_token`, `consumer_key`, `consumer_secret`, `access_token` and
/// `access_token_secret` from `path`, overlaid by same-named environment variables.
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials, ConfigError> {
    let path = path.as_ref();
    let mut creds = Credentials::default();

    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            for item in iter {
                let (key, value) = item.map_err(|e| ConfigError::Credentials {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                creds.set(&key, value);
            }
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path=%path.display(), "credentials.file_missing");
        }
        Err(e) => {
            return Err(ConfigError::Credentials {
                path: path.display().to_string(),
                message: e.to_string(),
            });
        }
    }

    for key in Credentials::KEYS {
        if let Ok(value) = std::env::var(key) {
            creds.set(key, value);
        }
    }

    let present: Vec<&str> = Credentials::KEYS
        .into_iter()
        .filter(|k| creds.get(k).is_some())
        .collect();
    tracing::debug!(path=%path.display(), ?present, "credentials.loaded");
    Ok(creds)
}
