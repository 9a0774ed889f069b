use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::persist::Persist;
use crate::token::Token;

/// Keeps the token in a JSON file, written atomically (tmp -> rename, 0600).
#[derive(Debug, Clone)]
pub struct FilePersist {
    path: PathBuf,
}

impl FilePersist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token; a missing file is not an error.
    pub async fn load(&self) -> Result<Option<Token>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = serde_json::from_str(&raw)
                    .with_context(|| format!("token file '{}' is not valid JSON", self.path.display()))?;
                Ok(Some(token))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read token file '{}'", self.path.display())),
        }
    }

    async fn write_atomic(&self, content: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Persist for FilePersist {
    async fn persist(&self, token: &Token) -> Result<()> {
        let content = serde_json::to_vec_pretty(token)?;
        self.write_atomic(&content)
            .await
            .with_context(|| format!("write token file '{}'", self.path.display()))?;
        info!("token persisted to '{}'", self.path.display());
        Ok(())
    }
}
