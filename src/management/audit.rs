use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use crate::config;

/// Local record of generated covers and the requests that produced them.
///
/// Each entry is a directory
/// `<root>/<kind>/<YYYYmmdd_HHMMSS.ffffff>_user_<id>/` holding
/// `body_data.json` and, when available, `image.png`.
#[derive(Debug, Clone)]
pub struct AuditLog {
    root: PathBuf,
}

impl AuditLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Audit log under the application data directory.
    pub fn in_data_dir() -> Self {
        Self::new(config::data_dir().join("logs"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes one entry and returns its directory.
    pub async fn record(
        &self,
        kind: &str,
        body: &Value,
        image: Option<&[u8]>,
    ) -> Result<PathBuf, String> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S.%6f");
        let user_id = body["user_id_searched"].as_str().unwrap_or_default();
        let dir = self
            .root
            .join(kind)
            .join(format!("{}_user_{}", timestamp, user_id));

        async_fs::create_dir_all(&dir)
            .await
            .map_err(|e| e.to_string())?;

        let json = serde_json::to_string_pretty(body).map_err(|e| e.to_string())?;
        async_fs::write(dir.join("body_data.json"), json)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(image) = image {
            async_fs::write(dir.join("image.png"), image)
                .await
                .map_err(|e| e.to_string())?;
        }

        Ok(dir)
    }
}
