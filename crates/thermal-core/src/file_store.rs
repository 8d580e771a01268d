//! Session store backed by a directory of JSON exports.

use crate::error::{Result, ThermalError};
use crate::normalize::{normalize_records, raw_rows_from_json, sort_newest_first};
use crate::store::{SessionQuery, SessionSource};
use crate::types::{RawSessionRecord, SessionRecord};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;

pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read one export file: a single row or an array of rows.
    async fn read_rows(path: &Path) -> Result<Vec<RawSessionRecord>> {
        let json = async_fs::read_to_string(path).await?;
        let payload: serde_json::Value = serde_json::from_str(&json)?;
        Ok(raw_rows_from_json(payload))
    }

    /// Load and normalize every row in the directory, newest first.
    pub async fn load_all(&self) -> Result<Vec<SessionRecord>> {
        let mut entries = match async_fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Sessions directory {:?} does not exist yet", self.dir);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_rows(&path).await {
                Ok(mut file_rows) => rows.append(&mut file_rows),
                Err(e) => {
                    tracing::warn!("Failed to load sessions from {:?}: {}", path, e);
                }
            }
        }

        let mut records = normalize_records(rows);
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Copy a JSON export into the store. Returns the number of rows it holds.
    pub async fn import(&self, source: &Path) -> Result<usize> {
        let rows = Self::read_rows(source).await?;
        let file_name = source.file_name().ok_or_else(|| {
            ThermalError::Store(format!("Not a file path: {}", source.display()))
        })?;

        async_fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(file_name);
        if async_fs::try_exists(&target).await? {
            return Err(ThermalError::Store(format!(
                "An export named {:?} is already imported",
                file_name
            )));
        }
        async_fs::copy(source, &target).await?;
        tracing::info!("Imported {} session rows into {:?}", rows.len(), target);
        Ok(rows.len())
    }
}

#[async_trait]
impl SessionSource for FileSessionStore {
    async fn fetch(&self, query: &SessionQuery) -> Result<Vec<SessionRecord>> {
        let records = self.load_all().await?;
        let page = records
            .into_iter()
            .filter(|r| match &query.user_id {
                Some(wanted) => r.user_id.as_deref() == Some(wanted.as_str()),
                None => true,
            })
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(page)
    }

    fn name(&self) -> &str {
        "file"
    }
}
