//! File-backed incident records for later triage

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::domain::traits::IncidentSink;

/// Appends each incident to `<directory>/<name>.txt`
pub struct FileIncidentLog {
    directory: PathBuf,
}

impl FileIncidentLog {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.txt", name))
    }

    async fn append(&self, name: &str, detail: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(name))
            .await?;

        let entry = format!(
            "[{}] {}\n{}\n\n",
            Utc::now().to_rfc3339(),
            uuid::Uuid::new_v4(),
            detail
        );
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl IncidentSink for FileIncidentLog {
    async fn record(&self, name: &str, detail: &str) {
        if let Err(e) = self.append(name, detail).await {
            tracing::error!(incident = name, "Failed to write incident record: {}", e);
        }
    }
}

/// Sink that only logs, for setups without an incident directory
pub struct TracingIncidentLog;

#[async_trait]
impl IncidentSink for TracingIncidentLog {
    async fn record(&self, name: &str, detail: &str) {
        tracing::error!(incident = name, "{}", detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileIncidentLog::new(dir.path().join("logs"));

        log.record("ERROR-processMessage", "first failure").await;
        log.record("ERROR-processMessage", "second failure").await;

        let content = std::fs::read_to_string(log.path_for("ERROR-processMessage")).unwrap();
        assert!(content.contains("first failure"));
        assert!(content.contains("second failure"));
        assert_eq!(content.matches("\n\n").count(), 2);
    }
}
