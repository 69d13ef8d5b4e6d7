//! Bounded, newest-first listing log.
//!
//! Each append rewrites the whole file: read, prepend, cut to `max_lines`,
//! write to a sibling temp file and rename it over the log. Only the poller
//! writes here, so there is no locking.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tracing::debug;

use crate::error::AuditLogError;

pub const DEFAULT_MAX_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    max_lines: usize,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepends `"{timestamp} - {text}"` and keeps the newest `max_lines`.
    pub async fn append(&self, text: &str) -> Result<(), AuditLogError> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{stamp} - {}", text.replace(['\r', '\n'], " "));

        let mut lines = self.read_lines().await?;
        lines.insert(0, line);
        lines.truncate(self.max_lines);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| self.io(e))?;
        }

        let mut body = lines.join("\n");
        body.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, body).await.map_err(|e| self.io(e))?;
        fs::rename(&tmp, &self.path).await.map_err(|e| self.io(e))?;

        debug!(path = %self.path.display(), lines = lines.len(), "audit log updated");
        Ok(())
    }

    /// Current lines, newest first. A missing file reads as empty.
    pub async fn read_lines(&self) -> Result<Vec<String>, AuditLogError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io(e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io(&self, source: std::io::Error) -> AuditLogError {
        AuditLogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_twenty_newest_lines_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("listings.txt"));

        for i in 1..=25 {
            log.append(&format!("[MATCH] line {i}")).await.unwrap();
        }

        let lines = log.read_lines().await.unwrap();
        assert_eq!(lines.len(), 20);
        assert!(lines[0].ends_with(" - [MATCH] line 25"));
        assert!(lines[19].ends_with(" - [MATCH] line 6"));
    }

    #[tokio::test]
    async fn lines_carry_a_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("listings.txt"));

        log.append("hello").await.unwrap();

        let line = &log.read_lines().await.unwrap()[0];
        let (stamp, rest) = line.split_once(" - ").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
        assert_eq!(rest, "hello");
    }

    #[tokio::test]
    async fn creates_missing_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("logs").join("listings.txt"));

        assert!(log.read_lines().await.unwrap().is_empty());
        log.append("first").await.unwrap();

        assert_eq!(log.read_lines().await.unwrap().len(), 1);
        assert!(!dir.path().join("logs").join("listings.txt.tmp").exists());
    }

    #[tokio::test]
    async fn embedded_newlines_do_not_split_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("listings.txt")).with_max_lines(2);

        log.append("a\nb").await.unwrap();
        log.append("c").await.unwrap();
        log.append("d").await.unwrap();

        let lines = log.read_lines().await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("c"));
    }
}
