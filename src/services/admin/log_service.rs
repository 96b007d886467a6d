//! Reader for the log files written by the tracing subscriber.

use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::DEFAULT_LOG_LINES;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The log files the subscriber maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    App,
    Error,
    Access,
}

impl LogKind {
    pub const ALL: [LogKind; 3] = [LogKind::App, LogKind::Error, LogKind::Access];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::App => "app",
            LogKind::Error => "error",
            LogKind::Access => "access",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            LogKind::App => "app.log",
            LogKind::Error => "error.log",
            LogKind::Access => "access.log",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    pub lines: usize,
    pub offset: usize,
    pub search: Option<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LOG_LINES as usize,
            offset: 0,
            search: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPagination {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    #[serde(rename = "type")]
    pub kind: String,
    pub lines: Vec<String>,
    pub pagination: LogPagination,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LogService: Send + Sync {
    /// Newest lines first. Unknown log types are a 404.
    async fn read_log(&self, kind: &str, query: LogQuery) -> AppResult<LogPage>;
}

pub struct LogReader {
    dir: PathBuf,
}

impl LogReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LogService for LogReader {
    async fn read_log(&self, kind: &str, query: LogQuery) -> AppResult<LogPage> {
        let kind = LogKind::parse(kind)
            .ok_or_else(|| AppError::NotFoundEntity(format!("Log type '{}'", kind)))?;

        let path = self.dir.join(kind.file_name());
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        // Invalid UTF-8 is replaced, not rejected.
        let contents = String::from_utf8_lossy(&bytes);

        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<&str> = contents
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| match &needle {
                Some(needle) => line.to_lowercase().contains(needle),
                None => true,
            })
            .collect();

        let total = matching.len();
        let lines: Vec<String> = matching
            .into_iter()
            .skip(query.offset)
            .take(query.lines)
            .map(str::to_string)
            .collect();

        Ok(LogPage {
            kind: kind.as_str().to_string(),
            pagination: LogPagination {
                total,
                offset: query.offset,
                limit: query.lines,
                has_more: query.offset + lines.len() < total,
            },
            lines,
        })
    }
}
