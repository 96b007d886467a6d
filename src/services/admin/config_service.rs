//! Dotenv file viewer and editor.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::{MASKED_VALUE, SECRET_KEY_MARKERS};
use crate::errors::{AppError, AppResult};
use crate::validation::ErrorCode;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Every key in the file; secret values are masked.
    async fn read_config(&self) -> AppResult<BTreeMap<String, String>>;

    /// Rewrite the key's line in place, or append it.
    async fn update_config(&self, key: &str, value: &str) -> AppResult<()>;
}

pub fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    SECRET_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Key of a `KEY=value` line, ignoring comments and an `export` prefix.
fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=').map(|(key, _)| key.trim())
}

fn is_bare(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_./:@,+=%?&".contains(c)
}

/// Render a line dotenvy reads back as exactly `value`.
fn render_line(key: &str, value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_bare) {
        return format!("{}={}", key, value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("{}=\"{}\"", key, quoted)
}

pub struct DotenvConfig {
    path: PathBuf,
}

impl DotenvConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn contents(&self) -> AppResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ConfigService for DotenvConfig {
    async fn read_config(&self) -> AppResult<BTreeMap<String, String>> {
        let contents = self.contents().await?;
        let mut values = BTreeMap::new();
        for entry in dotenvy::from_read_iter(contents.as_bytes()) {
            match entry {
                Ok((key, value)) => {
                    let shown = if is_secret(&key) { MASKED_VALUE.to_string() } else { value };
                    values.insert(key, shown);
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        path = %self.path.display(),
                        "skipping unreadable config line"
                    );
                }
            }
        }
        Ok(values)
    }

    async fn update_config(&self, key: &str, value: &str) -> AppResult<()> {
        if value.contains(['\n', '\r']) {
            return Err(AppError::field(
                "value",
                ErrorCode::Custom,
                "\"value\" must be a single line",
            ));
        }

        let contents = self.contents().await?;
        let mut replaced = false;
        let mut lines: Vec<String> = contents
            .lines()
            .map(|line| match line_key(line) {
                Some(existing) if existing == key && !replaced => {
                    replaced = true;
                    render_line(key, value)
                }
                _ => line.to_string(),
            })
            .collect();
        if !replaced {
            lines.push(render_line(key, value));
        }

        let mut rendered = lines.join("\n");
        rendered.push('\n');
        tokio::fs::write(&self.path, rendered).await?;

        tracing::warn!(key, path = %self.path.display(), "configuration file updated");
        Ok(())
    }
}
