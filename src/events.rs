//! Control messages between the application and the console UI, and the
//! optional debug log sink.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Messages from the application to the console UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ControlMessage {
    AppendToGeneralOutput(String),
    AppendToErrorOutput(String),
    ReplaceCommandText(String),
}

/// Messages from the console UI back to the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum UiNotice {
    CommandEntered(String),
    UiExited,
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Line-oriented debug log. Writes nowhere until a file is attached.
pub struct DebugSink {
    file: Option<std::fs::File>,
}

impl DebugSink {
    pub fn discard() -> Self {
        Self { file: None }
    }

    pub fn to_file(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open debug log {}", path.display()))?;
        Ok(Self { file: Some(file) })
    }

    /// Appends one timestamped line. Write failures are swallowed; the
    /// debug log must never take the console down.
    pub fn line(&mut self, message: &str) {
        if let Some(file) = self.file.as_mut() {
            let _ = writeln!(file, "{} {message}", now_rfc3339());
        }
    }
}
