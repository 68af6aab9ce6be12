use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Structured menu events. Always traced; also appended as JSON lines when a
/// log file is configured.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
}

impl EventLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }
}

impl EventLog {
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn debug(&self, event: &str, fields: &[(&str, Value)]) {
        self.record(EventLevel::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: &[(&str, Value)]) {
        self.record(EventLevel::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: &[(&str, Value)]) {
        self.record(EventLevel::Warn, event, fields);
    }

    pub fn record(&self, level: EventLevel, event: &str, fields: &[(&str, Value)]) {
        let mut payload = Map::new();
        for (key, value) in fields {
            payload.insert((*key).to_string(), value.clone());
        }
        let detail = Value::Object(payload.clone());
        match level {
            EventLevel::Debug => tracing::debug!(event, %detail, "menu event"),
            EventLevel::Info => tracing::info!(event, %detail, "menu event"),
            EventLevel::Warn => tracing::warn!(event, %detail, "menu event"),
        }

        let Some(path) = self.path.as_deref() else {
            return;
        };
        payload.insert(
            "timestamp".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        payload.insert(
            "level".to_string(),
            Value::String(level.as_str().to_string()),
        );
        payload.insert("event".to_string(), Value::String(event.to_string()));
        if let Err(err) = append_event_line(path, &Value::Object(payload)) {
            tracing::warn!(path = %path.display(), error = %err, "failed to append menu event");
        }
    }
}

fn append_event_line(path: &Path, payload: &Value) -> std::io::Result<()> {
    let line = serde_json::to_string(payload)
        .map_err(|source| std::io::Error::other(source.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}
