//! Persisted application log events
//!
//! Kind-specific metadata lives in [`LogKind`] so a slow-query event cannot
//! carry a user action and vice versa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::{EntityKind, NEW_ID};

/// Severity of an application log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl_domain_status_conversions!(LogLevel {
    Debug => "debug",
    Info => "info",
    Warning => "warning",
    Error => "error",
    Critical => "critical",
});

/// Metadata attached to a log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogKind {
    General,
    UserAction {
        user_id: i64,
        action: String,
    },
    EntityChange {
        entity: EntityKind,
        entity_id: i64,
        action: String,
        #[serde(default)]
        changed_fields: Vec<String>,
    },
    SlowQuery {
        query: String,
        execution_ms: u64,
        records_affected: Option<u64>,
    },
    Error {
        stack_trace: Option<String>,
    },
}

impl LogKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::UserAction { .. } => "user_action",
            Self::EntityChange { .. } => "entity_change",
            Self::SlowQuery { .. } => "slow_query",
            Self::Error { .. } => "error",
        }
    }
}

/// One persisted application log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLog {
    pub id: i64,
    pub level: LogLevel,
    pub message: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
}

impl ApplicationLog {
    /// A plain entry stamped with the current time
    pub fn new(level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: NEW_ID,
            level,
            message: message.into(),
            source: source.into(),
            timestamp: Utc::now(),
            kind: LogKind::General,
        }
    }

    /// Attach structured details
    pub fn with_kind(mut self, kind: LogKind) -> Self {
        self.kind = kind;
        self
    }
}
