//! Notifications raised while loading collections.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// The list is showing records from an earlier load.
    Warning,
    /// A load failed.
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-blocking message shown next to the list, like a toast.
///
/// Printed as `level: text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn warning(text: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.text)
    }
}
