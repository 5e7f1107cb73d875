//! Error types for the category agent
//!
//! Library errors use thiserror. None of these ever reach the user as raw
//! text: the dispatcher turns them into chat messages.

use thiserror::Error;

/// Errors raised by a [`crate::directory::CategoryDirectory`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Backend unreachable, or authentication rejected
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend rejected a write (invalid id, permission failure, ...)
    #[error("Update of category {category_id} rejected: {reason}")]
    Update { category_id: u64, reason: String },
}

impl DirectoryError {
    pub fn is_connection(&self) -> bool {
        matches!(self, DirectoryError::Connection(_))
    }
}

/// Configuration errors from environment loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors from a conversation handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Conversation runtime has shut down")]
    Closed,
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DirectoryError::Update {
            category_id: 12,
            reason: "HTTP 403 rest_cannot_update".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Update of category 12 rejected: HTTP 403 rest_cannot_update"
        );
        assert!(!err.is_connection());
        assert!(DirectoryError::Connection("timeout".into()).is_connection());
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::Missing("WP_SITE_URL").to_string(),
            "WP_SITE_URL environment variable not set"
        );
    }
}
