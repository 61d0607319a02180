//! CLI error types and exit codes

use passage_core::StoreError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read export file '{path}': {message}")]
    ExportUnreadable { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation(_) => 4,
            CliError::Config(_) => 1,
            CliError::ExportUnreadable { .. } => 4,
            CliError::Io(_) => 1,
            CliError::Store(err) => match err {
                StoreError::Network(_) => 3,
                StoreError::NotFound(_) | StoreError::PhoneConflict(_) => 4,
                StoreError::Api { status, .. } => {
                    if *status >= 500 {
                        5
                    } else {
                        4
                    }
                }
                StoreError::InvalidResponse(_) => 5,
                StoreError::Configuration(_) => 1,
            },
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Store(StoreError::Configuration(_)) | CliError::Config(_) => Some(
                "Set PASSAGE_PROJECT_ID and PASSAGE_ACCESS_TOKEN, or pass --project-id and --access-token.",
            ),
            CliError::Store(StoreError::Network(_)) => {
                Some("Check your network connection and try again.")
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Io(format!("Dialog error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_validation() {
        assert_eq!(CliError::Validation("test".to_string()).exit_code(), 4);
    }

    #[test]
    fn test_exit_code_config() {
        assert_eq!(CliError::Config("test".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_exit_code_unreadable_export() {
        let err = CliError::ExportUnreadable {
            path: "users.json".to_string(),
            message: "No such file".to_string(),
        };
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("users.json"));
    }

    #[test]
    fn test_exit_code_store_network() {
        assert_eq!(CliError::Store(StoreError::network("timed out")).exit_code(), 3);
    }

    #[test]
    fn test_exit_code_store_api_5xx() {
        let err = CliError::Store(StoreError::api("auth", 500, "internal"));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exit_code_store_api_4xx() {
        let err = CliError::Store(StoreError::api("auth", 403, "denied"));
        assert_eq!(err.exit_code(), 4);
    }
}
