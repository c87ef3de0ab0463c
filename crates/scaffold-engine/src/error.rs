//! Error types shared by the engine layers

use std::path::PathBuf;
use thiserror::Error;

/// Every fatal condition the engine can report.
///
/// A missing tool that fails its probe is not represented here: probe errors
/// degrade to "not available" inside the preflight layer. Steps that resolve to
/// no command are not errors either, they finish as `StepOutcome::Noop`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{tool} is required but not installed.\n{instructions}")]
    PreflightAbort { tool: String, instructions: String },

    #[error("The following command failed: \"{command}\" ({description}, {})", describe_code(.code))]
    CommandFailed {
        command: String,
        description: String,
        code: Option<i32>,
        output: Vec<String>,
    },

    #[error("The following command could not be started: \"{command}\" ({description})")]
    Spawn {
        command: String,
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Step \"{description}\" failed")]
    Task {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt failed")]
    Prompt(#[source] std::io::Error),

    #[error("Failed to load {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("Invalid remote '{remote}': {source}")]
    InvalidRemote {
        remote: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Could not find home directory")]
    HomeDirNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message_names_command_and_code() {
        let err = EngineError::CommandFailed {
            command: "yarn add cors".to_string(),
            description: "Installing server dependencies".to_string(),
            code: Some(1),
            output: vec!["error An unexpected error occurred".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("yarn add cors"));
        assert!(message.contains("code 1"));
    }

    #[test]
    fn test_signal_termination_message() {
        let err = EngineError::CommandFailed {
            command: "sleep 100".to_string(),
            description: "Waiting".to_string(),
            code: None,
            output: vec![],
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
