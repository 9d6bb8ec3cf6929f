use std::fmt;

use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification used when failures are flattened into envelope strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SymbolResolution,
    Configuration,
    Transport,
    Decode,
    Internal,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::SymbolResolution => "symbol not resolved",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("symbol `{symbol}` could not be resolved{}", describe_miss(.suggestions, .reason.as_deref()))]
    SymbolResolution {
        symbol: String,
        suggestions: Vec<String>,
        reason: Option<String>,
    },
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        AppError::Transport(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        AppError::Decode(msg.into())
    }

    pub fn unresolved(symbol: &str, suggestions: Vec<String>, reason: Option<String>) -> Self {
        AppError::SymbolResolution {
            symbol: symbol.to_string(),
            suggestions,
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::SymbolResolution { .. } => ErrorKind::SymbolResolution,
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Transport(_) | AppError::Reqwest(_) | AppError::Io(_) => {
                ErrorKind::Transport
            }
            AppError::Decode(_) | AppError::Json(_) | AppError::Csv(_) => ErrorKind::Decode,
            AppError::Message(_) | AppError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Render as a single envelope entry, prefixed with the kind label.
    pub fn envelope_entry(&self) -> String {
        match self {
            // The resolution message already says what failed.
            AppError::SymbolResolution { .. } => self.to_string(),
            other => format!("{}: {}", other.kind().label(), other),
        }
    }
}

fn describe_miss(suggestions: &[String], reason: Option<&str>) -> String {
    match (reason, suggestions.is_empty()) {
        (Some(reason), _) => format!(": {reason}"),
        (None, false) => format!("; did you mean: {}", suggestions.join(", ")),
        (None, true) => "; no matching symbols found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_mentions_resolution_and_suggestions() {
        let err = AppError::unresolved(
            "RELIANC",
            vec!["RELIANCE".to_string(), "RELINFRA".to_string()],
            None,
        );
        let entry = err.envelope_entry();
        assert!(entry.contains("could not be resolved"));
        assert!(entry.contains("RELIANCE, RELINFRA"));
        assert_eq!(err.kind(), ErrorKind::SymbolResolution);
    }

    #[test]
    fn configuration_entries_carry_kind_prefix() {
        let err = AppError::configuration("interval 7 minutes is not supported");
        assert_eq!(
            err.envelope_entry(),
            "configuration error: interval 7 minutes is not supported"
        );
    }

    #[test]
    fn anyhow_context_lands_in_internal_kind() {
        let failure: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "boom",
        ));
        let err: AppError = failure.context("reading config").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn reqwest_failures_are_transport_errors() {
        let failure = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .unwrap_err();
        let err = AppError::from(failure);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.envelope_entry().starts_with("transport error: "));
    }
}
