use serde::{Serialize, Deserialize};
use std::fmt;

use crate::planner::request::RequestError;

/// Unified error type for the studypath crate.
/// Fallible library functions return Result<T, StudyError>.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyError {
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl StudyError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        StudyError {
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self.stage.as_str(), "validation" | "date_parse")
    }
}

impl fmt::Display for StudyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StudyError {}

impl From<RequestError> for StudyError {
    fn from(err: RequestError) -> Self {
        let stage = match err {
            RequestError::InvalidExamDate(_) => "date_parse",
            _ => "validation",
        };
        StudyError::new(err.to_string(), stage)
    }
}

impl From<std::io::Error> for StudyError {
    fn from(err: std::io::Error) -> Self {
        StudyError::new(
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<serde_json::Error> for StudyError {
    fn from(err: serde_json::Error) -> Self {
        StudyError::new(
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}

impl From<toml::de::Error> for StudyError {
    fn from(err: toml::de::Error) -> Self {
        StudyError::new(
            format!("TOML error: {}", err),
            "config"
        ).with_source("toml")
    }
}
