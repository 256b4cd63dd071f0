use colored::*;
use costar_core::error::{Error as CoreError, UpstreamError};
use std::error::Error as StdError;
use std::fmt;

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    /// The main error message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Additional context information
    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    Network,
    NotFound,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    NetworkError = 3,
    NotFound = 4,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
    fn with_source(self, source: Box<dyn StdError + Send + Sync>) -> Self;
}

impl CliError {
    fn new(message: &str, category: ErrorCategory, suggestions: Vec<String>) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions,
            source: None,
        }
    }

    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self::new(message, ErrorCategory::General, Vec::new())
    }

    /// Create a command misuse error
    pub fn misuse(message: &str) -> Self {
        Self::new(
            message,
            ErrorCategory::Misuse,
            vec!["Run 'costar --help' for usage information".to_string()],
        )
    }

    /// Create a network error
    pub fn network(message: &str) -> Self {
        Self::new(
            message,
            ErrorCategory::Network,
            vec![
                "Check your internet connection".to_string(),
                "Try again later".to_string(),
            ],
        )
    }

    /// Create a not-found error
    pub fn not_found(message: &str) -> Self {
        Self::new(message, ErrorCategory::NotFound, Vec::new())
    }

    /// Map a core library error onto a category with suggestions
    pub fn from_core(error: &CoreError) -> Self {
        let message = error.to_string();
        match error {
            CoreError::NotFound { .. } => Self::not_found(&message).with_suggestion(
                "The search explores a bounded part of the graph; a longer connection may still exist",
            ),
            CoreError::Upstream(UpstreamError::MissingEntity { .. }) => Self::not_found(&message)
                .with_suggestion("Check the actor id, or pass names with --by-name"),
            CoreError::Upstream(UpstreamError::Http { status, .. })
                if matches!(status, 401 | 403) =>
            {
                Self::misuse(&message)
                    .with_suggestion("Check provider.api_key with 'costar config get provider.api_key'")
            }
            CoreError::Upstream(_) => Self::network(&message),
            CoreError::Validation(_) => Self::misuse(&message),
            CoreError::Internal(_) => Self::general(&message),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Network => ExitCode::NetworkError,
            ErrorCategory::NotFound => ExitCode::NotFound,
        }
    }

    fn label(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::Network => "Network Error",
            ErrorCategory::NotFound => "Not Found",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse | ErrorCategory::NotFound => self.label().yellow(),
            ErrorCategory::General | ErrorCategory::Network => self.label().red(),
        };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message)?;

        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }

        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

/// Convert anyhow errors to CLI errors, keeping the category of a wrapped
/// `CliError` or core error
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<CliError>() {
            Ok(cli_error) => return cli_error,
            Err(error) => error,
        };

        let mut cli_error = match error.downcast_ref::<CoreError>() {
            Some(core) => Self::from_core(core),
            None => Self::general(""),
        };
        cli_error.message = format!("{error:#}");
        cli_error.with_source(error.into())
    }
}
