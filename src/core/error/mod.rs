use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidJson,
    ValidationMultipleErrors,

    ProjectNotFound,
    ComponentNotFound,

    ImportNoMatches,
    ImportNoLanguages,
    ImportSlugExhausted,

    VcsCommandFailed,
    VcsLocked,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",
            ErrorCode::ValidationMultipleErrors => "validation.multiple_errors",

            ErrorCode::ProjectNotFound => "project.not_found",
            ErrorCode::ComponentNotFound => "component.not_found",

            ErrorCode::ImportNoMatches => "import.no_matches",
            ErrorCode::ImportNoLanguages => "import.no_languages",
            ErrorCode::ImportSlugExhausted => "import.slug_exhausted",

            ErrorCode::VcsCommandFailed => "vcs.command_failed",
            ErrorCode::VcsLocked => "vcs.locked",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundDetails {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

/// One rejected form field. A field may carry several problems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleErrorsDetails {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDetails {
    pub project: String,
    pub filemask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_files: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsCommandFailedDetails {
    pub vcs: String,
    pub command: String,
    pub stderr: String,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            to_details(MissingArgumentDetails { args }),
        )
    }

    /// The problem text doubles as the message so CLI users see the cause
    /// without digging into `details`.
    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            id,
            tried,
        });

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn validation_multiple_errors(errors: Vec<FieldError>) -> Self {
        let message = match errors.as_slice() {
            [single] => format!("{}: {}", single.field, single.problem),
            _ => format!("{} fields failed validation", errors.len()),
        };
        Self::new(
            ErrorCode::ValidationMultipleErrors,
            message,
            to_details(MultipleErrorsDetails { errors }),
        )
    }

    /// Field errors carried by a `validation.multiple_errors` error.
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.details
            .get("errors")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn project_not_found(id: impl Into<String>, suggestions: Vec<String>) -> Self {
        let id = id.into();
        let err = Self::not_found(
            ErrorCode::ProjectNotFound,
            format!("Project \"{}\" not found, please create it first!", id),
            id,
        )
        .with_hint("Run 'polyglot project list' to see available projects");
        err.with_suggestions(suggestions)
    }

    pub fn component_not_found(id: impl Into<String>, suggestions: Vec<String>) -> Self {
        let id = id.into();
        let err = Self::not_found(
            ErrorCode::ComponentNotFound,
            format!("Component \"{}\" not found, please create it first!", id),
            id,
        )
        .with_hint("Run 'polyglot component list <project>' to see available components");
        err.with_suggestions(suggestions)
    }

    fn not_found(code: ErrorCode, message: String, id: String) -> Self {
        Self::new(code, message, to_details(NotFoundDetails { id }))
    }

    fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        if !suggestions.is_empty() {
            self = self.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
        }
        self
    }

    pub fn import_no_matches(details: ImportDetails) -> Self {
        Self::new(
            ErrorCode::ImportNoMatches,
            "Your mask did not match any files!",
            to_details(details),
        )
    }

    pub fn import_no_languages(details: ImportDetails) -> Self {
        Self::new(
            ErrorCode::ImportNoLanguages,
            "None of matched languages exists, maybe you have mixed * and ** in the mask?",
            to_details(details),
        )
    }

    pub fn import_slug_exhausted(name: impl Into<String>, attempts: u32) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::ImportSlugExhausted,
            format!("Failed to find suitable name for {}", name),
            serde_json::json!({ "name": name, "attempts": attempts }),
        )
    }

    pub fn vcs_command_failed(
        vcs: impl Into<String>,
        command: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        let details = VcsCommandFailedDetails {
            vcs: vcs.into(),
            command: command.into(),
            stderr: stderr.into(),
        };
        let message = if details.stderr.is_empty() {
            format!("{} failed", details.command)
        } else {
            format!("{} failed: {}", details.command, details.stderr)
        };
        Self::new(ErrorCode::VcsCommandFailed, message, to_details(details))
    }

    pub fn vcs_locked(path: impl Into<String>) -> Self {
        let path = path.into();
        let mut err = Self::new(
            ErrorCode::VcsLocked,
            format!("Working copy {} is locked by another operation", path),
            serde_json::json!({ "path": path }),
        );
        err.retryable = Some(true);
        err
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
