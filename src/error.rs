use thiserror::Error;

/// Errors that can occur while turning a JSON schema into a `FormSpec`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Failed to parse form schema JSON: {0}")]
    Json(String),

    #[error("Field '{field_id}' of kind '{kind}' cannot have child fields")]
    ChildrenOnLeaf { field_id: String, kind: String },

    #[error("Field '{field_id}' of kind '{kind}' cannot load dynamic options; only selects can")]
    DynamicOptionsOnNonSelect { field_id: String, kind: String },

    #[error("Field id '{field_id}' appears more than once in form '{form_id}'")]
    DuplicateFieldId { form_id: String, field_id: String },

    #[error("Field '{field_id}' depends on '{depends_on}', which is not part of the form")]
    UnknownDependency {
        field_id: String,
        depends_on: String,
    },

    #[error("Field '{field_id}' has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        field_id: String,
        pattern: String,
        reason: String,
    },
}

/// Failures reported by an external collaborator (fetch, submit, mutate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Server responded with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Submission was not accepted: {0}")]
    Rejected(String),

    #[error("No handler for option endpoint '{0}'")]
    UnsupportedEndpoint(String),
}

/// Errors around locally persisted drafts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("Draft '{key}' could not be read: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Draft storage failed for '{key}': {reason}")]
    Storage { key: String, reason: String },
}

/// Misuse of a form session. Validation failures are never reported this way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Field '{0}' does not exist in this form")]
    UnknownField(String),

    #[error("Field '{0}' is a group and holds no value")]
    GroupField(String),

    #[error("The session is {0} and no longer accepts edits")]
    NotEditing(String),

    #[error("Options for '{0}' are still loading")]
    OptionsLoading(String),

    #[error("'{option}' is not an option of checkbox field '{field_id}'")]
    NotAnOption { field_id: String, option: String },

    #[error("No submission is in flight")]
    NotSubmitting,

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Errors that can occur while loading a `PortalConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
