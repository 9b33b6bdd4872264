use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    // Configuration errors
    #[error("Failed to load settings file '{path}': {source}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // Storage errors
    #[error("Failed to read '{key}' from storage: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{key}' to storage: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored value under '{key}' is not valid: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // Data-entry errors
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} '{id}' already exists")]
    Conflict { entity: String, id: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    // Authorization errors
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("No user is logged in")]
    NotAuthenticated,

    // Roster editing errors
    #[error("Roster editor is {state}, cannot {action}")]
    InvalidState { state: String, action: String },

    #[error("Saved {saved} of {attempted} changed records; failed: {failed:?}")]
    SaveIncomplete {
        saved: usize,
        attempted: usize,
        failed: Vec<String>,
    },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RosterError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        RosterError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        RosterError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &str, id: &str) -> Self {
        RosterError::Conflict {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<std::io::Error> for RosterError {
    fn from(err: std::io::Error) -> Self {
        RosterError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
