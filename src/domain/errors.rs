use std::fmt;

// Classified failure of a backend call. The message is fit for direct display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unreachable(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ServerError(String),

    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unreachable,
    Unauthenticated,
    Forbidden,
    NotFound,
    Validation,
    ServerError,
    Unknown,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unreachable(_) => ErrorKind::Unreachable,
            ApiError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::ServerError(_) => ErrorKind::ServerError,
            ApiError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unreachable(message)
            | ApiError::Unauthenticated(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Validation(message)
            | ApiError::ServerError(message)
            | ApiError::Unknown(message) => message,
        }
    }

    // Build an error of the given kind, falling back to the kind's stock message.
    pub fn from_kind(kind: ErrorKind, message: Option<String>) -> Self {
        let message = message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_string());

        match kind {
            ErrorKind::Unreachable => ApiError::Unreachable(message),
            ErrorKind::Unauthenticated => ApiError::Unauthenticated(message),
            ErrorKind::Forbidden => ApiError::Forbidden(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::Validation => ApiError::Validation(message),
            ErrorKind::ServerError => ApiError::ServerError(message),
            ErrorKind::Unknown => ApiError::Unknown(message),
        }
    }
}

impl ErrorKind {
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::Unreachable => "The movie service could not be reached.",
            ErrorKind::Unauthenticated => "Your session has expired. Please log in again.",
            ErrorKind::Forbidden => "You are not allowed to do that.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Validation => "The submitted data was rejected.",
            ErrorKind::ServerError => "The movie service failed. Please try again later.",
            ErrorKind::Unknown => "Something bad happened; please try again later.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not found",
            ErrorKind::Validation => "validation",
            ErrorKind::ServerError => "server error",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// Failures of the durable key/value storage behind the session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored state is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
