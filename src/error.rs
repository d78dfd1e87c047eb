use std::fmt;
use reqwest::StatusCode;
use thiserror::Error;

/// Backend call that produced a [`NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Register,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => f.write_str("load endpoints"),
            Operation::Register => f.write_str("register endpoint"),
            Operation::Delete => f.write_str("delete endpoint"),
        }
    }
}

/// Form problems caught before anything is sent to the backend.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Please select at least one HTTP method")]
    NoMethodSelected,

    #[error("Invalid token data format.")]
    InvalidTokenData(#[source] serde_json::Error),

    #[error("Please select a JSON file")]
    MissingResponseFile,
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to {operation}: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to delete endpoint: {0:?} cannot be addressed in a URL")]
    UnaddressablePath(String),

    #[error("Failed to {operation} (HTTP {status})")]
    Status {
        operation: Operation,
        status: StatusCode,
    },
}

impl NetworkError {
    pub(crate) fn request(operation: Operation) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| NetworkError::Request { operation, source }
    }
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Deletion was not confirmed")]
    ConfirmationDeclined,
}
