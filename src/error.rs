// Error handling module
// Defines the client error taxonomy and the shared status normalization

use thiserror::Error;

/// Fixed message for requests that never received a response
pub const NETWORK_MESSAGE: &str = "Server is not responding. Check your connection.";

/// Fixed message for a 401 at login time
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login or password";

/// Fixed message for a 401 on an authenticated resource call
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Fixed message for a 500 from the auth service
pub const AUTH_SERVER_MESSAGE: &str = "Server error. Please try again later.";

pub const CATEGORY_NOT_FOUND_MESSAGE: &str = "Category not found";
pub const EXPENSE_NOT_FOUND_MESSAGE: &str = "Expense not found";

/// Errors surfaced by the access objects
///
/// Every variant carries the human-readable message shown to the user,
/// so `to_string()` is always displayable as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Client-correctable input problem, message from the server
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// 401 while logging in
    #[error("{0}")]
    InvalidCredentials(String),

    /// 401 on an existing session
    #[error("{0}")]
    SessionExpired(String),

    /// 5xx or an unrecognized status
    #[error("{0}")]
    Server(String),

    /// No response was received (connection failure, timeout)
    #[error("{0}")]
    Network(String),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

/// Discriminant of `ApiError`, used by status policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidCredentials,
    SessionExpired,
    Server,
    Network,
    Unknown,
}

impl ApiError {
    /// Build an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => ApiError::Validation(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::InvalidCredentials => ApiError::InvalidCredentials(message),
            ErrorKind::SessionExpired => ApiError::SessionExpired(message),
            ErrorKind::Server => ApiError::Server(message),
            ErrorKind::Network => ApiError::Network(message),
            ErrorKind::Unknown => ApiError::Unknown(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            ApiError::SessionExpired(_) => ErrorKind::SessionExpired,
            ApiError::Server(_) => ErrorKind::Server,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::InvalidCredentials(m)
            | ApiError::SessionExpired(m)
            | ApiError::Server(m)
            | ApiError::Network(m)
            | ApiError::Unknown(m) => m,
        }
    }
}

/// Raw outcome of a failed HTTP call, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The server answered with a non-success status
    Status {
        status: u16,
        /// `message` field of the JSON error body, if any
        message: Option<String>,
    },

    /// The request was sent but no response arrived
    NoResponse(String),

    /// The request could not be built or the response could not be decoded
    Local(String),
}

/// One status-code rule of a `StatusPolicy`
#[derive(Debug, Clone, Copy)]
pub struct StatusRule {
    pub status: u16,
    pub kind: ErrorKind,
    /// Fixed message. When `None` the rule only applies if the server
    /// supplied a message, which is then used verbatim.
    pub message: Option<&'static str>,
}

impl StatusRule {
    pub const fn fixed(status: u16, kind: ErrorKind, message: &'static str) -> Self {
        Self {
            status,
            kind,
            message: Some(message),
        }
    }

    pub const fn server_message(status: u16, kind: ErrorKind) -> Self {
        Self {
            status,
            kind,
            message: None,
        }
    }
}

/// Maps HTTP statuses to error kinds for one family of endpoints
#[derive(Debug, Clone, Copy)]
pub struct StatusPolicy {
    pub rules: &'static [StatusRule],
}

/// Auth service: 401 means the credentials were wrong
pub const AUTH_POLICY: StatusPolicy = StatusPolicy {
    rules: &[
        StatusRule::server_message(400, ErrorKind::Validation),
        StatusRule::fixed(401, ErrorKind::InvalidCredentials, INVALID_CREDENTIALS_MESSAGE),
        StatusRule::fixed(500, ErrorKind::Server, AUTH_SERVER_MESSAGE),
    ],
};

/// Category endpoints: 401 means the session died mid-use
pub const CATEGORY_POLICY: StatusPolicy = StatusPolicy {
    rules: &[
        StatusRule::server_message(400, ErrorKind::Validation),
        StatusRule::fixed(404, ErrorKind::NotFound, CATEGORY_NOT_FOUND_MESSAGE),
        StatusRule::fixed(401, ErrorKind::SessionExpired, SESSION_EXPIRED_MESSAGE),
    ],
};

pub const EXPENSE_POLICY: StatusPolicy = StatusPolicy {
    rules: &[
        StatusRule::server_message(400, ErrorKind::Validation),
        StatusRule::fixed(404, ErrorKind::NotFound, EXPENSE_NOT_FOUND_MESSAGE),
        StatusRule::fixed(401, ErrorKind::SessionExpired, SESSION_EXPIRED_MESSAGE),
    ],
};

/// Convert a raw request failure into an `ApiError`
///
/// Statuses without a matching rule become `Server` errors carrying the
/// server message, or `default_message` when the body had none.
pub fn normalize(failure: RequestFailure, policy: &StatusPolicy, default_message: &str) -> ApiError {
    match failure {
        RequestFailure::Status { status, message } => {
            let rule = policy.rules.iter().find(|rule| {
                rule.status == status && (rule.message.is_some() || message.is_some())
            });

            match rule {
                Some(StatusRule {
                    kind,
                    message: Some(fixed),
                    ..
                }) => ApiError::new(*kind, *fixed),
                Some(StatusRule { kind, .. }) => {
                    ApiError::new(*kind, message.unwrap_or_else(|| default_message.to_string()))
                }
                None => ApiError::Server(message.unwrap_or_else(|| default_message.to_string())),
            }
        }
        RequestFailure::NoResponse(detail) => {
            tracing::debug!(detail = %detail, "No response received");
            ApiError::Network(NETWORK_MESSAGE.to_string())
        }
        RequestFailure::Local(detail) if detail.is_empty() => {
            ApiError::Unknown(default_message.to_string())
        }
        RequestFailure::Local(detail) => ApiError::Unknown(detail),
    }
}

/// Result type alias for access object operations
pub type Result<T> = std::result::Result<T, ApiError>;
