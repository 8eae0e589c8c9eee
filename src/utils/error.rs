use actix_web::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    MissingField,
    DuplicateUser,
    NoSuchUser,
    BadPassword,
    AuthenticatorError(String),
    StorageError(String),
    SessionExpired,
    Unauthenticated,
}

impl AppError {
    /// Text flashed to the visitor, if any. Never tells which credential
    /// was wrong; a plain missing login gets no message.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AppError::MissingField => Some("Please provide name, email, and password"),
            AppError::DuplicateUser => Some("Name or email already registered"),
            AppError::NoSuchUser | AppError::BadPassword => Some("Invalid email or password"),
            AppError::AuthenticatorError(_) | AppError::StorageError(_) => Some("Failed to register user"),
            AppError::SessionExpired => Some("Session expired. Please login again."),
            AppError::Unauthenticated => None,
        }
    }

    /// Status of the response carrying the redirect. Login and session
    /// failures use a plain redirect; registration failures keep an error status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField | AppError::DuplicateUser => StatusCode::BAD_REQUEST,
            AppError::NoSuchUser
            | AppError::BadPassword
            | AppError::SessionExpired
            | AppError::Unauthenticated => StatusCode::FOUND,
            AppError::AuthenticatorError(_) | AppError::StorageError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingField => write!(f, "Missing field: name, email and password are required"),
            AppError::DuplicateUser => write!(f, "Duplicate user: name or email already taken"),
            AppError::NoSuchUser => write!(f, "No user with that email"),
            AppError::BadPassword => write!(f, "Password incorrect"),
            AppError::AuthenticatorError(msg) => write!(f, "Authenticator error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::SessionExpired => write!(f, "Session expired"),
            AppError::Unauthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl std::error::Error for AppError {}
