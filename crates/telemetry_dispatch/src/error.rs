//! Error and rejection types for the dispatch pipeline.

use telemetry_types::ContentType;
use thiserror::Error;

/// A request turned away before any handler ran.
///
/// Every variant maps to a fixed status code, and its `Display` text is the
/// exact body sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The auth validator refused the transaction
    #[error("Unauthorized")]
    Unauthorized,
    /// The body bytes are not JSON
    #[error("Malformed body")]
    MalformedBody,
    /// No body, or an empty one
    #[error("Missing body")]
    MissingBody,
    /// `id` is absent
    #[error("Missing Identifier")]
    MissingIdentifier,
    /// `content_type` or `args` is absent
    #[error("Missing content")]
    MissingContent,
    /// `content_type` is not a declared content type
    #[error("Invalid content type")]
    InvalidContentType,
    /// `args` does not have the shape its content type requires
    #[error("Malformed arguments")]
    MalformedArgs,
}

impl Rejection {
    /// HTTP status sent with this rejection.
    pub fn status(&self) -> u16 {
        match self {
            Rejection::Unauthorized => 401,
            Rejection::MalformedBody
            | Rejection::MissingBody
            | Rejection::MissingIdentifier
            | Rejection::MissingContent
            | Rejection::InvalidContentType
            | Rejection::MalformedArgs => 400,
        }
    }
}

/// Failure reported by a handler that could not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A handler broke its contract of always resolving to a response.
///
/// These are never turned into a partial reply: the dispatcher surfaces them
/// to its caller, which decides how loudly to fail.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Handler {handler} for {content_type} did not return a response")]
    MissingResponse {
        content_type: ContentType,
        handler: String,
    },
    #[error("Handler {handler} for {content_type} failed: {source}")]
    Handler {
        content_type: ContentType,
        handler: String,
        #[source]
        source: HandlerError,
    },
}

/// Errors from strict handler registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("A handler for {0} is already registered")]
    DuplicateHandler(ContentType),
}
