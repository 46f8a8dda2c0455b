//! Unified error type.
//!
//! Every fallible path in the crate ends in [`Error`]. Handlers return it with
//! `?`; the router hands it to the error responder, which is the only place
//! that decides the status code and the message a visitor sees.

use http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Message shown for failures that carry nothing a visitor should read.
pub const DEFAULT_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum Error {
    /// Binding the listener or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// One or more fields of a submitted form failed the schema.
    #[error("{0}")]
    Validation(String),

    /// No route matches the request method and path.
    #[error("Page Not found")]
    RouteNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request body could not be read or decoded.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// The request body exceeded the router's body limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template registration failed: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("render failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text rendered on the error page.
    ///
    /// Infrastructure failures collapse to [`DEFAULT_MESSAGE`]; their detail
    /// only goes to the log.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::RouteNotFound | Self::NotFound(_) | Self::PayloadTooLarge(_) => self.to_string(),
            Self::BadRequest(_) => "Invalid request body".to_owned(),
            Self::Store(err @ (StoreError::MalformedId(_) | StoreError::NotFound(_))) => {
                err.to_string()
            }
            _ => DEFAULT_MESSAGE.to_owned(),
        }
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(e))
    }
}
