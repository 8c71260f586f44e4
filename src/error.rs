use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the client itself.
///
/// HTTP failures reported by the API (4xx, 5xx, a failed report download)
/// are not errors: they come back as an [`ApiResponse`](crate::ApiResponse)
/// with `success == false`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication error: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
        body: String,
    },

    #[error("unsupported HTTP method {0}")]
    UnsupportedMethod(String),

    #[error("unknown operation {0}")]
    UnknownOperation(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid header {0}")]
    InvalidHeader(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gzip decode failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for failures caused by bad input at construction time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
