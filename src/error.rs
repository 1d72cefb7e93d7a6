use thiserror::Error;

/// Uniform error type for the whole client. Every failure path — transport,
/// server rejection, decoding, local usage mistakes — ends up here and is
/// rendered as a single printed message at the command boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// The server returned an error status with a structured JSON body.
    /// The message is the server's `error` field, with the `hint` field
    /// appended when present.
    #[error("{0}")]
    Api(String),

    /// The server returned an error status with a body that is not JSON.
    /// Only the status code is surfaced, never the raw body.
    #[error("request failed with status {0}")]
    Status(u16),

    /// A 2xx response body did not conform to the expected model.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request never reached the server.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local usage mistake, raised before any network call.
    #[error("{0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
