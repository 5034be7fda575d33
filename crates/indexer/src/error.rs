/// Everything that can go wrong while obtaining tracker metadata.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The source's rate budget has no token left.
    #[error("rate limit exceeded for {indexer}")]
    RateLimited { indexer: &'static str },

    /// The outbound call did not finish within the fetch timeout.
    #[error("request to {indexer} timed out")]
    Timeout { indexer: &'static str },

    /// Connection, DNS, TLS or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The tracker answered with a non-2xx status.
    #[error("HTTP error {status} from {indexer}")]
    Http { indexer: &'static str, status: u16 },

    /// The body was not the expected JSON shape.
    #[error("invalid JSON response: {0}")]
    InvalidResponse(String),

    /// The tracker reported a non-"success" status.
    #[error("API error from {indexer}: {message}")]
    Api {
        indexer: &'static str,
        message: String,
    },

    /// No API key is configured or supplied for the source.
    #[error("no API key available for {indexer}")]
    MissingCredential { indexer: &'static str },
}

impl FetchError {
    /// Only budget exhaustion is worth retrying as-is.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
