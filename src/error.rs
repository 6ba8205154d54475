/// Boxed error type returned by the consumer-implemented traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid configuration. Fatal at startup or first use.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered an operation with a non-success status.
    #[error("{operation} failed: {detail}")]
    Provider {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("session store error: {0}")]
    Store(#[source] BoxError),
    #[error("authentication backend error: {0}")]
    Backend(#[source] BoxError),
    /// The callback `state` does not match the one stored at login.
    /// Indicates CSRF or session confusion, never an ordinary failure.
    #[error("authorization response state does not match the login state for this session")]
    StateMismatch,
    /// A defensive logout left the session still bound to a principal.
    #[error("session termination did not take effect")]
    Termination,
}
