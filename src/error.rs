use thiserror::Error;

/// Errors surfaced by mailbird.
///
/// Transport failures propagate unchanged into this taxonomy; nothing is
/// retried. Header and content *decoding* problems are deliberately absent
/// from this enum: undecodable bytes degrade to replacement characters
/// inline and are never reported as errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// An operation was issued against a session that is not in a state
    /// that supports it (e.g. `close` after the session was already closed).
    #[error("No active session: {0}")]
    Session(String),

    /// A UID fetch returned no data, typically because the message was
    /// deleted between search and fetch.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A header the caller requires is absent from the message.
    #[error("Missing header: {0}")]
    MissingHeader(String),

    /// The raw message bytes could not be parsed into a message structure.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Bad response: {0}")]
    BadResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<imap::error::Error> for Error {
    fn from(err: imap::error::Error) -> Self {
        use imap::error::Error as ImapError;
        match err {
            ImapError::Io(e) => Error::Connection(e.to_string()),
            ImapError::ConnectionLost => Error::Connection("connection lost".to_string()),
            ImapError::Tls(e) => Error::Tls(e.to_string()),
            ImapError::TlsHandshake(e) => Error::Tls(e.to_string()),
            ImapError::No(msg) => Error::BadResponse(msg),
            ImapError::Bad(msg) => Error::BadResponse(msg),
            ImapError::Parse(e) => Error::Parse(e.to_string()),
            other => Error::Connection(other.to_string()),
        }
    }
}

impl From<native_tls::Error> for Error {
    fn from(err: native_tls::Error) -> Self {
        Error::Tls(err.to_string())
    }
}
