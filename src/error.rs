/*!
error module defines the error types used in bgpstream-stats.
*/
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    /// A filter name or value that the stream surface does not understand.
    ///
    /// ## Occurs during:
    ///  - `BgpStream::add_filter`
    ///  - parsing of a filter expression string
    #[error("invalid filter: {0}")]
    FilterError(String),
    /// Invalid stream configuration, fatal to the unit of work.
    ///
    /// ## Occurs during:
    ///  - `BgpStream::start` (interval sanity, double start)
    ///  - pulling records from a stream that was never started
    #[error("invalid stream configuration: {0}")]
    ConfigError(String),
    /// A record line that could not be decoded.
    #[error("malformed record: {0}")]
    RecordError(#[from] serde_json::Error),
    /// A general IO error triggered by the underlying reader.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Failure opening a local or remote input.
    #[error(transparent)]
    RemoteIoError(#[from] oneio::OneIoError),
    #[cfg(feature = "db")]
    #[error(transparent)]
    DbError(#[from] rusqlite::Error),
}
