use thiserror::Error;

use crate::validation::FieldError;

/// Errors raised while encoding, staging, or dispatching network packets.
///
/// None of these are fatal to the process; callers receive them as
/// operation results.
#[derive(Debug, Error)]
pub enum NetError {
    /// Open, write, rename, link, or delete failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The declared payload length disagrees with the bytes actually written.
    #[error("encoding inconsistency: declared {declared} bytes, wrote {actual}")]
    EncodingInconsistency { declared: u64, actual: u64 },

    /// A generated pending name was already taken. Retried internally and
    /// only escalated (as `Io`) once the name space is exhausted.
    #[error("pending name already exists: {name}")]
    NameCollision { name: String },

    /// No addressee: broadcast destination with an empty recipient list.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// A node id outside `1..=max` for the network.
    #[error("node {node} outside valid range 1..={max}")]
    InvalidNode { node: u16, max: u16 },

    /// Sender or title cannot be framed into the message text.
    #[error("invalid message field: {0}")]
    InvalidField(#[from] FieldError),

    /// The message carries an addressee name but the type is not
    /// name-addressed email, or the other way round.
    #[error("addressee mismatch: {0}")]
    AddresseeMismatch(String),

    /// A packet file could not be decoded.
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// Some destinations of a fan-out were staged, others failed.
    #[error("partial dispatch failure: staged {succeeded:?}, failed {failed:?}")]
    PartialDispatchFailure {
        succeeded: Vec<u16>,
        failed: Vec<(u16, String)>,
    },
}

pub type Result<T> = std::result::Result<T, NetError>;
