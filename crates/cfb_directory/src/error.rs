//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Sid;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// a directory record could not be decoded
    #[error("malformed directory record")]
    MalformedRecord(#[from] binrw::Error),

    /// the name can not be used for a directory entry
    #[error("invalid entry name")]
    InvalidName(#[from] InvalidNameError),

    /// unable to find the requested entry
    #[error("unable to find entry {0}")]
    EntryNotFound(String),

    /// the storage already holds an entry comparing equal to {0}
    #[error("the storage already holds an entry named {0}")]
    DuplicateEntry(String),

    /// the first directory entry is not the root storage
    #[error("the directory does not start with a root storage")]
    MissingRoot,

    /// entry {0} is not a storage
    #[error("entry {0} is not a storage")]
    NotAStorage(Sid),
}

/// Error type to provide further information when a name has been rejected
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("invalid entry name")]
pub enum InvalidNameError {
    /// the character {0:?} can not be used in an entry name
    #[error("the character {0:?} can not be used in an entry name")]
    ForbiddenCharacter(char),

    /// the name is {0} characters long, the limit is 31
    #[error("the name is {0} characters long, the limit is 31")]
    TooLong(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
