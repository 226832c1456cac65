//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// a record of the property set could not be decoded
    #[error("malformed property set record")]
    MalformedRecord(#[from] binrw::Error),

    /// no text encoding is known for code page {0}
    #[error("no text encoding is known for code page {0}")]
    #[diagnostic(help("strings of this property set can still be accessed as raw bytes"))]
    UnknownCodePage(u16),

    /// the property type {0:#06x} is not supported
    #[error("the property type {0:#06x} is not supported")]
    UnsupportedPropertyType(u16),

    /// the bytes of a string are not valid in code page {0}
    #[error("the bytes of a string are not valid in code page {0}")]
    StringDecode(u16),

    /// {text:?} can not be represented in code page {code_page}
    #[error("{text:?} can not be represented in code page {code_page}")]
    StringEncode { text: String, code_page: u16 },

    /// a name encoded for code page {found} was written to a property set using {expected}
    #[error("a name encoded for code page {found} was written to a property set using {expected}")]
    CodePageMismatch { expected: u16, found: u16 },

    /// a string of {0} characters does not fit a length prefix
    #[error("a string of {0} characters does not fit a length prefix")]
    StringTooLong(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
