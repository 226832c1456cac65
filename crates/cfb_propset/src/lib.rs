//! This library reads and writes the string carrying parts of **OLE property set** streams, such
//! as `\u{5}SummaryInformation` and `\u{5}DocumentSummaryInformation`.
//!
//! # Property Set String Format Documentation
//!
//! A property set declares a code page (property 1). Every string of the set, except those
//! explicitly typed as UTF-16, is stored in that code page. The code page `0x04B0`
//! (`CP_WINUNICODE`) means UTF-16LE with two bytes per character; any other code page is an 8-bit
//! or multi-byte encoding with one byte per character unit.
//!
//! ## String Field
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Length                 | 4 bytes: Characters including the null terminator          |
//! | 0x0004         | Characters             | (Length * width) bytes: the string and its terminator      |
//! |                | Padding                | 0-3 bytes: zeros up to the next multiple of four           |
//!
//! - **Length**: A signed integer, negative values are malformed. Zero stores no characters.
//! - **Padding**: Computed from the size of the character data as `(4 - size % 4) % 4`.
//!
//! ## Dictionary
//!
//! The dictionary (property 0) names the other properties of a set.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Entry Count            | 4 bytes: Number of entries                                 |
//! | 0x0004         | Entries                | Entry Count times a dictionary entry                       |
//!
//! Each entry is a property identifier (4 bytes) followed by a string field holding the name. Names
//! are only padded when the code page is `CP_WINUNICODE`; 8-bit names are packed and the
//! dictionary is padded to a multiple of four bytes as a whole.
//!
//! ## Typed Property Value
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Type                   | 2 bytes: `VT_LPSTR` (0x001E) or `VT_LPWSTR` (0x001F)       |
//! | 0x0002         | Padding                | 2 bytes: zero                                              |
//! | 0x0004         | Value                  | A string field                                             |
//!
//! `VT_LPSTR` values use the code page of the set, `VT_LPWSTR` values are always UTF-16LE.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod codepage;
pub mod dictionary;
pub mod error;
pub mod property;
#[cfg(feature = "serde")]
mod serde;
pub mod string;

pub use codepage::{CodePage, CP_US_ASCII, CP_UTF8, CP_WINDOWS_1252, CP_WINUNICODE};
pub use dictionary::{Dictionary, DictionaryEntry};
pub use property::{PropertyString, TypedPropertyValue, VT_LPSTR, VT_LPWSTR};
pub use string::{Alignment, CharWidth};
