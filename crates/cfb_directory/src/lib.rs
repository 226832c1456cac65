//! This library handles the directory layer of **Compound File Binary** (CFB, also known as OLE2 or
//! "structured storage") containers.
//!
//! # CFB Directory Format Documentation
//!
//! A compound file is a small file system packed into a single file. Every stream and storage it
//! contains is described by a fixed size record in the *directory stream*. Records are addressed by
//! their position in that stream, the **SID** (stream identifier), and reference each other by SID
//! instead of by offset.
//!
//! ## Directory Entry
//!
//! Each directory entry is exactly 128 bytes:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Name                   | 64 bytes: UTF-16LE name, null terminated, zero filled      |
//! | 0x0040         | Name Length            | 2 bytes: Length of the name in bytes, terminator included  |
//! | 0x0042         | Object Type            | 1 byte: Invalid, Storage, Stream, LockBytes, Property, Root|
//! | 0x0043         | Color                  | 1 byte: Red (0) or Black (1)                               |
//! | 0x0044         | Left Sibling           | 4 bytes: SID of the left sibling or `NOSTREAM`             |
//! | 0x0048         | Right Sibling          | 4 bytes: SID of the right sibling or `NOSTREAM`            |
//! | 0x004C         | Child                  | 4 bytes: SID of the root of the child tree or `NOSTREAM`   |
//! | 0x0050         | CLSID                  | 16 bytes: Class identifier of a storage                    |
//! | 0x0060         | State Bits             | 4 bytes: User defined flags                                |
//! | 0x0064         | Creation Time          | 8 bytes: FILETIME                                          |
//! | 0x006C         | Modified Time          | 8 bytes: FILETIME                                          |
//! | 0x0074         | Starting Sector        | 4 bytes: First sector of the stream data                   |
//! | 0x0078         | Stream Size            | 8 bytes: Size of the stream data in bytes                  |
//!
//! - **Name**: At most 31 UTF-16 code units. The characters `\`, `/`, `:` and `!` are forbidden.
//! - **Object Type**: An unused slot is `Invalid` (0). Exactly one entry, the first, is `Root` (5).
//! - **Siblings**: All entries of one storage form a red-black tree. The left and right sibling
//!   fields are the links of that tree and the color byte is its node color.
//! - **Stream Size**: Version 3 files only define the low 4 bytes. The high 4 bytes may contain
//!   garbage and are discarded when reading.
//!
//! ## Sibling Trees
//!
//! Siblings are ordered by the stored name length first and by a case-insensitive comparison of
//! the names second. The trees are kept balanced with a red-black tree working on SIDs; see
//! [`rbtree`] for the engine and [`Directory`] for the per-storage operations built on it.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Sector Size**: 512 bytes for version 3, 4096 bytes for version 4
//!

pub mod directory;
pub mod entry;
pub mod error;
pub mod rbtree;
pub mod read;
pub mod repository;
pub mod types;
pub mod write;

pub use directory::{Directory, ROOT_SID};
pub use entry::DirectoryEntry;
pub use rbtree::{RbNodes, RbTree, Traversal};
pub use read::DirectoryReader;
pub use repository::EntryRepository;
pub use types::{Color, Sid, StgType, Version};
pub use write::DirectoryWriter;
