//! Base types for the structure of the directory stream.

use binrw::{BinRead, BinResult, BinWrite};
use std::io::Seek;

/// Stream identifier, the position of an entry in the directory stream
pub type Sid = u32;

/// Marks the absence of a sibling or child link
pub const NOSTREAM: Sid = 0xFFFF_FFFF;

/// Marks the end of a sector chain, used as the starting sector of empty streams
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;

/// Size in bytes of one encoded directory entry
pub const DIRECTORY_ENTRY_SIZE: usize = 128;

/// Maximum number of UTF-16 code units in an entry name, terminator excluded
pub const MAX_NAME_CHARS: usize = 31;

/// Major version of the compound file
///
/// The version decides the sector size and how many bytes of the stream size field are defined.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[brw(repr = u16)]
pub enum Version {
    /// 512 byte sectors, 32 bit stream sizes
    #[default]
    V3 = 3,

    /// 4096 byte sectors, 64 bit stream sizes
    V4 = 4,
}

impl Version {
    /// Size in bytes of a sector
    pub const fn sector_size(self) -> usize {
        match self {
            Version::V3 => 512,
            Version::V4 => 4096,
        }
    }

    /// Number of directory entries stored in one directory sector
    pub const fn entries_per_sector(self) -> usize {
        self.sector_size() / DIRECTORY_ENTRY_SIZE
    }
}

/// Object type of a directory entry
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[brw(repr = u8)]
pub enum StgType {
    /// Unused slot
    #[default]
    Invalid = 0,

    /// A directory like entry owning a tree of children
    Storage = 1,

    /// A leaf entry holding data
    Stream = 2,

    /// Legacy `ILockBytes` entry
    LockBytes = 3,

    /// Legacy `IPropertyStorage` entry
    Property = 4,

    /// The root storage of the file
    Root = 5,
}

impl StgType {
    /// Whether entries of this type own a child tree
    pub const fn is_storage(self) -> bool {
        matches!(self, StgType::Storage | StgType::Root)
    }
}

/// Node color of an entry inside its sibling tree
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[brw(repr = u8)]
pub enum Color {
    #[default]
    Red = 0,
    Black = 1,
}

/// Raw directory entry as laid out in the directory stream
///
/// Links are kept as raw SIDs here, see [`crate::entry::DirectoryEntry`] for the decoded form.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little, import(version: Version))]
pub struct DirectoryEntryRecord {
    /// UTF-16LE name, null terminated and zero filled
    pub name: [u8; 64],

    /// Length of the name in bytes including the terminator, or 0 for no name
    pub name_length: u16,

    /// The object type of this entry
    pub entry_type: StgType,

    /// Color of this entry in the sibling tree
    pub color: Color,

    /// SID of the left sibling
    pub left_sibling: Sid,

    /// SID of the right sibling
    pub right_sibling: Sid,

    /// SID of the root of the child tree
    pub child: Sid,

    /// Class identifier of a storage
    pub clsid: [u8; 16],

    /// User defined flags
    pub state_bits: u32,

    /// Creation time as a FILETIME
    pub creation_time: [u8; 8],

    /// Last modification time as a FILETIME
    pub modified_time: [u8; 8],

    /// First sector of the data of a stream
    pub start_sector: u32,

    /// Size of the data of a stream in bytes
    #[br(parse_with = read_stream_size, args(version))]
    #[bw(write_with = write_stream_size, args(version))]
    pub size: u64,
}

impl Default for DirectoryEntryRecord {
    fn default() -> Self {
        Self {
            name: [0; 64],
            name_length: 0,
            entry_type: StgType::Invalid,
            color: Color::Red,
            left_sibling: NOSTREAM,
            right_sibling: NOSTREAM,
            child: NOSTREAM,
            clsid: [0; 16],
            state_bits: 0,
            creation_time: [0; 8],
            modified_time: [0; 8],
            start_sector: 0,
            size: 0,
        }
    }
}

#[binrw::parser(reader, endian)]
fn read_stream_size(version: Version) -> BinResult<u64> {
    match version {
        Version::V3 => {
            let size = u32::read_options(reader, endian, ())?;
            // the high dword is undefined in version 3 files
            let _ = u32::read_options(reader, endian, ())?;
            Ok(size as u64)
        }
        Version::V4 => u64::read_options(reader, endian, ()),
    }
}

#[binrw::writer(writer, endian)]
fn write_stream_size(size: &u64, version: Version) -> BinResult<()> {
    match version {
        Version::V3 => {
            let low = u32::try_from(*size).map_err(|_| binrw::Error::AssertFail {
                pos: writer.stream_position().unwrap_or_default(),
                message: format!("stream size {size} does not fit a version 3 directory entry"),
            })?;
            low.write_options(writer, endian, ())?;
            0u32.write_options(writer, endian, ())
        }
        Version::V4 => size.write_options(writer, endian, ()),
    }
}
