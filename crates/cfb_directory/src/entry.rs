//! Decoded directory entries
//!

use std::{
    cell::OnceCell,
    cmp::Ordering,
    fmt::{self, Display},
    io::{Read, Seek, Write},
    time::{SystemTime, UNIX_EPOCH},
};

use binrw::{BinRead, BinWrite};
use tracing::instrument;
use widestring::U16String;

use crate::{
    error::{InvalidNameError, Result},
    types::{
        Color, DirectoryEntryRecord, Sid, StgType, Version, ENDOFCHAIN, MAX_NAME_CHARS, NOSTREAM,
    },
};

const FORBIDDEN_CHARACTERS: [char; 4] = ['\\', '/', ':', '!'];

/// Name of the root storage
pub const ROOT_NAME: &str = "Root Entry";

/// Seconds between the FILETIME epoch (1601-01-01) and the unix epoch
const FILETIME_UNIX_OFFSET: u64 = 11_644_473_600;

/// A stream, storage or unused slot of the directory
///
/// Entries are owned by an [`crate::EntryRepository`] which assigns their SID. The sibling links
/// double as the links of the red-black tree of the storage the entry belongs to, the parent link
/// is only kept in memory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    sid: Option<Sid>,
    name: [u8; 64],
    name_length: u16,
    cached_name: OnceCell<String>,
    entry_type: StgType,
    color: Color,
    left_sibling: Option<Sid>,
    right_sibling: Option<Sid>,
    child: Option<Sid>,
    parent: Option<Sid>,

    /// Class identifier of a storage
    pub clsid: [u8; 16],
    /// User defined flags, passed through untouched
    pub state_bits: u32,
    /// Creation time as a raw FILETIME
    pub creation_time: [u8; 8],
    /// Last modification time as a raw FILETIME
    pub modified_time: [u8; 8],
    /// First sector of the data chain
    pub start_sector: u32,
    /// Size of the data in bytes
    pub size: u64,
}

impl DirectoryEntry {
    /// Create an entry that does not belong to any repository yet.
    ///
    /// Detached entries are used as lookup keys and are what the repository stores when it
    /// allocates a slot.
    ///
    /// Streams start at `ENDOFCHAIN`. Invalid and storage entries keep start sector 0, the value
    /// existing writers leave in unused slots.
    pub fn new(name: &str, entry_type: StgType) -> Result<Self> {
        let mut entry = Self::invalid();
        entry.entry_type = entry_type;

        match entry_type {
            StgType::Storage => entry.creation_time = filetime_now(),
            StgType::Invalid => {}
            _ => entry.start_sector = ENDOFCHAIN,
        }

        entry.set_name(name)?;
        Ok(entry)
    }

    /// The root storage, always the first entry of a directory
    pub fn root() -> Self {
        let mut entry = Self::invalid();
        entry.entry_type = StgType::Root;
        entry.start_sector = ENDOFCHAIN;
        entry.store_name(ROOT_NAME, &ROOT_NAME.encode_utf16().collect::<Vec<_>>());
        entry
    }

    /// An unused slot, as found padding directory sectors
    pub fn invalid() -> Self {
        Self::from_record(DirectoryEntryRecord::default())
    }

    /// Decode a single 128 byte entry.
    ///
    /// Invalid entries never link anywhere, whatever their sibling and child fields contain.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, version: Version) -> Result<Self> {
        let record = DirectoryEntryRecord::read_args(reader, (version,))?;
        Ok(Self::from_record(record))
    }

    /// Encode this entry as a 128 byte record.
    #[instrument(skip(self, writer), fields(name = %self.name()), err)]
    pub fn write<W: Write + Seek>(&self, writer: &mut W, version: Version) -> Result<()> {
        self.to_record().write_args(writer, (version,))?;
        Ok(())
    }

    /// Build an entry from its raw record
    pub fn from_record(record: DirectoryEntryRecord) -> Self {
        let link = |sid: Sid| {
            if record.entry_type == StgType::Invalid || sid == NOSTREAM {
                None
            } else {
                Some(sid)
            }
        };

        Self {
            sid: None,
            name: record.name,
            name_length: record.name_length,
            cached_name: OnceCell::new(),
            entry_type: record.entry_type,
            color: record.color,
            left_sibling: link(record.left_sibling),
            right_sibling: link(record.right_sibling),
            child: link(record.child),
            parent: None,
            clsid: record.clsid,
            state_bits: record.state_bits,
            creation_time: record.creation_time,
            modified_time: record.modified_time,
            start_sector: record.start_sector,
            size: record.size,
        }
    }

    /// The raw record for this entry
    pub fn to_record(&self) -> DirectoryEntryRecord {
        DirectoryEntryRecord {
            name: self.name,
            name_length: self.name_length,
            entry_type: self.entry_type,
            color: self.color,
            left_sibling: self.left_sibling.unwrap_or(NOSTREAM),
            right_sibling: self.right_sibling.unwrap_or(NOSTREAM),
            child: self.child.unwrap_or(NOSTREAM),
            clsid: self.clsid,
            state_bits: self.state_bits,
            creation_time: self.creation_time,
            modified_time: self.modified_time,
            start_sector: self.start_sector,
            size: self.size,
        }
    }

    /// The SID assigned by the owning repository, `None` for detached entries
    pub fn sid(&self) -> Option<Sid> {
        self.sid
    }

    pub(crate) fn set_sid(&mut self, sid: Sid) {
        self.sid = Some(sid);
    }

    /// Get the name of the entry
    pub fn name(&self) -> &str {
        self.cached_name.get_or_init(|| {
            if self.name_length == 0 {
                return String::new();
            }

            let byte_len = (self.name_length as usize)
                .saturating_sub(2)
                .min(self.name.len() - 2);
            let units = self.name[..byte_len]
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect::<Vec<_>>();
            U16String::from_vec(units).to_string_lossy()
        })
    }

    /// Get the 64 byte name buffer as it is stored
    pub fn name_raw(&self) -> &[u8; 64] {
        &self.name
    }

    /// Length of the stored name in bytes, terminator included
    pub fn name_length(&self) -> u16 {
        self.name_length
    }

    /// Rename the entry.
    ///
    /// The name is checked before anything changes, a rejected name leaves the entry as it was.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let units = validate_name(name)?;
        self.store_name(name, &units);
        Ok(())
    }

    fn store_name(&mut self, name: &str, units: &[u16]) {
        let mut buffer = [0u8; 64];
        for (i, unit) in units.iter().enumerate() {
            buffer[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }

        self.name = buffer;
        self.name_length = if units.is_empty() {
            0
        } else {
            (units.len() * 2 + 2) as u16
        };
        self.cached_name = OnceCell::from(name.to_owned());
    }

    /// The object type of this entry
    pub fn entry_type(&self) -> StgType {
        self.entry_type
    }

    pub fn set_entry_type(&mut self, entry_type: StgType) {
        self.entry_type = entry_type;
    }

    /// Whether this entry owns a child tree
    pub fn is_storage(&self) -> bool {
        self.entry_type.is_storage()
    }

    /// Color of the entry inside its sibling tree
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn left_sibling(&self) -> Option<Sid> {
        self.left_sibling
    }

    pub fn set_left_sibling(&mut self, sid: Option<Sid>) {
        self.left_sibling = sid;
    }

    pub fn right_sibling(&self) -> Option<Sid> {
        self.right_sibling
    }

    pub fn set_right_sibling(&mut self, sid: Option<Sid>) {
        self.right_sibling = sid;
    }

    /// Root of the child tree of a storage
    pub fn child(&self) -> Option<Sid> {
        self.child
    }

    pub fn set_child(&mut self, sid: Option<Sid>) {
        self.child = sid;
    }

    /// Parent of this entry in its sibling tree. Never persisted.
    pub fn parent(&self) -> Option<Sid> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, sid: Option<Sid>) {
        self.parent = sid;
    }

    /// Copy everything that identifies this entry's content into `other`.
    ///
    /// SID, color and the sibling links of `other` stay untouched so that it keeps its position
    /// in the tree.
    pub fn assign_value_to(&self, other: &mut DirectoryEntry) {
        other.name = self.name;
        other.name_length = self.name_length;
        other.cached_name = self.cached_name.clone();
        other.entry_type = self.entry_type;
        other.child = self.child;
        other.clsid = self.clsid;
        other.state_bits = self.state_bits;
        other.creation_time = self.creation_time;
        other.modified_time = self.modified_time;
        other.start_sector = self.start_sector;
        other.size = self.size;
    }

    pub(crate) fn clear_links(&mut self) {
        self.left_sibling = None;
        self.right_sibling = None;
        self.parent = None;
    }
}

impl Default for DirectoryEntry {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Entries are ordered by stored name length first, then by a case-insensitive comparison of
/// their names.
impl Ord for DirectoryEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name_length
            .cmp(&other.name_length)
            .then_with(|| compare_ignore_case(self.name(), other.name()))
    }
}

impl PartialOrd for DirectoryEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DirectoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DirectoryEntry {}

impl Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sid {
            Some(sid) => write!(f, "{} [{}] {:?}", self.name(), sid, self.entry_type),
            None => write!(f, "{} {:?}", self.name(), self.entry_type),
        }
    }
}

/// Check a name against the directory naming rules and return its UTF-16 code units.
pub fn validate_name(name: &str) -> std::result::Result<Vec<u16>, InvalidNameError> {
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARACTERS.contains(c)) {
        return Err(InvalidNameError::ForbiddenCharacter(c));
    }

    let units = name.encode_utf16().collect::<Vec<_>>();
    if units.len() > MAX_NAME_CHARS {
        return Err(InvalidNameError::TooLong(units.len()));
    }

    Ok(units)
}

/// Compares UTF-16 code units, upper casing each unit that is not part of a surrogate pair
fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.encode_utf16()
        .map(fold_case)
        .cmp(b.encode_utf16().map(fold_case))
}

fn fold_case(unit: u16) -> u16 {
    let Some(c) = char::from_u32(unit as u32) else {
        return unit;
    };

    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u16::try_from(u as u32).unwrap_or(unit),
        _ => unit,
    }
}

fn filetime_now() -> [u8; 8] {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let ticks = (since_epoch.as_secs() + FILETIME_UNIX_OFFSET) * 10_000_000
        + since_epoch.subsec_nanos() as u64 / 100;
    ticks.to_le_bytes()
}
