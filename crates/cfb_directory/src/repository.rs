//! Arena owning every directory entry
//!

use std::ops::{Index, IndexMut};

use tracing::trace;

use crate::{
    entry::DirectoryEntry,
    error::Result,
    rbtree::RbNodes,
    types::{Color, Sid, StgType},
};

/// Index stable collection of directory entries
///
/// The position of an entry is its SID. Slots are never removed, an entry that is no longer
/// needed is turned back into an `Invalid` entry and may be recycled by
/// [`EntryRepository::create_or_reuse`].
#[derive(Debug, Clone, Default)]
pub struct EntryRepository {
    entries: Vec<DirectoryEntry>,
    /// Every slot below this index is in use. Lowered by any outside mutable access.
    reuse_from: usize,
}

impl EntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            reuse_from: 0,
        }
    }

    /// Append a new entry and return its SID.
    ///
    /// The name is validated before anything is allocated.
    pub fn create(&mut self, name: &str, entry_type: StgType) -> Result<Sid> {
        let entry = DirectoryEntry::new(name, entry_type)?;
        Ok(self.push(entry))
    }

    /// Like [`EntryRepository::create`], but overwrite the first `Invalid` slot if there is one.
    ///
    /// Slots count as free when their entry type is `Invalid`, however they got there.
    pub fn create_or_reuse(&mut self, name: &str, entry_type: StgType) -> Result<Sid> {
        let mut entry = DirectoryEntry::new(name, entry_type)?;

        let Some(position) = self.entries[self.reuse_from..]
            .iter()
            .position(|slot| slot.entry_type() == StgType::Invalid)
            .map(|offset| offset + self.reuse_from)
        else {
            let sid = self.push(entry);
            if entry_type != StgType::Invalid {
                self.reuse_from = self.entries.len();
            }
            return Ok(sid);
        };

        let sid = position as Sid;
        trace!(sid, "reusing invalid slot");
        entry.set_sid(sid);
        self.entries[position] = entry;
        self.reuse_from = if entry_type == StgType::Invalid {
            position
        } else {
            position + 1
        };
        Ok(sid)
    }

    /// Append an already built entry, assigning it the next SID
    pub fn push(&mut self, mut entry: DirectoryEntry) -> Sid {
        let sid = self.entries.len() as Sid;
        entry.set_sid(sid);
        self.entries.push(entry);
        sid
    }

    /// Turn the slot back into an unused entry, keeping its SID
    pub fn invalidate(&mut self, sid: Sid) {
        let mut entry = DirectoryEntry::invalid();
        entry.set_sid(sid);
        self.entries[sid as usize] = entry;
        self.reuse_from = self.reuse_from.min(sid as usize);
    }

    /// # Panics
    ///
    /// When `sid` is not a slot of this repository.
    pub fn get(&self, sid: Sid) -> &DirectoryEntry {
        &self.entries[sid as usize]
    }

    /// The caller may turn the entry `Invalid`, so the slot becomes a reuse candidate again.
    ///
    /// # Panics
    ///
    /// When `sid` is not a slot of this repository.
    pub fn get_mut(&mut self, sid: Sid) -> &mut DirectoryEntry {
        let entry = &mut self.entries[sid as usize];
        self.reuse_from = self.reuse_from.min(sid as usize);
        entry
    }

    /// Mutable access for link maintenance, which never frees a slot
    pub(crate) fn slot_mut(&mut self, sid: Sid) -> &mut DirectoryEntry {
        &mut self.entries[sid as usize]
    }

    /// Whether `sid` addresses a slot of this repository
    pub fn contains(&self, sid: Sid) -> bool {
        (sid as usize) < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in SID order
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter()
    }
}

impl Index<Sid> for EntryRepository {
    type Output = DirectoryEntry;

    fn index(&self, sid: Sid) -> &Self::Output {
        self.get(sid)
    }
}

impl IndexMut<Sid> for EntryRepository {
    fn index_mut(&mut self, sid: Sid) -> &mut Self::Output {
        self.get_mut(sid)
    }
}

impl RbNodes for EntryRepository {
    type Id = Sid;
    type Node = DirectoryEntry;

    fn node(&self, id: Sid) -> &DirectoryEntry {
        self.get(id)
    }

    fn left(&self, id: Sid) -> Option<Sid> {
        self.entries[id as usize].left_sibling()
    }

    fn right(&self, id: Sid) -> Option<Sid> {
        self.entries[id as usize].right_sibling()
    }

    fn parent(&self, id: Sid) -> Option<Sid> {
        self.entries[id as usize].parent()
    }

    fn color(&self, id: Sid) -> Color {
        self.entries[id as usize].color()
    }

    fn set_left(&mut self, id: Sid, left: Option<Sid>) {
        self.entries[id as usize].set_left_sibling(left);
    }

    fn set_right(&mut self, id: Sid, right: Option<Sid>) {
        self.entries[id as usize].set_right_sibling(right);
    }

    fn set_parent(&mut self, id: Sid, parent: Option<Sid>) {
        self.entries[id as usize].set_parent(parent);
    }

    fn set_color(&mut self, id: Sid, color: Color) {
        self.entries[id as usize].set_color(color);
    }

    fn copy_value(&mut self, from: Sid, to: Sid) {
        if from == to {
            return;
        }
        let source = self.entries[from as usize].clone();
        source.assign_value_to(&mut self.entries[to as usize]);
    }
}
