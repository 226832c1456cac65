//! Types for reading directory streams
//!

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, instrument, trace, warn};

use crate::{
    directory::{Directory, ROOT_SID},
    entry::DirectoryEntry,
    error::{Error, Result},
    rbtree::RbTree,
    repository::EntryRepository,
    types::{Sid, StgType, Version, DIRECTORY_ENTRY_SIZE},
};

/// Directory stream reader
///
/// Decodes every record of the stream, SID by SID, and relinks the child tree of each storage.
/// The sibling pointers found in the file are only used to discover which entries belong to a
/// storage. Out of range, unused, and repeated references are skipped with a warning.
///
/// ```
/// # fn doit() -> cfb_directory::error::Result<()> {
/// use std::io::Cursor;
/// use cfb_directory::{Directory, DirectoryReader, DirectoryWriter, Version};
/// use cfb_directory::write::DirectoryWriterOptions;
///
/// let mut directory = Directory::new(Version::V3);
/// directory.add_stream(directory.root(), "Contents")?;
///
/// let mut writer = DirectoryWriter::new(Cursor::new(Vec::new()), DirectoryWriterOptions::builder().build());
/// writer.write(&directory)?;
///
/// let mut stream = writer.into_inner();
/// stream.set_position(0);
///
/// let directory = DirectoryReader::read(&mut stream, Version::V3)?;
/// assert!(directory.find(directory.root(), "contents").is_some());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct DirectoryReader;

impl DirectoryReader {
    /// Read all records from the current position to the end of `reader`.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, version: Version) -> Result<Directory> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let records = (end - start).div_ceil(DIRECTORY_ENTRY_SIZE as u64) as usize;
        debug!(records, "reading directory");

        let mut repository = EntryRepository::with_capacity(records);
        for _ in 0..records {
            repository.push(DirectoryEntry::read(reader, version)?);
        }

        if repository.is_empty() || repository[ROOT_SID].entry_type() != StgType::Root {
            return Err(Error::MissingRoot);
        }

        Self::relink(&mut repository);

        Ok(Directory::from_repository(version, repository))
    }

    /// Rebuild the child tree of every storage reachable from the root
    fn relink(repository: &mut EntryRepository) {
        let mut linked = vec![false; repository.len()];
        linked[ROOT_SID as usize] = true;

        let mut storages = vec![ROOT_SID];
        while let Some(storage) = storages.pop() {
            let members = Self::collect_members(repository, storage, &mut linked);
            for &sid in &members {
                repository.slot_mut(sid).clear_links();
            }

            let mut tree = RbTree::new();
            for sid in members {
                if let Err(existing) = tree.insert(repository, sid) {
                    warn!(storage, sid, existing, "dropping entry with a duplicate name");
                    continue;
                }
                if repository[sid].is_storage() {
                    storages.push(sid);
                }
            }

            trace!(storage, root = ?tree.root(), "relinked storage");
            repository.slot_mut(storage).set_child(tree.root());
        }
    }

    /// Entries referenced by the sibling pointers below the child of `storage`
    fn collect_members(
        repository: &EntryRepository,
        storage: Sid,
        linked: &mut [bool],
    ) -> Vec<Sid> {
        let mut members = Vec::new();
        let mut pending = repository[storage].child().into_iter().collect::<Vec<_>>();

        while let Some(sid) = pending.pop() {
            if !repository.contains(sid) {
                warn!(storage, sid, "skipping out of range reference");
                continue;
            }
            if linked[sid as usize] {
                warn!(storage, sid, "skipping entry that is already linked");
                continue;
            }
            if repository[sid].entry_type() == StgType::Invalid {
                warn!(storage, sid, "skipping reference to an unused entry");
                continue;
            }

            linked[sid as usize] = true;
            members.push(sid);
            pending.extend(repository[sid].left_sibling());
            pending.extend(repository[sid].right_sibling());
        }

        members
    }
}
