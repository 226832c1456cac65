//! Storages and their child trees
//!

use tracing::{debug, instrument};

use crate::{
    entry::DirectoryEntry,
    error::{Error, Result},
    rbtree::{RbTree, Traversal, Violation},
    repository::EntryRepository,
    types::{Sid, StgType, Version},
};

/// SID of the root storage
pub const ROOT_SID: Sid = 0;

/// The directory of a compound file
///
/// Every storage links its children through a red-black tree rooted at its `child` field. All
/// trees share the one [`EntryRepository`] owning the entries.
///
/// ```
/// # fn doit() -> cfb_directory::error::Result<()> {
/// use cfb_directory::{Directory, Version};
///
/// let mut directory = Directory::new(Version::V3);
/// let root = directory.root();
///
/// let storage = directory.add_storage(root, "Pictures")?;
/// directory.add_stream(storage, "Thumbnail")?;
///
/// assert_eq!(directory.find(root, "PICTURES"), Some(storage));
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Directory {
    version: Version,
    repository: EntryRepository,
}

impl Directory {
    /// A directory holding only the root storage
    pub fn new(version: Version) -> Self {
        let mut repository = EntryRepository::new();
        repository.push(DirectoryEntry::root());

        Self {
            version,
            repository,
        }
    }

    /// Wrap entries whose child trees are already linked
    pub(crate) fn from_repository(version: Version, repository: EntryRepository) -> Self {
        Self {
            version,
            repository,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// SID of the root storage
    pub fn root(&self) -> Sid {
        ROOT_SID
    }

    pub fn repository(&self) -> &EntryRepository {
        &self.repository
    }

    /// # Panics
    ///
    /// When `sid` is not a slot of this directory.
    pub fn entry(&self, sid: Sid) -> &DirectoryEntry {
        &self.repository[sid]
    }

    /// Mutable access to an entry, for the fields not maintained by the directory (sizes, start
    /// sectors, timestamps, ...).
    ///
    /// # Panics
    ///
    /// When `sid` is not a slot of this directory.
    pub fn entry_mut(&mut self, sid: Sid) -> &mut DirectoryEntry {
        &mut self.repository[sid]
    }

    /// Add an empty stream to the storage `parent`
    pub fn add_stream(&mut self, parent: Sid, name: &str) -> Result<Sid> {
        self.add(parent, name, StgType::Stream)
    }

    /// Add an empty storage to the storage `parent`
    pub fn add_storage(&mut self, parent: Sid, name: &str) -> Result<Sid> {
        self.add(parent, name, StgType::Storage)
    }

    #[instrument(skip(self), err)]
    fn add(&mut self, parent: Sid, name: &str, entry_type: StgType) -> Result<Sid> {
        let mut tree = self.child_tree(parent)?;
        let sid = self.repository.create_or_reuse(name, entry_type)?;

        if let Err(existing) = tree.insert(&mut self.repository, sid) {
            self.repository.invalidate(sid);
            return Err(Error::DuplicateEntry(
                self.repository[existing].name().to_owned(),
            ));
        }

        self.repository.slot_mut(parent).set_child(tree.root());
        debug!(sid, "added entry");
        Ok(sid)
    }

    /// Look up `name` among the children of `parent`.
    ///
    /// Names are compared case-insensitively. Returns `None` when `parent` is not a storage.
    pub fn find(&self, parent: Sid, name: &str) -> Option<Sid> {
        let tree = self.child_tree(parent).ok()?;
        let probe = DirectoryEntry::new(name, StgType::Invalid).ok()?;
        tree.try_lookup(&self.repository, &probe)
    }

    /// Children of `parent` in sibling order
    pub fn children(&self, parent: Sid) -> Vec<Sid> {
        match self.child_tree(parent) {
            Ok(tree) => tree.to_vec(&self.repository),
            Err(_) => Vec::new(),
        }
    }

    /// Remove `name` from the storage `parent`.
    ///
    /// Removing a storage also frees every entry below it. Freed slots become `Invalid` and are
    /// handed out again by later additions.
    ///
    /// When the removed entry had two siblings below it in the tree, the entry taking its place
    /// moves to its SID. SIDs of other entries of `parent` obtained before the call should be
    /// looked up again.
    #[instrument(skip(self), err)]
    pub fn delete(&mut self, parent: Sid, name: &str) -> Result<()> {
        let mut tree = self.child_tree(parent)?;
        let probe = DirectoryEntry::new(name, StgType::Invalid)
            .map_err(|_| Error::EntryNotFound(name.to_owned()))?;

        let Some(located) = tree.try_lookup(&self.repository, &probe) else {
            return Err(Error::EntryNotFound(name.to_owned()));
        };
        let orphans = self.repository[located].child();

        let Some(deleted) = tree.delete(&mut self.repository, &probe) else {
            return Err(Error::EntryNotFound(name.to_owned()));
        };

        self.repository.invalidate(deleted.unlinked);
        self.repository.slot_mut(parent).set_child(tree.root());

        if let Some(orphans) = orphans {
            self.invalidate_subtree(orphans);
        }

        debug!(
            located = deleted.located,
            unlinked = deleted.unlinked,
            "deleted entry"
        );
        Ok(())
    }

    /// Rename the child `old` of `parent` to `new` and return its SID afterwards.
    ///
    /// The entry is unlinked and inserted again under its new name, so its SID may change the
    /// same way it does for [`Directory::delete`].
    #[instrument(skip(self), err)]
    pub fn rename(&mut self, parent: Sid, old: &str, new: &str) -> Result<Sid> {
        let renamed = DirectoryEntry::new(new, StgType::Invalid)?;
        let mut tree = self.child_tree(parent)?;

        let probe = DirectoryEntry::new(old, StgType::Invalid)
            .map_err(|_| Error::EntryNotFound(old.to_owned()))?;
        let Some(located) = tree.try_lookup(&self.repository, &probe) else {
            return Err(Error::EntryNotFound(old.to_owned()));
        };

        if let Some(existing) = tree.try_lookup(&self.repository, &renamed) {
            if existing != located {
                return Err(Error::DuplicateEntry(new.to_owned()));
            }
        }

        let content = self.repository[located].clone();
        let Some(deleted) = tree.delete(&mut self.repository, &probe) else {
            return Err(Error::EntryNotFound(old.to_owned()));
        };

        let sid = deleted.unlinked;
        content.assign_value_to(self.repository.slot_mut(sid));
        self.repository.slot_mut(sid).set_name(new)?;

        if let Err(existing) = tree.insert(&mut self.repository, sid) {
            return Err(Error::DuplicateEntry(
                self.repository[existing].name().to_owned(),
            ));
        }

        self.repository.slot_mut(parent).set_child(tree.root());
        Ok(sid)
    }

    /// Check the red-black properties of the child tree of `parent`.
    ///
    /// Returns the black height of the tree. A non storage has an empty tree.
    pub fn validate(&self, parent: Sid) -> std::result::Result<usize, Violation<Sid>> {
        match self.child_tree(parent) {
            Ok(tree) => tree.validate(&self.repository),
            Err(_) => Ok(1),
        }
    }

    fn child_tree(&self, parent: Sid) -> Result<RbTree<Sid>> {
        if !self.repository.contains(parent) || !self.repository[parent].is_storage() {
            return Err(Error::NotAStorage(parent));
        }
        Ok(RbTree::with_root(self.repository[parent].child()))
    }

    fn invalidate_subtree(&mut self, root: Sid) {
        let mut pending = vec![root];
        while let Some(tree_root) = pending.pop() {
            let mut members = Vec::new();
            RbTree::with_root(Some(tree_root)).visit(
                &self.repository,
                Traversal::PreOrder,
                |sid| members.push(sid),
            );

            for sid in members {
                pending.extend(self.repository[sid].child());
                self.repository.invalidate(sid);
            }
        }
    }
}
