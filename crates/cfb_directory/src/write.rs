//! Types for writing directory streams
//!

use std::io::{Seek, Write};

use bon::Builder;
use tracing::{debug, instrument};

use crate::{
    directory::Directory,
    entry::DirectoryEntry,
    error::Result,
    types::Version,
};

/// Options for how the directory stream should be written
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct DirectoryWriterOptions {
    /// Version deciding the width of the size field, the directory's own version when unset
    pub version: Option<Version>,

    /// Fill the last directory sector with unused entries
    #[builder(default)]
    pub pad_to_sector: bool,
}

/// Directory stream generator
///
/// Entries are written in SID order, so the position of every record matches the SID the sibling
/// pointers refer to.
pub struct DirectoryWriter<W: Write + Seek> {
    inner: W,
    options: DirectoryWriterOptions,
}

impl<W: Write + Seek> DirectoryWriter<W> {
    pub fn new(inner: W, options: DirectoryWriterOptions) -> DirectoryWriter<W> {
        DirectoryWriter { inner, options }
    }

    /// Encode every entry of `directory` and return the number of records written
    #[instrument(skip_all, err)]
    pub fn write(&mut self, directory: &Directory) -> Result<usize> {
        let version = self.options.version.unwrap_or(directory.version());

        for entry in directory.repository().iter() {
            entry.write(&mut self.inner, version)?;
        }

        let mut records = directory.repository().len();
        if self.options.pad_to_sector {
            let padded = records.next_multiple_of(version.entries_per_sector());
            let filler = DirectoryEntry::invalid();
            for _ in records..padded {
                filler.write(&mut self.inner, version)?;
            }
            records = padded;
        }

        debug!(records, ?version, "wrote directory");
        Ok(records)
    }

    /// Unwrap and return the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}
