//! The root of a container.

use std::path::{Path, PathBuf};

use ezhdf5_io::{engine, Hid, ObjectKind, OpenMode};
use log::debug;

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::node::{Location, Node};

/// An open container file.
///
/// An owning `File` closes its handle when dropped; one built with
/// [`File::wrap`] borrows a handle owned elsewhere and never closes it.
#[derive(Debug)]
pub struct File {
    handle: Handle,
    path: PathBuf,
}

impl File {
    /// Open or create the container at `path`.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<File> {
        let path = path.as_ref();
        let id = match mode {
            OpenMode::ReadOnly => engine().open_file(path, false)?,
            OpenMode::ReadWrite => engine().open_file(path, true)?,
            OpenMode::Truncate => engine().create_file(path, false)?,
            OpenMode::Exclusive => engine().create_file(path, true)?,
        };
        debug!("opened {} ({mode:?}) as {id}", path.display());
        Ok(File {
            handle: Handle::owned(id, ObjectKind::File),
            path: path.to_path_buf(),
        })
    }

    /// Create the container, replacing any existing file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<File> {
        File::open(path, OpenMode::Truncate)
    }

    /// Open with raw access flags (`OpenMode::ACC_*`).
    pub fn open_with_flags<P: AsRef<Path>>(path: P, flags: u32) -> Result<File> {
        let mode = OpenMode::from_flags(flags).ok_or(Error::InvalidMode(flags))?;
        File::open(path, mode)
    }

    /// Open read-write if the file exists, otherwise create it.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<File> {
        let mode = if path.as_ref().exists() {
            OpenMode::ReadWrite
        } else {
            OpenMode::Truncate
        };
        File::open(path, mode)
    }

    /// Borrow a file handle owned by someone else.
    pub fn wrap(id: Hid) -> File {
        File {
            handle: Handle::borrowed(id, ObjectKind::File),
            path: PathBuf::new(),
        }
    }

    /// Address `name` relative to the root group.
    pub fn lookup(&self, name: &str) -> Node<'_> {
        Node::borrowed(&self.handle, "/", name)
    }

    /// Names of the links in the root group.
    pub fn member_names(&self) -> Result<Vec<String>> {
        Ok(engine().member_names(self.handle.id())?)
    }

    /// Write the container to disk without closing it.
    pub fn flush(&self) -> Result<()> {
        Ok(engine().flush(self.handle.id())?)
    }

    /// Number of group and dataset handles still open in this container.
    pub fn open_object_count(&self) -> Result<usize> {
        Ok(engine().open_object_count(self.handle.id())?)
    }

    /// The file handle, usable with [`File::wrap`] or the engine directly.
    pub fn id(&self) -> Hid {
        self.handle.id()
    }

    /// False for a file built with [`File::wrap`].
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    /// The path this file was opened with; empty for a wrapped handle.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close now and report failure. A wrapped file is left open.
    pub fn close(self) -> Result<()> {
        self.handle.close()
    }
}

impl Location for File {
    fn location_id(&self) -> Hid {
        self.handle.id()
    }

    fn location_path(&self) -> &str {
        "/"
    }
}
