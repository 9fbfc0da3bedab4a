//! Lazy, path-addressed references into the container tree.
//!
//! A [`Node`] is an unresolved location: a parent plus one name. Nothing is
//! opened or created until the node is written, read, or indexed past.
//! Indexing past a node resolves it into a [`Group`], opening the group if
//! it exists and creating it otherwise, and the group then becomes the
//! parent of the next node.
//!
//! Parents are either borrowed from a live [`File`](crate::File) or
//! [`Group`], or owned by the node after a consuming
//! [`Node::lookup`]. Owned ancestors are closed in reverse order of the
//! lookups when the last node of the chain drops.

use ezhdf5_io::{engine, Hid, ObjectKind};
use log::debug;

use crate::error::Result;
use crate::handle::Handle;
use crate::reader;
use crate::registry::H5Type;
use crate::value::Storable;
use crate::writer;

/// Something names can be resolved against: a file or an open group.
pub trait Location {
    /// The engine handle of this location.
    fn location_id(&self) -> Hid;
    /// Absolute path of this location, for messages.
    fn location_path(&self) -> &str;
}

/// Absolute path of `name` under `parent`.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

enum Parent<'p> {
    Borrowed(&'p Handle),
    Owned(Box<Group<'p>>),
}

impl Parent<'_> {
    fn id(&self) -> Hid {
        match self {
            Parent::Borrowed(handle) => handle.id(),
            Parent::Owned(group) => group.handle.id(),
        }
    }
}

/// An unresolved location in the tree.
pub struct Node<'p> {
    parent: Parent<'p>,
    name: String,
    path: String,
}

/// Leaf values are addressed exactly like any other node.
pub type Dataset<'p> = Node<'p>;

impl<'p> Node<'p> {
    pub(crate) fn borrowed(handle: &'p Handle, parent_path: &str, name: &str) -> Self {
        Node {
            path: join_path(parent_path, name),
            parent: Parent::Borrowed(handle),
            name: name.to_string(),
        }
    }

    fn owned(parent: Group<'p>, name: &str) -> Self {
        Node {
            path: join_path(&parent.path, name),
            parent: Parent::Owned(Box::new(parent)),
            name: name.to_string(),
        }
    }

    /// The name relative to the parent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute path this node addresses.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open the group at this node, creating it if nothing is there.
    ///
    /// On error the node and any ancestors it owns are released.
    pub fn resolve(self) -> Result<Group<'p>> {
        let loc = self.parent.id();
        let exists = engine().exists(loc, &self.name)?;
        let id = if exists {
            engine().open_group(loc, &self.name)?
        } else {
            debug!("creating intermediate group {}", self.path);
            engine().create_group(loc, &self.name)?
        };
        Ok(Group {
            handle: Handle::owned(id, ObjectKind::Group),
            parent: self.parent,
            path: self.path,
        })
    }

    /// Resolve this node as a group and address `name` beneath it.
    pub fn lookup(self, name: &str) -> Result<Node<'p>> {
        Ok(self.resolve()?.into_child(name))
    }

    /// Whether any object exists at this node.
    pub fn exists(&self) -> Result<bool> {
        Ok(engine().exists(self.parent.id(), &self.name)?)
    }

    /// The kind of object at this node, if any.
    pub fn kind(&self) -> Result<Option<ObjectKind>> {
        Ok(engine().object_kind(self.parent.id(), &self.name)?)
    }

    /// Store `value` at this node.
    ///
    /// Scalars, sequences and text always create a new dataset; a block
    /// reuses a dataset already present at the node. Returns `self` so
    /// assignments can be chained.
    pub fn assign<V: Storable + ?Sized>(&self, value: &V) -> Result<&Self> {
        writer::write_at(self.parent.id(), &self.name, &self.path, value)?;
        Ok(self)
    }

    /// Read a single value.
    pub fn read<T: H5Type>(&self) -> Result<T> {
        reader::read_scalar_at(self.parent.id(), &self.name, &self.path)
    }

    /// Read into a caller-sized buffer; its length must equal the stored
    /// element count.
    pub fn read_into<T: H5Type>(&self, buf: &mut [T]) -> Result<()> {
        reader::read_into_at(self.parent.id(), &self.name, &self.path, buf)
    }

    /// Read every element into a new vector.
    pub fn read_vec<T: H5Type>(&self) -> Result<Vec<T>> {
        reader::read_vec_at(self.parent.id(), &self.name, &self.path)
    }

    /// Read a text value.
    pub fn read_string(&self) -> Result<String> {
        reader::read_string_at(self.parent.id(), &self.name, &self.path)
    }

    /// Read a two-dimensional block.
    #[cfg(feature = "ndarray")]
    pub fn read_array2<T: H5Type>(&self) -> Result<ndarray::Array2<T>> {
        reader::read_array2_at(self.parent.id(), &self.name, &self.path)
    }

    /// Stored dimensions of the dataset at this node (empty for a scalar).
    pub fn extent(&self) -> Result<Vec<u64>> {
        reader::extent_at(self.parent.id(), &self.name)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("path", &self.path).finish()
    }
}

/// A resolved group with an open handle.
pub struct Group<'p> {
    // Declared first so the group closes before the parent it was opened in.
    handle: Handle,
    parent: Parent<'p>,
    path: String,
}

impl<'p> Group<'p> {
    /// Address `name` beneath this group without consuming it.
    pub fn lookup(&self, name: &str) -> Node<'_> {
        Node::borrowed(&self.handle, &self.path, name)
    }

    /// Address `name` beneath this group, handing the group to the child.
    pub fn into_child(self, name: &str) -> Node<'p> {
        Node::owned(self, name)
    }

    /// Absolute path of the group.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The open group handle.
    pub fn id(&self) -> Hid {
        self.handle.id()
    }

    /// Engine address of the group; equal for every handle on the same group.
    pub fn address(&self) -> Result<u64> {
        Ok(engine().object_address(self.handle.id())?)
    }

    /// Names of the links in this group, in name order.
    pub fn member_names(&self) -> Result<Vec<String>> {
        Ok(engine().member_names(self.handle.id())?)
    }

    /// Close the group handle now. Owned ancestors close afterwards.
    pub fn close(self) -> Result<()> {
        let Group { handle, parent, .. } = self;
        let closed = handle.close();
        drop(parent);
        closed
    }
}

impl Location for Group<'_> {
    fn location_id(&self) -> Hid {
        self.handle.id()
    }

    fn location_path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("path", &self.path)
            .field("id", &self.handle.id())
            .field("owns_parent", &matches!(self.parent, Parent::Owned(_)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_relative_and_absolute() {
        assert_eq!(join_path("/", "a"), "/a");
        assert_eq!(join_path("/a", "b/c"), "/a/b/c");
        assert_eq!(join_path("/a", "/x"), "/x");
    }
}
