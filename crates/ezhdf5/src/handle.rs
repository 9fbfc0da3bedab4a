//! Scoped ownership of engine handles.

use ezhdf5_io::{engine, EngineError, Hid, ObjectKind};
use log::{trace, warn};

use crate::error::Result;

/// One engine handle plus the role it was opened in.
///
/// An owned handle is closed exactly once: by [`Handle::close`], or on drop
/// through the close call matching its role. A borrowed handle is never
/// closed. The [`Hid::INVALID`] sentinel is never closed either.
#[derive(Debug)]
pub struct Handle {
    id: Hid,
    kind: ObjectKind,
    owned: bool,
}

impl Handle {
    pub(crate) fn owned(id: Hid, kind: ObjectKind) -> Self {
        trace!("taking ownership of {kind} handle {id}");
        Handle {
            id,
            kind,
            owned: true,
        }
    }

    pub(crate) fn borrowed(id: Hid, kind: ObjectKind) -> Self {
        Handle {
            id,
            kind,
            owned: false,
        }
    }

    /// The engine handle; [`Hid::INVALID`] once closed.
    pub fn id(&self) -> Hid {
        self.id
    }

    /// The role the handle was opened in.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether dropping this handle closes it.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Close now and report failure, instead of logging it on drop.
    pub fn close(mut self) -> Result<()> {
        Ok(self.release()?)
    }

    fn release(&mut self) -> std::result::Result<(), EngineError> {
        if !self.owned || !self.id.is_valid() {
            return Ok(());
        }
        let id = std::mem::replace(&mut self.id, Hid::INVALID);
        trace!("closing {} handle {id}", self.kind);
        match self.kind {
            ObjectKind::File => engine().close_file(id),
            ObjectKind::Group => engine().close_group(id),
            ObjectKind::Dataset => engine().close_dataset(id),
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let id = self.id;
        if let Err(e) = self.release() {
            warn!("failed to close {} handle {id}: {e}", self.kind);
        }
    }
}
