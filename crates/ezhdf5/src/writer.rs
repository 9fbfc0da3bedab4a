//! Writing values as datasets.

use ezhdf5_format::type_builders::vlen_string;
use ezhdf5_format::{CharacterSet, StringPadding};
use ezhdf5_io::{engine, Dataspace, Datatype, Hid, ObjectKind};
use log::debug;

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::node::{join_path, Location};
use crate::value::{Shape, Storable};

/// Store `value` as `name` directly under `loc`.
pub fn write<L, V>(loc: &L, name: &str, value: &V) -> Result<()>
where
    L: Location + ?Sized,
    V: Storable + ?Sized,
{
    let path = join_path(loc.location_path(), name);
    write_at(loc.location_id(), name, &path, value)
}

pub(crate) fn write_at<V: Storable + ?Sized>(
    loc: Hid,
    name: &str,
    path: &str,
    value: &V,
) -> Result<()> {
    let shape = value
        .shape()
        .ok_or_else(|| Error::NonContiguous(path.to_string()))?;
    match shape {
        Shape::Scalar { datatype, bytes } => {
            write_new(loc, name, path, datatype, Dataspace::scalar(), bytes)
        }
        Shape::Sequence {
            datatype,
            len,
            bytes,
        } => {
            if len == 0 {
                return Err(Error::EmptySequence(path.to_string()));
            }
            write_new(loc, name, path, datatype, Dataspace::simple(&[len as u64]), bytes)
        }
        Shape::Block {
            datatype,
            rows,
            cols,
            bytes,
        } => write_block(loc, name, path, datatype, rows, cols, bytes),
        Shape::Text(text) => write_text(loc, name, path, text),
    }
}

fn write_new(
    loc: Hid,
    name: &str,
    path: &str,
    datatype: &Datatype,
    space: Dataspace,
    bytes: &[u8],
) -> Result<()> {
    let id = engine().create_dataset(loc, name, datatype, &space)?;
    let ds = Handle::owned(id, ObjectKind::Dataset);
    engine().write_raw(ds.id(), datatype, bytes)?;
    debug!("wrote {path} as {datatype} {:?}", space.dimensions);
    ds.close()
}

/// Blocks update a dataset already at `name` in place; its extent must be
/// exactly `rows x cols`.
fn write_block(
    loc: Hid,
    name: &str,
    path: &str,
    datatype: &Datatype,
    rows: usize,
    cols: usize,
    bytes: &[u8],
) -> Result<()> {
    let space = Dataspace::simple(&[rows as u64, cols as u64]);
    let exists = engine().exists(loc, name)?;
    let ds = if exists {
        let ds = Handle::owned(engine().open_dataset(loc, name)?, ObjectKind::Dataset);
        let stored = engine().dataset_space(ds.id())?;
        if stored.dimensions != space.dimensions {
            return Err(Error::ExtentMismatch {
                path: path.to_string(),
                stored: stored.dimensions,
                requested: space.dimensions,
            });
        }
        debug!("updating block {path}");
        ds
    } else {
        Handle::owned(
            engine().create_dataset(loc, name, datatype, &space)?,
            ObjectKind::Dataset,
        )
    };
    engine().write_raw(ds.id(), datatype, bytes)?;
    debug!("wrote {path} as {datatype} {rows}x{cols}");
    ds.close()
}

/// Text is persisted space-padded and written from a null-terminated
/// in-memory form.
fn write_text(loc: Hid, name: &str, path: &str, text: &str) -> Result<()> {
    let file_type = vlen_string(StringPadding::SpacePad, CharacterSet::Utf8);
    let mem_type = vlen_string(StringPadding::NullTerminate, CharacterSet::Utf8);
    let id = engine().create_dataset(loc, name, &file_type, &Dataspace::scalar())?;
    let ds = Handle::owned(id, ObjectKind::Dataset);
    engine().write_strings(ds.id(), &mem_type, &[text])?;
    debug!("wrote {path} as text ({} bytes)", text.len());
    ds.close()
}
