//! Reading datasets back into native values.
//!
//! The stored descriptor is used as the memory layout; the requested type
//! must match it exactly and buffers must match the stored extent. No
//! conversion or resizing takes place.

use bytemuck::Zeroable;
use ezhdf5_format::type_builders::vlen_string;
use ezhdf5_format::{CharacterSet, StringPadding};
use ezhdf5_io::{engine, Dataspace, Datatype, Hid, ObjectKind};
use log::debug;

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::node::{join_path, Location};
use crate::registry::H5Type;

/// Fill `buf` from the dataset `name` under `loc`.
pub fn read_into<L, T>(loc: &L, name: &str, buf: &mut [T]) -> Result<()>
where
    L: Location + ?Sized,
    T: H5Type,
{
    let path = join_path(loc.location_path(), name);
    read_into_at(loc.location_id(), name, &path, buf)
}

struct OpenDataset {
    handle: Handle,
    datatype: Datatype,
    space: Dataspace,
}

fn open(loc: Hid, name: &str) -> Result<OpenDataset> {
    let handle = Handle::owned(engine().open_dataset(loc, name)?, ObjectKind::Dataset);
    let datatype = engine().dataset_type(handle.id())?;
    let space = engine().dataset_space(handle.id())?;
    Ok(OpenDataset {
        handle,
        datatype,
        space,
    })
}

fn open_as<T: H5Type>(loc: Hid, name: &str, path: &str) -> Result<OpenDataset> {
    let ds = open(loc, name)?;
    let requested = T::type_descriptor();
    if !ds.datatype.is_compatible(requested) {
        return Err(Error::TypeMismatch {
            path: path.to_string(),
            stored: ds.datatype.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(ds)
}

fn fill<T: H5Type>(ds: OpenDataset, path: &str, buf: &mut [T]) -> Result<()> {
    if ds.space.num_elements() != buf.len() as u64 {
        return Err(Error::ExtentMismatch {
            path: path.to_string(),
            stored: ds.space.dimensions,
            requested: vec![buf.len() as u64],
        });
    }
    engine().read_raw(ds.handle.id(), &ds.datatype, bytemuck::cast_slice_mut(buf))?;
    debug!("read {path} ({} elements of {})", buf.len(), ds.datatype);
    ds.handle.close()
}

pub(crate) fn read_into_at<T: H5Type>(loc: Hid, name: &str, path: &str, buf: &mut [T]) -> Result<()> {
    let ds = open_as::<T>(loc, name, path)?;
    fill(ds, path, buf)
}

pub(crate) fn read_scalar_at<T: H5Type>(loc: Hid, name: &str, path: &str) -> Result<T> {
    let mut value = [T::zeroed()];
    read_into_at(loc, name, path, &mut value)?;
    Ok(value[0])
}

pub(crate) fn read_vec_at<T: H5Type>(loc: Hid, name: &str, path: &str) -> Result<Vec<T>> {
    let ds = open_as::<T>(loc, name, path)?;
    let mut values = vec![T::zeroed(); ds.space.num_elements() as usize];
    fill(ds, path, &mut values)?;
    Ok(values)
}

pub(crate) fn read_string_at(loc: Hid, name: &str, path: &str) -> Result<String> {
    let ds = open(loc, name)?;
    if !ds.datatype.is_vlen_string() {
        return Err(Error::NotText(path.to_string()));
    }
    if ds.space.num_elements() != 1 {
        return Err(Error::ExtentMismatch {
            path: path.to_string(),
            stored: ds.space.dimensions,
            requested: Vec::new(),
        });
    }
    let mem_type = vlen_string(StringPadding::NullTerminate, CharacterSet::Utf8);
    let strings = engine().read_strings(ds.handle.id(), &mem_type)?;
    ds.handle.close()?;
    debug!("read {path} as text");
    Ok(strings.into_iter().next().unwrap_or_default())
}

/// Reads a rank-2 dataset. `requested` in an extent error is empty when
/// the stored rank is wrong.
#[cfg(feature = "ndarray")]
pub(crate) fn read_array2_at<T: H5Type>(
    loc: Hid,
    name: &str,
    path: &str,
) -> Result<ndarray::Array2<T>> {
    let ds = open_as::<T>(loc, name, path)?;
    if ds.space.rank() != 2 {
        return Err(Error::ExtentMismatch {
            path: path.to_string(),
            stored: ds.space.dimensions,
            requested: Vec::new(),
        });
    }
    let rows = ds.space.dimensions[0] as usize;
    let cols = ds.space.dimensions[1] as usize;
    let mut values = vec![T::zeroed(); rows * cols];
    fill(ds, path, &mut values)?;
    ndarray::Array2::from_shape_vec((rows, cols), values).map_err(|_| Error::ExtentMismatch {
        path: path.to_string(),
        stored: vec![rows as u64, cols as u64],
        requested: vec![rows as u64, cols as u64],
    })
}

pub(crate) fn extent_at(loc: Hid, name: &str) -> Result<Vec<u64>> {
    let ds = open(loc, name)?;
    ds.handle.close()?;
    Ok(ds.space.dimensions)
}
